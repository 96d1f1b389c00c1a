//! Protocol module - Defines the wire protocol for ChessLink communication
//!
//! The protocol uses a fixed-layout binary format:
//! - 1 byte message kind
//! - 0 to 6 single-byte payload fields, count determined by the kind
//!
//! There is no length prefix and no padding; the tag alone tells the
//! receiver how many bytes follow.

mod message;
mod codec;

pub use message::*;
pub use codec::*;

/// Protocol version, reported by `chesslink info`
pub const PROTOCOL_VERSION: u32 = 1;

/// Default TCP port used by both the host and the guest
pub const DEFAULT_PORT: u16 = 54000;

/// Largest message on the wire (a `Move`)
pub const MAX_WIRE_SIZE: usize = 7;

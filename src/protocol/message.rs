//! Protocol message definitions
//!
//! Defines the message kinds exchanged between two ChessLink peers and the
//! single-byte enumerations carried inside their payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire size of each kind, tag included, indexed by [`MessageKind::index`]
pub const WIRE_SIZES: [usize; 7] = [0, 2, 7, 1, 1, 1, 1];

/// One-byte tag at the start of every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// Sentinel, never sent
    Invalid = 0,
    /// Tells the host which colour the guest picked
    WhichSide = 1,
    Move = 2,
    Resign = 3,
    DrawOffer = 4,
    RematchRequest = 5,
    RematchAccept = 6,
}

impl MessageKind {
    /// Every kind that may appear on the wire, in tag order
    pub const SENDABLE: [MessageKind; 6] = [
        MessageKind::WhichSide,
        MessageKind::Move,
        MessageKind::Resign,
        MessageKind::DrawOffer,
        MessageKind::RematchRequest,
        MessageKind::RematchAccept,
    ];

    /// Get the tag byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Look up a kind by its tag byte
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MessageKind::Invalid),
            1 => Some(MessageKind::WhichSide),
            2 => Some(MessageKind::Move),
            3 => Some(MessageKind::Resign),
            4 => Some(MessageKind::DrawOffer),
            5 => Some(MessageKind::RematchRequest),
            6 => Some(MessageKind::RematchAccept),
            _ => None,
        }
    }

    /// Position in per-kind tables such as [`WIRE_SIZES`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Total bytes on the wire, tag included.
    ///
    /// `Invalid` reports 0: it has no wire form.
    pub fn wire_size(self) -> usize {
        WIRE_SIZES[self.index()]
    }

    /// Bytes following the tag
    pub fn payload_len(self) -> usize {
        self.wire_size().saturating_sub(1)
    }

    /// Whether this kind may be sent at all
    pub fn is_sendable(self) -> bool {
        self != MessageKind::Invalid
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Invalid => "invalid",
            MessageKind::WhichSide => "which-side",
            MessageKind::Move => "move",
            MessageKind::Resign => "resign",
            MessageKind::DrawOffer => "draw-offer",
            MessageKind::RematchRequest => "rematch-request",
            MessageKind::RematchAccept => "rematch-accept",
        };
        f.write_str(name)
    }
}

/// Piece colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    #[default]
    White = 0,
    Black = 1,
}

impl Side {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::White),
            1 => Some(Side::Black),
            _ => None,
        }
    }

    /// The colour the other player gets
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// Piece a pawn promotes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PromotionKind {
    #[default]
    None = 0,
    Queen = 1,
    Rook = 2,
    Bishop = 3,
    Knight = 4,
}

impl PromotionKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PromotionKind::None),
            1 => Some(PromotionKind::Queen),
            2 => Some(PromotionKind::Rook),
            3 => Some(PromotionKind::Bishop),
            4 => Some(PromotionKind::Knight),
            _ => None,
        }
    }
}

/// Metadata about a move, used by the receiving side for sound and animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    #[default]
    Normal = 0,
    Capture = 1,
    Castle = 2,
    EnPassant = 3,
    Promotion = 4,
    PromotionCapture = 5,
}

impl MoveKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(MoveKind::Normal),
            1 => Some(MoveKind::Capture),
            2 => Some(MoveKind::Castle),
            3 => Some(MoveKind::EnPassant),
            4 => Some(MoveKind::Promotion),
            5 => Some(MoveKind::PromotionCapture),
            _ => None,
        }
    }
}

/// A board square, file and rank both in `0..=7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    /// Create a square, or `None` if either coordinate is off the board
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Parse algebraic notation such as `e4`
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Self::new(file as u8 - b'a', rank as u8 - b'1')
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

/// Payload of a `Move` message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveMessage {
    pub from: Square,
    pub to: Square,
    pub promotion: PromotionKind,
    pub kind: MoveKind,
}

/// A decoded game event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The colour the dialing peer chose
    WhichSide { side: Side },
    Move(MoveMessage),
    Resign,
    DrawOffer,
    RematchRequest,
    RematchAccept,
}

impl GameEvent {
    /// Get the message kind for this event
    pub fn kind(&self) -> MessageKind {
        match self {
            GameEvent::WhichSide { .. } => MessageKind::WhichSide,
            GameEvent::Move(_) => MessageKind::Move,
            GameEvent::Resign => MessageKind::Resign,
            GameEvent::DrawOffer => MessageKind::DrawOffer,
            GameEvent::RematchRequest => MessageKind::RematchRequest,
            GameEvent::RematchAccept => MessageKind::RematchAccept,
        }
    }
}

//! Session module - Moves game events between the connection and the game
//!
//! The frame loop calls [`NetworkDispatcher::pump`] once per frame. Decoded
//! events go to a [`GameEventHandler`], which stands in for the rules engine
//! and UI; outgoing events are sent straight through the connection.

use std::time::Duration;

use thiserror::Error;

use crate::network::{NetResult, NetworkError, P2pConnection};
use crate::protocol::{GameEvent, Side};

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Not connected to a peer")]
    NotConnected,
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Consumer of events arriving from the peer
pub trait GameEventHandler {
    /// Apply an event received from the peer
    fn on_event(&mut self, event: GameEvent);

    /// The peer closed or reset the connection
    fn on_peer_lost(&mut self);
}

/// Drains arrived messages once per frame
#[derive(Debug, Clone)]
pub struct NetworkDispatcher {
    /// Wait for the first message of a frame
    poll_timeout: Duration,
    /// Upper bound on messages handled per frame
    max_per_frame: usize,
}

impl NetworkDispatcher {
    pub fn new(poll_timeout: Duration, max_per_frame: usize) -> Self {
        Self {
            poll_timeout,
            max_per_frame: max_per_frame.max(1),
        }
    }

    /// Hand every arrived event (up to the per-frame limit) to `handler`.
    ///
    /// Only the first poll waits; the rest take whatever is already there.
    /// A lost peer is reported to the handler and the sticky flag cleared.
    /// Returns the number of events handled.
    pub fn pump<H: GameEventHandler>(
        &self,
        conn: &mut P2pConnection,
        handler: &mut H,
    ) -> SessionResult<usize> {
        if !conn.is_connected() {
            return Err(SessionError::NotConnected);
        }

        let mut handled = 0;
        let mut wait = self.poll_timeout;
        while handled < self.max_per_frame {
            match conn.poll_event(wait)? {
                Some(event) => {
                    tracing::debug!("Dispatching {:?}", event);
                    handler.on_event(event);
                    handled += 1;
                    wait = Duration::ZERO;
                }
                None => break,
            }
        }

        if conn.was_connection_lost() {
            handler.on_peer_lost();
            conn.clear_connection_lost();
        }

        Ok(handled)
    }
}

/// Tell the host which colour the guest is playing.
///
/// Sent by the guest right after connecting.
pub fn announce_side(conn: &mut P2pConnection, side: Side) -> NetResult<()> {
    tracing::info!("Announcing side {}", side);
    conn.send_event(&GameEvent::WhichSide { side })
}

/// The host's colour given the guest's announcement
pub fn host_side_for(guest_side: Side) -> Side {
    guest_side.opposite()
}

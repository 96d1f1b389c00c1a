//! Network module - Handles the direct TCP link between two players
//!
//! Provides:
//! - The process-wide network runtime
//! - Raw socket operations
//! - The peer connection used by the frame loop

mod connection;
mod runtime;
mod transport;

pub use connection::*;
pub use runtime::*;

use std::time::Duration;

/// Configuration for network operations
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Port to listen on or connect to
    pub port: u16,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Upper bound on a single send in milliseconds
    pub send_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: crate::protocol::DEFAULT_PORT,
            connect_timeout_ms: 5000,
            send_timeout_ms: 5000,
        }
    }
}

impl NetworkConfig {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    pub fn with_timeouts(mut self, connect_timeout_ms: u64, send_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self.send_timeout_ms = send_timeout_ms;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl From<&crate::config::NetworkConfig> for NetworkConfig {
    fn from(settings: &crate::config::NetworkConfig) -> Self {
        Self::new(settings.port)
            .with_timeouts(settings.connect_timeout_ms, settings.send_timeout_ms)
    }
}

/// Loopback helpers shared by the connection and session tests
#[cfg(test)]
pub(crate) mod test_support {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::protocol::RawMessage;

    pub fn test_config(port: u16) -> NetworkConfig {
        NetworkConfig::new(port).with_timeouts(1000, 1000)
    }

    /// A host and a guest connected over loopback on `port`.
    ///
    /// The host waits on its own thread with its own runtime; the guest
    /// retries until the listener is up.
    pub fn connected_pair(port: u16) -> (P2pConnection, P2pConnection) {
        let host = thread::spawn(move || {
            let mut host = P2pConnection::new(NetRuntime::init().unwrap(), test_config(port));
            let outcome = host.listen_for_peer(Duration::from_secs(30)).unwrap();
            assert_eq!(outcome, ListenOutcome::Connected);
            host
        });

        let mut guest = P2pConnection::new(NetRuntime::init().unwrap(), test_config(port));
        let mut attempts = 0;
        while let Err(e) = guest.connect_to_peer("127.0.0.1") {
            attempts += 1;
            assert!(attempts < 200, "guest never connected: {e}");
            thread::sleep(Duration::from_millis(20));
        }

        (host.join().unwrap(), guest)
    }

    /// Poll until a message arrives or roughly five seconds pass
    pub fn poll_until(conn: &mut P2pConnection) -> Option<RawMessage> {
        for _ in 0..50 {
            if let Some(raw) = conn
                .receive_message_if_available(Duration::from_millis(100))
                .unwrap()
            {
                return Some(raw);
            }
        }
        None
    }
}

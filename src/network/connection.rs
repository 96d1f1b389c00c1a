//! Peer connection management for ChessLink
//!
//! Owns the single socket shared with the opponent, including:
//! - Role-asymmetric setup (host listens, guest dials)
//! - Bounded-wait send and receive for use from a frame loop
//! - Sticky peer-loss detection
//! - Mapping of socket failures onto [`NetworkError`]

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::runtime::NetRuntime;
use super::transport::{self, ReadOutcome};
use super::NetworkConfig;
use crate::protocol::{
    encode, encode_frame, CodecError, GameEvent, MessageKind, RawMessage, MAX_WIRE_SIZE,
};

/// Fatal network errors.
///
/// The socket-level variants carry the OS error code when the failure came
/// from the platform sockets layer. Timeouts while polling and a peer
/// closing the stream are not errors; see
/// [`P2pConnection::receive_message_if_available`].
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connect failed: {message}{}", os_suffix(.os_code))]
    ConnectFailure { message: String, os_code: Option<i32> },

    #[error("Listen failed: {message}{}", os_suffix(.os_code))]
    ListenFailure { message: String, os_code: Option<i32> },

    #[error("Accept failed: {message}{}", os_suffix(.os_code))]
    AcceptFailure { message: String, os_code: Option<i32> },

    #[error("Send failed: {message}{}", os_suffix(.os_code))]
    SendFailure { message: String, os_code: Option<i32> },

    #[error("Receive failed: {message}{}", os_suffix(.os_code))]
    ReceiveFailure { message: String, os_code: Option<i32> },

    #[error("Invalid message: {0}")]
    Contract(#[from] CodecError),

    #[error("Operation requires a {expected:?} connection, but it is {actual:?}")]
    InvalidState {
        expected: ConnectionState,
        actual: ConnectionState,
    },
}

fn os_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (os error {code})"),
        None => String::new(),
    }
}

/// Split an `io::Error` into a message and an optional OS code
fn io_parts(context: &str, err: &io::Error) -> (String, Option<i32>) {
    match err.raw_os_error() {
        Some(code) => (format!("{context}: {}", err.kind()), Some(code)),
        None => (format!("{context}: {err}"), None),
    }
}

impl NetworkError {
    fn connect(context: &str, err: &io::Error) -> Self {
        let (message, os_code) = io_parts(context, err);
        Self::ConnectFailure { message, os_code }
    }

    fn listen(context: &str, err: &io::Error) -> Self {
        let (message, os_code) = io_parts(context, err);
        Self::ListenFailure { message, os_code }
    }

    fn accept(context: &str, err: &io::Error) -> Self {
        let (message, os_code) = io_parts(context, err);
        Self::AcceptFailure { message, os_code }
    }

    fn send(context: &str, err: &io::Error) -> Self {
        let (message, os_code) = io_parts(context, err);
        Self::SendFailure { message, os_code }
    }

    fn receive(context: &str, err: &io::Error) -> Self {
        let (message, os_code) = io_parts(context, err);
        Self::ReceiveFailure { message, os_code }
    }

    /// Platform socket error code, if the failure came from the OS
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::ConnectFailure { os_code, .. }
            | Self::ListenFailure { os_code, .. }
            | Self::AcceptFailure { os_code, .. }
            | Self::SendFailure { os_code, .. }
            | Self::ReceiveFailure { os_code, .. } => *os_code,
            Self::Contract(_) | Self::InvalidState { .. } => None,
        }
    }
}

pub type NetResult<T> = Result<T, NetworkError>;

/// Which side of the connection this instance is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionRole {
    /// Not connected to anyone
    #[default]
    None,
    /// Listened and accepted
    Host,
    /// Dialed out
    Guest,
}

/// State of the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket
    Disconnected,
    /// Waiting in `listen_for_peer`
    Listening,
    /// Dialing in `connect_to_peer`
    Connecting,
    /// Socket established, messages may flow
    Connected,
}

/// Outcome of [`P2pConnection::listen_for_peer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// A peer connected; the connection is now the host
    Connected,
    /// Nobody connected before the timeout
    TimedOut,
}

/// Connection statistics
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Messages sent
    pub messages_sent: u64,
    /// Messages received
    pub messages_received: u64,
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes received
    pub bytes_received: u64,
}

/// The direct connection to the opponent.
///
/// One instance exists per process and it is driven from a single thread.
/// Every call blocks for at most its timeout.
pub struct P2pConnection {
    /// The socket, present iff connected
    stream: Option<TcpStream>,
    /// Shared sockets subsystem
    runtime: Arc<NetRuntime>,
    /// Port and timeouts
    config: NetworkConfig,
    role: ConnectionRole,
    state: ConnectionState,
    /// Dotted-decimal address of the peer, present iff connected
    peer_address: Option<String>,
    /// Sticky: set by the receive path, cleared only by the consumer
    connection_lost: bool,
    /// The stream has reported end-of-file
    peer_closed: bool,
    /// Bytes of a message that has not fully arrived yet
    read_buf: BytesMut,
    write_buf: BytesMut,
    stats: ConnectionStats,
}

impl P2pConnection {
    /// Create an empty, disconnected instance
    pub fn new(runtime: Arc<NetRuntime>, config: NetworkConfig) -> Self {
        Self {
            stream: None,
            runtime,
            config,
            role: ConnectionRole::None,
            state: ConnectionState::Disconnected,
            peer_address: None,
            connection_lost: false,
            peer_closed: false,
            read_buf: BytesMut::with_capacity(MAX_WIRE_SIZE),
            write_buf: BytesMut::with_capacity(MAX_WIRE_SIZE),
            stats: ConnectionStats::default(),
        }
    }

    fn require_state(&self, expected: ConnectionState) -> NetResult<()> {
        if self.state != expected {
            return Err(NetworkError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn install(&mut self, stream: TcpStream, peer: SocketAddr, role: ConnectionRole) {
        self.stream = Some(stream);
        self.peer_address = Some(peer.ip().to_string());
        self.role = role;
        self.state = ConnectionState::Connected;
        self.peer_closed = false;
        self.read_buf.clear();
        self.stats = ConnectionStats::default();
    }

    /// Dial the peer at `address` (dotted-decimal IPv4) as the guest.
    ///
    /// On any failure the connection stays disconnected.
    pub fn connect_to_peer(&mut self, address: &str) -> NetResult<()> {
        self.require_state(ConnectionState::Disconnected)?;

        let ip: Ipv4Addr = address.trim().parse().map_err(|_| NetworkError::ConnectFailure {
            message: format!("Malformed IPv4 address '{address}'"),
            os_code: None,
        })?;
        let target = SocketAddrV4::new(ip, self.config.port);

        self.state = ConnectionState::Connecting;
        tracing::info!("Connecting to {}", target);

        let connect_timeout = self.config.connect_timeout();
        let result = self.runtime.block_on(async {
            timeout(connect_timeout, transport::connect_ipv4(target)).await
        });

        match result {
            Ok(Ok(stream)) => {
                self.install(stream, SocketAddr::V4(target), ConnectionRole::Guest);
                tracing::info!("Connected to {} as guest", target);
                Ok(())
            }
            Ok(Err(e)) => {
                self.state = ConnectionState::Disconnected;
                Err(NetworkError::connect(&format!("Could not connect to {target}"), &e))
            }
            Err(_) => {
                self.state = ConnectionState::Disconnected;
                Err(NetworkError::ConnectFailure {
                    message: format!(
                        "Timed out after {:?} connecting to {target}",
                        self.config.connect_timeout()
                    ),
                    os_code: None,
                })
            }
        }
    }

    /// Listen on the configured port and wait up to `wait` for the peer to
    /// connect.
    ///
    /// A timeout is not an error: the connection goes back to
    /// `Disconnected` and [`ListenOutcome::TimedOut`] is returned.
    pub fn listen_for_peer(&mut self, wait: Duration) -> NetResult<ListenOutcome> {
        self.require_state(ConnectionState::Disconnected)?;
        self.state = ConnectionState::Listening;

        let port = self.config.port;
        let runtime = Arc::clone(&self.runtime);
        let result = runtime.block_on(async {
            let listener = match transport::bind_ipv4(port).await {
                Ok(listener) => listener,
                Err(e) => {
                    let message = format!("Could not listen on port {port}");
                    return Err(NetworkError::listen(&message, &e));
                }
            };
            tracing::info!("Listening for a peer on port {} for {:?}", port, wait);

            match timeout(wait, transport::accept(&listener)).await {
                Ok(Ok(accepted)) => Ok(Some(accepted)),
                Ok(Err(e)) => Err(NetworkError::accept("Could not accept peer", &e)),
                Err(_) => Ok(None),
            }
        });

        match result {
            Ok(Some((stream, peer))) => {
                self.install(stream, peer, ConnectionRole::Host);
                tracing::info!("Peer {} connected; hosting", peer);
                Ok(ListenOutcome::Connected)
            }
            Ok(None) => {
                self.state = ConnectionState::Disconnected;
                tracing::info!("No peer connected within {:?}", wait);
                Ok(ListenOutcome::TimedOut)
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Send one message.
    ///
    /// `payload` must be exactly the fixed size for `kind`, tag excluded;
    /// otherwise nothing is written. After a `SendFailure` the connection
    /// is unusable and should be disconnected.
    pub fn send_message(&mut self, kind: MessageKind, payload: &[u8]) -> NetResult<()> {
        self.require_state(ConnectionState::Connected)?;

        self.write_buf.clear();
        encode_frame(kind, payload, &mut self.write_buf)?;
        self.flush_write_buf(kind)
    }

    /// Send a typed event
    pub fn send_event(&mut self, event: &GameEvent) -> NetResult<()> {
        self.require_state(ConnectionState::Connected)?;

        self.write_buf.clear();
        encode(event, &mut self.write_buf)?;
        self.flush_write_buf(event.kind())
    }

    /// Write the message staged in `write_buf` to the socket
    fn flush_write_buf(&mut self, kind: MessageKind) -> NetResult<()> {
        let actual = self.state;
        let Self { stream, runtime, config, write_buf, stats, .. } = &mut *self;
        let stream = stream.as_mut().ok_or(NetworkError::InvalidState {
            expected: ConnectionState::Connected,
            actual,
        })?;

        let send_timeout = config.send_timeout();
        let result = runtime.block_on(async {
            timeout(send_timeout, transport::send_all(stream, write_buf)).await
        });

        match result {
            Ok(Ok(())) => {
                stats.messages_sent += 1;
                stats.bytes_sent += write_buf.len() as u64;
                tracing::debug!("Sent {} ({} bytes)", kind, write_buf.len());
                Ok(())
            }
            Ok(Err(e)) => Err(NetworkError::send(&format!("Could not send {kind}"), &e)),
            Err(_) => Err(NetworkError::SendFailure {
                message: format!("Timed out after {send_timeout:?} sending {kind}"),
                os_code: None,
            }),
        }
    }

    /// Poll for one message, waiting at most `wait`.
    ///
    /// Returns `Ok(None)` when nothing complete arrived in time; any bytes
    /// of a partially received message are kept for the next call. When the
    /// peer has closed the stream, the sticky lost flag is raised once and
    /// `Ok(None)` is returned from then on.
    pub fn receive_message_if_available(
        &mut self,
        wait: Duration,
    ) -> NetResult<Option<RawMessage>> {
        self.require_state(ConnectionState::Connected)?;
        if self.peer_closed {
            return Ok(None);
        }

        let actual = self.state;
        let Self { stream, runtime, read_buf, .. } = &mut *self;
        let stream = stream.as_mut().ok_or(NetworkError::InvalidState {
            expected: ConnectionState::Connected,
            actual,
        })?;

        let result = runtime.block_on(async {
            // One driver turn so socket readiness is current even for a zero wait
            tokio::task::yield_now().await;
            timeout(wait, transport::read_message(stream, read_buf)).await
        });

        self.finish_read(result.ok())
    }

    /// Turn the result of one read attempt into a poll result.
    ///
    /// `None` means the wait expired. A reset or aborted connection is
    /// treated like an orderly close.
    fn finish_read(
        &mut self,
        read: Option<io::Result<ReadOutcome>>,
    ) -> NetResult<Option<RawMessage>> {
        match read {
            None => Ok(None),
            Some(Ok(ReadOutcome::Message(bytes))) => {
                let raw = RawMessage::from_wire(bytes).map_err(|e| NetworkError::ReceiveFailure {
                    message: e.to_string(),
                    os_code: None,
                })?;
                self.stats.messages_received += 1;
                self.stats.bytes_received += raw.as_bytes().len() as u64;
                tracing::debug!("Received {} {:?}", raw.kind(), raw.payload());
                Ok(Some(raw))
            }
            Some(Ok(ReadOutcome::PeerClosed)) => {
                self.mark_peer_closed("closed the connection");
                Ok(None)
            }
            Some(Err(e))
                if matches!(
                    e.kind(),
                    io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted
                ) =>
            {
                self.mark_peer_closed("reset the connection");
                Ok(None)
            }
            Some(Err(e)) => Err(NetworkError::receive("Could not read from peer", &e)),
        }
    }

    /// Poll for one message and decode it.
    ///
    /// A message that does not decode is a `ReceiveFailure`.
    pub fn poll_event(&mut self, wait: Duration) -> NetResult<Option<GameEvent>> {
        match self.receive_message_if_available(wait)? {
            Some(raw) => raw.to_event().map(Some).map_err(|e| NetworkError::ReceiveFailure {
                message: format!("Undecodable {} from peer: {e}", raw.kind()),
                os_code: None,
            }),
            None => Ok(None),
        }
    }

    fn mark_peer_closed(&mut self, what: &str) {
        self.peer_closed = true;
        self.connection_lost = true;
        self.read_buf.clear();
        tracing::warn!(
            "Peer {} {}",
            self.peer_address.as_deref().unwrap_or("unknown"),
            what
        );
    }

    /// Close the socket and forget the peer.
    ///
    /// Safe to call in any state, any number of times. The sticky lost flag
    /// is left for the consumer to clear.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::info!(
                "Disconnected from {}",
                self.peer_address.as_deref().unwrap_or("unknown")
            );
        }
        self.peer_address = None;
        self.role = ConnectionRole::None;
        self.state = ConnectionState::Disconnected;
        self.peer_closed = false;
        self.read_buf.clear();
    }

    /// Get the current role
    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Get the current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if a peer is connected
    pub fn is_connected(&self) -> bool {
        self.role != ConnectionRole::None
    }

    /// Dotted-decimal IPv4 address of the peer
    pub fn peer_address(&self) -> Option<&str> {
        self.peer_address.as_deref()
    }

    /// Whether the receive path has seen the peer go away
    pub fn was_connection_lost(&self) -> bool {
        self.connection_lost
    }

    /// Acknowledge a lost peer so the flag can be raised again
    pub fn clear_connection_lost(&mut self) {
        self.connection_lost = false;
    }

    /// Get connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Get the network configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

impl Drop for P2pConnection {
    fn drop(&mut self) {
        // Release the socket while the runtime is still referenced
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_support::{connected_pair, poll_until, test_config};
    use crate::protocol::{MoveKind, MoveMessage, PromotionKind, Square};
    use std::time::Instant;

    fn disconnected(port: u16) -> P2pConnection {
        P2pConnection::new(NetRuntime::init().unwrap(), test_config(port))
    }

    #[test]
    fn test_new_connection_is_empty() {
        let conn = disconnected(47100);
        assert_eq!(conn.role(), ConnectionRole::None);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
        assert!(conn.peer_address().is_none());
        assert!(!conn.was_connection_lost());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut conn = disconnected(47101);
        conn.disconnect();
        conn.disconnect();
        assert_eq!(conn.role(), ConnectionRole::None);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_listen_times_out_without_error() {
        let mut conn = disconnected(47102);
        let started = Instant::now();
        let outcome = conn.listen_for_peer(Duration::from_millis(100)).unwrap();

        assert_eq!(outcome, ListenOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(conn.role(), ConnectionRole::None);

        // The port is released, so listening again works
        let outcome = conn.listen_for_peer(Duration::from_millis(50)).unwrap();
        assert_eq!(outcome, ListenOutcome::TimedOut);
    }

    #[test]
    fn test_connect_malformed_address() {
        let mut conn = disconnected(47103);
        let err = conn.connect_to_peer("not-an-ip").unwrap_err();
        assert!(matches!(err, NetworkError::ConnectFailure { os_code: None, .. }));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_connect_refused_carries_os_code() {
        let mut conn = disconnected(47104);
        let err = conn.connect_to_peer("127.0.0.1").unwrap_err();
        assert!(matches!(err, NetworkError::ConnectFailure { .. }));
        assert!(err.os_code().is_some());
        assert!(err.to_string().contains("os error"));
        assert_eq!(conn.role(), ConnectionRole::None);
    }

    #[test]
    fn test_operations_require_connection() {
        let mut conn = disconnected(47105);
        assert!(matches!(
            conn.send_message(MessageKind::Resign, &[]),
            Err(NetworkError::InvalidState { .. })
        ));
        assert!(matches!(
            conn.receive_message_if_available(Duration::ZERO),
            Err(NetworkError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_end_to_end_move() {
        let (mut host, mut guest) = connected_pair(47110);

        assert_eq!(host.role(), ConnectionRole::Host);
        assert_eq!(guest.role(), ConnectionRole::Guest);
        assert_eq!(host.peer_address(), Some("127.0.0.1"));
        assert_eq!(guest.peer_address(), Some("127.0.0.1"));

        let mv = MoveMessage {
            from: Square { file: 6, rank: 1 },
            to: Square { file: 6, rank: 3 },
            promotion: PromotionKind::None,
            kind: MoveKind::Normal,
        };
        host.send_event(&GameEvent::Move(mv)).unwrap();

        let raw = poll_until(&mut guest).expect("move never arrived");
        assert_eq!(raw.kind(), MessageKind::Move);
        assert_eq!(raw.payload(), &[6, 1, 6, 3, 0, 0]);
        assert_eq!(raw.to_event().unwrap(), GameEvent::Move(mv));
        assert_eq!(host.stats().bytes_sent, 7);
        assert_eq!(guest.stats().messages_received, 1);
    }

    #[test]
    fn test_end_to_end_resign() {
        let (mut host, mut guest) = connected_pair(47111);

        guest.send_message(MessageKind::Resign, &[]).unwrap();

        let raw = poll_until(&mut host).expect("resign never arrived");
        assert_eq!(raw.kind(), MessageKind::Resign);
        assert!(raw.payload().is_empty());
    }

    #[test]
    fn test_wrong_payload_length_never_reaches_socket() {
        let (mut host, mut guest) = connected_pair(47112);

        let err = guest.send_message(MessageKind::Move, &[1, 2]).unwrap_err();
        assert!(matches!(err, NetworkError::Contract(CodecError::WrongLength { .. })));
        assert!(err.os_code().is_none());
        assert!(matches!(
            guest.send_message(MessageKind::Invalid, &[]),
            Err(NetworkError::Contract(CodecError::NotSendable(MessageKind::Invalid)))
        ));
        assert_eq!(guest.stats().messages_sent, 0);

        // The stream is still aligned: the next message arrives intact
        guest.send_message(MessageKind::DrawOffer, &[]).unwrap();
        let raw = poll_until(&mut host).expect("draw offer never arrived");
        assert_eq!(raw.as_bytes(), &[MessageKind::DrawOffer.as_u8()]);
    }

    #[test]
    fn test_idle_poll_respects_timeout() {
        let (_host, mut guest) = connected_pair(47113);

        let started = Instant::now();
        assert!(guest
            .receive_message_if_available(Duration::from_millis(50))
            .unwrap()
            .is_none());
        assert!(guest.receive_message_if_available(Duration::ZERO).unwrap().is_none());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!guest.was_connection_lost());
    }

    #[test]
    fn test_peer_disconnect_sets_sticky_flag() {
        let (mut host, mut guest) = connected_pair(47114);

        host.disconnect();
        assert_eq!(host.role(), ConnectionRole::None);

        let mut polls = 0;
        while !guest.was_connection_lost() && polls < 50 {
            assert!(guest
                .receive_message_if_available(Duration::from_millis(100))
                .unwrap()
                .is_none());
            polls += 1;
        }
        assert!(guest.was_connection_lost());

        // Stays set until cleared, and nothing more decodes
        for _ in 0..3 {
            assert!(guest.receive_message_if_available(Duration::ZERO).unwrap().is_none());
            assert!(guest.was_connection_lost());
        }
        guest.clear_connection_lost();
        assert!(guest.receive_message_if_available(Duration::ZERO).unwrap().is_none());
        assert!(!guest.was_connection_lost());

        guest.disconnect();
        assert_eq!(guest.role(), ConnectionRole::None);
    }

    fn read_failing_with(conn: &P2pConnection, kind: io::ErrorKind) -> io::Result<ReadOutcome> {
        conn.runtime.block_on(async {
            let mut mock = tokio_test::io::Builder::new()
                .read_error(io::Error::from(kind))
                .build();
            let mut pending = BytesMut::new();
            transport::read_message(&mut mock, &mut pending).await
        })
    }

    #[test]
    fn test_reset_counts_as_peer_loss() {
        let (_host, mut guest) = connected_pair(47117);

        for kind in [io::ErrorKind::ConnectionReset, io::ErrorKind::ConnectionAborted] {
            let read = read_failing_with(&guest, kind);
            assert!(guest.finish_read(Some(read)).unwrap().is_none());
            assert!(guest.was_connection_lost());

            // The socket is not read again after a reset
            assert!(guest.receive_message_if_available(Duration::ZERO).unwrap().is_none());
            assert_eq!(guest.stats().messages_received, 0);
            guest.clear_connection_lost();
        }
        assert!(guest.is_connected());
    }

    #[test]
    fn test_other_read_errors_are_fatal() {
        let (_host, mut guest) = connected_pair(47118);

        let read = read_failing_with(&guest, io::ErrorKind::PermissionDenied);
        let err = guest.finish_read(Some(read)).unwrap_err();
        assert!(matches!(err, NetworkError::ReceiveFailure { .. }));
        assert!(!guest.was_connection_lost());
    }

    #[test]
    fn test_setup_rejected_while_connected() {
        let (mut host, mut guest) = connected_pair(47115);

        assert!(matches!(
            guest.connect_to_peer("127.0.0.1"),
            Err(NetworkError::InvalidState { .. })
        ));
        assert!(matches!(
            host.listen_for_peer(Duration::from_millis(10)),
            Err(NetworkError::InvalidState { .. })
        ));
        assert_eq!(guest.role(), ConnectionRole::Guest);
        assert_eq!(host.role(), ConnectionRole::Host);
    }

    #[test]
    fn test_poll_event_decodes() {
        let (mut host, mut guest) = connected_pair(47116);

        host.send_event(&GameEvent::RematchRequest).unwrap();
        host.send_event(&GameEvent::RematchAccept).unwrap();

        let mut events = Vec::new();
        for _ in 0..50 {
            if let Some(event) = guest.poll_event(Duration::from_millis(100)).unwrap() {
                events.push(event);
            }
            if events.len() == 2 {
                break;
            }
        }
        assert_eq!(events, vec![GameEvent::RematchRequest, GameEvent::RematchAccept]);
    }
}

//! Raw socket operations
//!
//! Thin async wrappers over tokio's TCP types. Timeouts and error mapping
//! are applied by the caller; these only report `io::Error`s.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::protocol::{bytes_needed, MAX_WIRE_SIZE};

/// Result of reading from the peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One complete message, tag included
    Message(Bytes),
    /// The peer closed its end of the stream
    PeerClosed,
}

/// Open a TCP connection to `addr`
pub async fn connect_ipv4(addr: SocketAddrV4) -> io::Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Bind and listen on all IPv4 interfaces
pub async fn bind_ipv4(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)).await
}

/// Accept one incoming connection
pub async fn accept(listener: &TcpListener) -> io::Result<(TcpStream, SocketAddr)> {
    let (stream, addr) = listener.accept().await?;
    stream.set_nodelay(true)?;
    Ok((stream, addr))
}

/// Write the whole buffer, looping over partial writes
pub async fn send_all<W: AsyncWrite + Unpin>(writer: &mut W, buf: &[u8]) -> io::Result<()> {
    writer.write_all(buf).await?;
    writer.flush().await
}

/// Read until `pending` holds one complete message.
///
/// Never reads past the end of the current message: the first read asks for
/// the tag byte only, and later reads ask for exactly the bytes the tag says
/// are still missing. Bytes already in `pending` count toward the message,
/// so a call that is cancelled part-way can be resumed by calling again with
/// the same buffer. An unknown tag is reported as `InvalidData`.
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    pending: &mut BytesMut,
) -> io::Result<ReadOutcome> {
    let mut chunk = [0u8; MAX_WIRE_SIZE];
    loop {
        let wanted = bytes_needed(pending)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if wanted == 0 {
            return Ok(ReadOutcome::Message(pending.split().freeze()));
        }

        let n = reader.read(&mut chunk[..wanted]).await?;
        if n == 0 {
            return Ok(ReadOutcome::PeerClosed);
        }
        pending.extend_from_slice(&chunk[..n]);
    }
}

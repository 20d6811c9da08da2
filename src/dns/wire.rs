//! Raw DNS message transport over UDP and TCP.
//!
//! These functions move already-encoded messages; they know nothing about
//! DNS semantics. Timeouts are applied by the caller around the whole
//! exchange.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use crate::config::UDP_RECEIVE_BUFFER;
use crate::error_handling::ProbeError;

/// Sends one datagram to `server` and returns the first datagram received
/// back on the same connected socket.
pub async fn exchange_udp(server: SocketAddr, request: &[u8]) -> Result<Vec<u8>, ProbeError> {
    let bind: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind).await?;
    socket.connect(server).await?;
    socket.send(request).await?;

    let mut buf = vec![0u8; UDP_RECEIVE_BUFFER];
    let len = socket.recv(&mut buf).await?;
    buf.truncate(len);
    Ok(buf)
}

/// Opens a TCP connection to `server`, sends one framed message and reads
/// the first framed message back.
pub async fn exchange_tcp(server: SocketAddr, request: &[u8]) -> Result<Vec<u8>, ProbeError> {
    let mut stream = TcpStream::connect(server).await?;
    send_tcp_bytes(&mut stream, request).await?;
    read_tcp_bytes(&mut stream).await
}

/// Writes a message with the two-byte big-endian length prefix used by DNS
/// over TCP.
pub async fn send_tcp_bytes<S>(stream: &mut S, bytes: &[u8]) -> Result<(), ProbeError>
where
    S: AsyncWrite + Unpin,
{
    let len = u16::try_from(bytes.len())
        .map_err(|_| ProbeError::Malformed(format!("message too large: {} bytes", bytes.len())))?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(bytes).await?;
    stream.flush().await?;
    Ok(())
}

/// Reads one length-prefixed DNS message from a TCP stream.
///
/// A stream that closes before the announced length has arrived is a
/// malformed response, not an I/O error.
pub async fn read_tcp_bytes<S>(stream: &mut S) -> Result<Vec<u8>, ProbeError>
where
    S: AsyncRead + Unpin,
{
    let expected = stream.read_u16().await? as usize;
    let mut bytes = vec![0u8; expected];
    match stream.read_exact(&mut bytes).await {
        Ok(_) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ProbeError::Malformed(
            format!("TCP message shorter than announced {expected} bytes"),
        )),
        Err(e) => Err(e.into()),
    }
}

//! Transport abstraction for connectionless event feeds.
//!
//! The ingestion pipeline only needs two operations: receive one datagram and
//! send one datagram. Production uses a connected tokio [`UdpSocket`]; tests
//! substitute in-memory feeds that can also report a closed connection.

use std::io;

use async_trait::async_trait;
use tokio::net::UdpSocket;

/// A connected datagram endpoint.
///
/// Each call moves exactly one datagram. Nothing is retried, reordered, or
/// deduplicated; whatever the underlying transport delivers is what the
/// caller sees.
#[async_trait]
pub trait DatagramConnection: Send + Sync + 'static {
    /// Receive one datagram into `buf`.
    ///
    /// Returns the number of bytes written, or `Ok(None)` if the connection
    /// is closed and no further datagrams will arrive. A datagram longer than
    /// `buf` is truncated.
    async fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>>;

    /// Send one datagram to the peer.
    async fn send(&self, buf: &[u8]) -> io::Result<usize>;
}

/// UDP never reports a close, so the reader runs until it is torn down.
#[async_trait]
impl DatagramConnection for UdpSocket {
    async fn recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        UdpSocket::recv(self, buf).await.map(Some)
    }

    async fn send(&self, buf: &[u8]) -> io::Result<usize> {
        UdpSocket::send(self, buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn udp_socket_moves_datagrams() {
        let server = UdpSocket::bind("127.0.0.1:0").await.expect("bind server");
        let client = UdpSocket::bind("127.0.0.1:0").await.expect("bind client");
        client.connect(server.local_addr().expect("server addr")).await.expect("connect");

        let sent = DatagramConnection::send(&client, b"hello").await.expect("send");
        assert_eq!(sent, 5);

        let mut buf = [0u8; 16];
        let (n, peer) = server.recv_from(&mut buf).await.expect("recv_from");
        assert_eq!(&buf[..n], b"hello");

        server.send_to(b"world", peer).await.expect("send_to");
        let n = DatagramConnection::recv(&client, &mut buf).await.expect("recv");
        assert_eq!(n, Some(5));
        assert_eq!(&buf[..5], b"world");
    }
}

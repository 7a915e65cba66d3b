//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Each message is prefixed with its two-byte big-endian length. One
//! connection per exchange; the stream is closed when the response is read.

use super::resolver::socket_addr_for;
use super::{deadline_after, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dns_sql_domain::{NameserverAddr, TransportError};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout_at;
use tracing::debug;

pub struct TcpTransport {
    server: NameserverAddr,
}

impl TcpTransport {
    pub fn new(server: NameserverAddr) -> Self {
        Self { server }
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let deadline = deadline_after(timeout);
        let server_addr = socket_addr_for(&self.server, timeout).await?;
        let timed_out = || TransportError::Timeout {
            server: server_addr.to_string(),
        };

        let mut stream = timeout_at(deadline, TcpStream::connect(server_addr))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        stream
            .set_nodelay(true)
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        timeout_at(deadline, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        debug!(
            server = %server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = timeout_at(deadline, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        debug!(
            server = %server_addr,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "message too large for TCP framing: {} bytes",
                message_bytes.len()
            ),
        )
    })?;

    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;

    Ok(response)
}

//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! The socket is connected to the nameserver so datagrams from other sources
//! never reach us and ICMP port-unreachable surfaces as `ConnectionRefused`.
//! Datagrams whose id, QR bit or question do not match the request are
//! discarded and the receive continues until the deadline.

use super::resolver::socket_addr_for;
use super::{deadline_after, DnsTransport, TransportResponse};
use crate::dns::wire::decode_header_and_questions;
use async_trait::async_trait;
use dns_sql_domain::{NameserverAddr, TransportError};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout_at;
use tracing::{debug, warn};

/// Largest datagram the socket will accept. Anything above
/// [`crate::dns::wire::MAX_UDP_PAYLOAD`] is handed back so the caller can
/// switch to TCP.
const RECV_BUFFER_SIZE: usize = 65535;

pub struct UdpTransport {
    server: NameserverAddr,
}

impl UdpTransport {
    pub fn new(server: NameserverAddr) -> Self {
        Self { server }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let deadline = deadline_after(timeout);
        let server_addr = socket_addr_for(&self.server, timeout).await?;

        let (request_header, request_questions) = decode_header_and_questions(message_bytes)
            .map_err(|e| TransportError::Protocol {
                server: server_addr.to_string(),
                reason: format!("invalid request: {}", e),
            })?;
        let expected_question =
            request_questions
                .first()
                .ok_or_else(|| TransportError::Protocol {
                    server: server_addr.to_string(),
                    reason: "request carries no question".to_string(),
                })?;

        let bind_addr = if server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| TransportError::from_io(server_addr, &e))?;
        socket
            .connect(server_addr)
            .await
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        let bytes_sent = timeout_at(deadline, socket.send(message_bytes))
            .await
            .map_err(|_| TransportError::Timeout {
                server: server_addr.to_string(),
            })?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        debug!(server = %server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            let bytes_received = timeout_at(deadline, socket.recv(&mut recv_buf))
                .await
                .map_err(|_| TransportError::Timeout {
                    server: server_addr.to_string(),
                })?
                .map_err(|e| TransportError::from_io(server_addr, &e))?;

            let datagram = &recv_buf[..bytes_received];

            match decode_header_and_questions(datagram) {
                Ok((header, questions))
                    if header.id == request_header.id
                        && header.response
                        && questions.len() == 1
                        && questions[0].matches(expected_question) =>
                {
                    debug!(server = %server_addr, bytes_received, "UDP response received");
                    return Ok(TransportResponse {
                        bytes: datagram.to_vec(),
                        protocol_used: "UDP",
                    });
                }
                Ok((header, _)) => {
                    warn!(
                        server = %server_addr,
                        expected_id = request_header.id,
                        received_id = header.id,
                        "Discarding UDP response that does not match the query"
                    );
                }
                Err(e) => {
                    warn!(
                        server = %server_addr,
                        error = %e,
                        "Discarding undecodable UDP datagram"
                    );
                }
            }
        }
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

use super::tcp::TcpTransport;
use super::{create_transport, DnsTransport, TransportResponse};
use crate::dns::wire::{is_truncated, MAX_UDP_PAYLOAD};
use async_trait::async_trait;
use dns_sql_domain::{DnsProtocol, TransportError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Floor for the TCP retry budget once the UDP leg used up the attempt timeout.
const MIN_TCP_FALLBACK_BUDGET: Duration = Duration::from_millis(500);

/// Sends one wire-format request to one nameserver and returns the raw reply.
///
/// The resolver client depends on this seam rather than on sockets, so retry
/// and failover can be exercised without a network.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    async fn exchange(
        &self,
        server: &DnsProtocol,
        request: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: DnsExchange + ?Sized> DnsExchange for Arc<T> {
    async fn exchange(
        &self,
        server: &DnsProtocol,
        request: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        (**self).exchange(server, request, timeout).await
    }
}

/// Exchange over real sockets. A UDP reply with TC set, or one larger than
/// [`MAX_UDP_PAYLOAD`], is discarded and the same request is re-issued over
/// TCP to the same address.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkExchange;

#[async_trait]
impl DnsExchange for NetworkExchange {
    async fn exchange(
        &self,
        server: &DnsProtocol,
        request: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let start = Instant::now();
        let transport = create_transport(server)?;
        let response = transport.send(request, timeout).await?;

        let DnsProtocol::Udp { addr } = server else {
            return Ok(response);
        };

        let truncated = is_truncated(&response.bytes);
        let oversized = response.bytes.len() > MAX_UDP_PAYLOAD;
        if !truncated && !oversized {
            return Ok(response);
        }

        debug!(
            server = %addr,
            truncated,
            response_len = response.bytes.len(),
            "UDP response unusable, retrying over TCP"
        );

        let remaining = timeout
            .checked_sub(start.elapsed())
            .unwrap_or_default()
            .max(MIN_TCP_FALLBACK_BUDGET);

        TcpTransport::new(addr.clone()).send(request, remaining).await
    }
}

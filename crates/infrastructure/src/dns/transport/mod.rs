pub mod exchange;
#[cfg(feature = "dns-over-https")]
pub mod https;
pub mod resolver;
pub mod tcp;
#[cfg(feature = "dns-over-rustls")]
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use dns_sql_domain::{DnsProtocol, TransportError};
use std::time::Duration;

pub use exchange::{DnsExchange, NetworkExchange};

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

/// One request/response exchange with one nameserver. Every call opens and
/// releases its own socket; nothing is shared between calls.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;

    fn protocol_name(&self) -> &'static str;
}

/// Deadline `timeout` from now. Durations past the clock's range are capped
/// at one day.
pub(crate) fn deadline_after(timeout: Duration) -> tokio::time::Instant {
    let now = tokio::time::Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(24 * 60 * 60))
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tls::TlsTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(_) => "TLS",
            #[cfg(feature = "dns-over-https")]
            Self::Https(_) => "HTTPS",
        }
    }
}

pub fn create_transport(protocol: &DnsProtocol) -> Result<Transport, TransportError> {
    match protocol {
        DnsProtocol::Udp { addr } => Ok(Transport::Udp(udp::UdpTransport::new(addr.clone()))),
        DnsProtocol::Tcp { addr } => Ok(Transport::Tcp(tcp::TcpTransport::new(addr.clone()))),

        #[cfg(feature = "dns-over-rustls")]
        DnsProtocol::Tls { addr, hostname } => Ok(Transport::Tls(tls::TlsTransport::new(
            addr.clone(),
            hostname.to_string(),
        ))),

        #[cfg(not(feature = "dns-over-rustls"))]
        DnsProtocol::Tls { .. } => Err(TransportError::Protocol {
            server: protocol.to_string(),
            reason: "TLS support not enabled. Enable the 'dns-over-rustls' feature".to_string(),
        }),

        #[cfg(feature = "dns-over-https")]
        DnsProtocol::Https { url, .. } => Ok(Transport::Https(https::HttpsTransport::new(
            url.to_string(),
        ))),

        #[cfg(not(feature = "dns-over-https"))]
        DnsProtocol::Https { url, .. } => Err(TransportError::Protocol {
            server: url.to_string(),
            reason: "HTTPS support not enabled. Enable the 'dns-over-https' feature".to_string(),
        }),
    }
}

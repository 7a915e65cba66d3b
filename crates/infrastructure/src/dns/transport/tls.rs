//! TLS Transport for DNS queries, DNS-over-TLS (RFC 7858)
//!
//! Same framing as TCP inside a TLS session. The certificate is verified
//! against the webpki roots using the configured hostname; a fresh
//! connection is made for every exchange.

use super::resolver::socket_addr_for;
use super::tcp::{read_with_length_prefix, send_with_length_prefix};
use super::{deadline_after, DnsTransport, TransportResponse};
use async_trait::async_trait;
use dns_sql_domain::{NameserverAddr, TransportError};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout_at;
use tracing::debug;

/// Shared TLS config, built once and reused for every DoT exchange.
static SHARED_TLS_CONFIG: LazyLock<Result<Arc<ClientConfig>, rustls::Error>> =
    LazyLock::new(|| {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        client_config(root_store)
    });

/// Client config trusting `roots`. The crypto provider is named explicitly:
/// the host process may link more than one, and none is installed globally.
pub fn client_config(roots: RootCertStore) -> Result<Arc<ClientConfig>, rustls::Error> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

pub struct TlsTransport {
    server: NameserverAddr,
    hostname: String,
    config: Option<Arc<ClientConfig>>,
}

impl TlsTransport {
    pub fn new(server: NameserverAddr, hostname: String) -> Self {
        Self {
            server,
            hostname,
            config: None,
        }
    }

    /// Uses `config` instead of the shared webpki-rooted one.
    pub fn with_client_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.config = Some(config);
        self
    }

    fn client_config(&self, server: &str) -> Result<Arc<ClientConfig>, TransportError> {
        if let Some(config) = &self.config {
            return Ok(Arc::clone(config));
        }
        SHARED_TLS_CONFIG
            .as_ref()
            .map(Arc::clone)
            .map_err(|e| TransportError::Protocol {
                server: server.to_string(),
                reason: format!("TLS client configuration failed: {}", e),
            })
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
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

        let server_name = ServerName::try_from(self.hostname.clone()).map_err(|e| {
            TransportError::Protocol {
                server: server_addr.to_string(),
                reason: format!("invalid TLS hostname '{}': {}", self.hostname, e),
            }
        })?;

        let tcp_stream = timeout_at(deadline, TcpStream::connect(server_addr))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        let config = self.client_config(&server_addr.to_string())?;
        let connector = tokio_rustls::TlsConnector::from(config);
        let mut stream = timeout_at(deadline, connector.connect(server_name, tcp_stream))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::Protocol {
                server: server_addr.to_string(),
                reason: format!("TLS handshake failed: {}", e),
            })?;

        debug!(server = %server_addr, hostname = %self.hostname, "TLS connection established");

        timeout_at(deadline, send_with_length_prefix(&mut stream, message_bytes))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        let response_bytes = timeout_at(deadline, read_with_length_prefix(&mut stream))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| TransportError::from_io(server_addr, &e))?;

        debug!(
            server = %server_addr,
            response_len = response_bytes.len(),
            "TLS response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}

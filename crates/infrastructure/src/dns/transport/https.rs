//! HTTPS Transport for DNS queries, DNS-over-HTTPS (RFC 8484)
//!
//! The request body is the raw wire-format query sent as a POST with
//! `application/dns-message`; the response body is the raw wire-format reply.
//!
//! Requires the `dns-over-https` feature flag.

use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use dns_sql_domain::TransportError;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Shared client configuration. Idle connections are not kept, so no
/// connection outlives the exchange that opened it.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// RFC 8484 §4.2.1
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

pub struct HttpsTransport {
    url: String,
}

impl HttpsTransport {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    fn map_request_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                server: self.url.clone(),
            }
        } else if err.is_connect() {
            TransportError::Unreachable {
                server: self.url.clone(),
                reason: err.to_string(),
            }
        } else {
            TransportError::Protocol {
                server: self.url.clone(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        debug!(
            url = %self.url,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        let exchange = async {
            let response = SHARED_CLIENT
                .post(&self.url)
                .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
                .body(message_bytes.to_vec())
                .send()
                .await
                .map_err(|e| self.map_request_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Protocol {
                    server: self.url.clone(),
                    reason: format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    ),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| self.map_request_error(e))
        };

        let response_bytes = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                server: self.url.clone(),
            })??;

        debug!(
            url = %self.url,
            response_len = response_bytes.len(),
            "DoH response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes.to_vec(),
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}

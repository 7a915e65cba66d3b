use crate::dns::transport::{DnsExchange, NetworkExchange};
use crate::dns::wire::{decode_message, encode_query};
use async_trait::async_trait;
use dns_sql_application::ports::DnsResolver;
use dns_sql_domain::{
    DnsProtocol, DnsQuery, Message, ResolutionResult, ResolveError, ResolverConfig, ResponseCode,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// What one attempt against one nameserver leads to.
enum Attempt {
    Answered(Message),
    Definitive(ResolveError),
    /// Try the same nameserver again, after backoff.
    Retry(String),
    /// Give up on this nameserver.
    NextServer(String),
}

/// Resolves queries against the nameservers of one immutable configuration.
///
/// Nameservers are walked in order. Each gets `1 + retries` attempts with a
/// fresh transaction id per attempt and a linear backoff between attempts.
pub struct ResolverClient<E = NetworkExchange> {
    config: Arc<ResolverConfig>,
    exchange: E,
}

impl ResolverClient<NetworkExchange> {
    pub fn new(config: Arc<ResolverConfig>) -> Self {
        Self::with_exchange(config, NetworkExchange)
    }
}

impl<E: DnsExchange> ResolverClient<E> {
    pub fn with_exchange(config: Arc<ResolverConfig>, exchange: E) -> Self {
        Self { config, exchange }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub async fn resolve_query(&self, query: &DnsQuery) -> Result<ResolutionResult, ResolveError> {
        let name = query.domain.to_string();

        if self.config.servers.is_empty() {
            return Err(ResolveError::NoNameservers { name });
        }

        let attempts_per_server = self.config.attempts_per_server();
        let mut attempts = 0usize;
        let mut last_error: Option<String> = None;

        debug!(
            domain = %name,
            record_type = %query.record_type,
            servers = self.config.servers.len(),
            attempts_per_server,
            "Resolving"
        );

        for (position, server) in self.config.servers.iter().enumerate() {
            for attempt in 0..attempts_per_server {
                if attempt > 0 {
                    // attempt < 1 + retries, which is a u32
                    let step = u32::try_from(attempt).unwrap_or(u32::MAX);
                    tokio::time::sleep(self.config.backoff.saturating_mul(step)).await;
                }
                attempts += 1;

                match self.attempt(query, server).await? {
                    Attempt::Answered(message) => {
                        debug!(
                            domain = %name,
                            server = %server,
                            position,
                            answers = message.answers.len(),
                            "Nameserver answered"
                        );
                        return Ok(ResolutionResult::from_message(message, server.to_string()));
                    }
                    Attempt::Definitive(err) => return Err(err),
                    Attempt::Retry(reason) => {
                        warn!(server = %server, domain = %name, attempt, error = %reason, "Attempt failed, retrying");
                        last_error = Some(reason);
                    }
                    Attempt::NextServer(reason) => {
                        warn!(server = %server, domain = %name, position, error = %reason, "Failing over");
                        last_error = Some(reason);
                        break;
                    }
                }
            }
        }

        Err(ResolveError::AllNameserversFailed {
            name,
            attempts,
            last_error,
        })
    }

    async fn attempt(&self, query: &DnsQuery, server: &DnsProtocol) -> Result<Attempt, ResolveError> {
        let attempt_query = query.with_fresh_id();
        let request = encode_query(&attempt_query).map_err(|e| ResolveError::InvalidQuery {
            name: query.domain.to_string(),
            reason: e.to_string(),
        })?;

        let response = match self
            .exchange
            .exchange(server, &request, self.config.timeout)
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_retryable() => return Ok(Attempt::Retry(e.to_string())),
            Err(e) => return Ok(Attempt::NextServer(e.to_string())),
        };

        let message = match decode_message(&response.bytes) {
            Ok(message) => message,
            Err(e) => {
                return Ok(Attempt::NextServer(format!(
                    "undecodable response from {}: {}",
                    server, e
                )))
            }
        };

        if !message.answers_question(attempt_query.id, &attempt_query.question()) {
            return Ok(Attempt::Retry(format!(
                "response from {} does not match the query (id {} vs {})",
                server, message.header.id, attempt_query.id
            )));
        }

        let name = query.domain.to_string();
        Ok(match message.rcode() {
            ResponseCode::NoError => Attempt::Answered(message),
            ResponseCode::NXDomain => Attempt::Definitive(ResolveError::Nxdomain { name }),
            ResponseCode::ServFail => Attempt::Definitive(ResolveError::ServerFailure {
                name,
                server: server.to_string(),
            }),
            other => Attempt::NextServer(format!("{} from {}", other, server)),
        })
    }
}

#[async_trait]
impl<E: DnsExchange> DnsResolver for ResolverClient<E> {
    async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionResult, ResolveError> {
        self.resolve_query(query).await
    }
}

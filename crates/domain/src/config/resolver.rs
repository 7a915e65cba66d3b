use crate::errors::ConfigError;
use crate::DnsProtocol;
use serde::{Deserialize, Serialize, Serializer};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_NDOTS: usize = 1;

/// Upper bounds shared by resolv.conf parsing and `dns_configure`. They keep
/// every resolution finite (see [`ResolverConfig::worst_case_latency`]).
pub const MAX_TIMEOUT_SECS: u64 = 30;
pub const MAX_ATTEMPTS: u32 = 5;
pub const MAX_BACKOFF_MS: u64 = 5_000;
pub const MAX_NDOTS: usize = 15;

/// Immutable resolver settings. Reconfiguration builds a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverConfig {
    pub servers: Vec<DnsProtocol>,

    /// Per-attempt wait.
    #[serde(serialize_with = "serialize_secs")]
    pub timeout: Duration,

    /// Extra attempts per nameserver after the first one.
    pub retries: u32,

    /// Linear backoff unit: the wait before retry `n` is `backoff * n`.
    #[serde(rename = "backoff_ms", serialize_with = "serialize_millis")]
    pub backoff: Duration,

    pub ndots: usize,

    pub search: Vec<String>,
}

fn serialize_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

fn serialize_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            servers: vec![DnsProtocol::udp(SocketAddr::new(
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                crate::dns_protocol::DEFAULT_DNS_PORT,
            ))],
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
            ndots: DEFAULT_NDOTS,
            search: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn new(servers: Vec<DnsProtocol>) -> Self {
        Self {
            servers,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Same settings, but only `server` is asked.
    pub fn with_single_server(&self, server: DnsProtocol) -> Self {
        Self {
            servers: vec![server],
            ..self.clone()
        }
    }

    pub fn attempts_per_server(&self) -> usize {
        1 + self.retries as usize
    }

    /// Upper bound on the wall time of one resolution.
    pub fn worst_case_latency(&self) -> Duration {
        let attempts = self.retries.saturating_add(1);
        let servers = u32::try_from(self.servers.len()).unwrap_or(u32::MAX);
        let backoff_total = self
            .backoff
            .saturating_mul(attempts.saturating_mul(attempts - 1) / 2);
        self.timeout
            .saturating_mul(attempts)
            .saturating_add(backoff_total)
            .saturating_mul(servers)
    }

    /// URL of the first nameserver carrying `ndots` and `search` as query
    /// parameters, suitable as a `dns()` nameserver argument.
    pub fn system_resolver_url(&self) -> Option<String> {
        let server = self.servers.first()?;
        let mut url = server.to_string();
        let mut separator = if url.contains('?') { '&' } else { '?' };
        url.push(separator);
        url.push_str(&format!("ndots={}", self.ndots));
        separator = '&';
        for domain in &self.search {
            url.push(separator);
            url.push_str("search=");
            url.push_str(domain);
        }
        Some(url)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.is_empty() {
            return Err(ConfigError::Validation(
                "At least one nameserver is required".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        if self.timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
            return Err(ConfigError::Validation(format!(
                "Timeout must be at most {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }
        if self.retries >= MAX_ATTEMPTS {
            return Err(ConfigError::Validation(format!(
                "Retries must be at most {}",
                MAX_ATTEMPTS - 1
            )));
        }
        if self.backoff > Duration::from_millis(MAX_BACKOFF_MS) {
            return Err(ConfigError::Validation(format!(
                "Backoff must be at most {} ms",
                MAX_BACKOFF_MS
            )));
        }
        if self.ndots > MAX_NDOTS {
            return Err(ConfigError::Validation(format!(
                "ndots must be at most {}",
                MAX_NDOTS
            )));
        }
        Ok(())
    }

    /// Builds a new configuration from this one with `overrides` applied.
    pub fn apply(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut next = self.clone();

        if let Some(servers) = &overrides.servers {
            next.servers = servers
                .iter()
                .map(|s| {
                    s.parse::<DnsProtocol>()
                        .map_err(|e| ConfigError::InvalidNameserver(s.clone(), e))
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(timeout) = overrides.timeout {
            let invalid = || {
                ConfigError::Validation(format!(
                    "Invalid timeout {}: expected a positive number of seconds",
                    timeout
                ))
            };
            if timeout <= 0.0 {
                return Err(invalid());
            }
            next.timeout = Duration::try_from_secs_f64(timeout).map_err(|_| invalid())?;
        }
        if let Some(retries) = overrides.retries {
            next.retries = retries;
        }
        if let Some(backoff_ms) = overrides.backoff_ms {
            next.backoff = Duration::from_millis(backoff_ms);
        }
        if let Some(ndots) = overrides.ndots {
            next.ndots = ndots;
        }
        if let Some(search) = &overrides.search {
            next.search = search.clone();
        }

        next.validate()?;
        Ok(next)
    }
}

/// Partial settings accepted by `dns_configure`. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub servers: Option<Vec<String>>,

    /// Seconds, fractions allowed.
    #[serde(default)]
    pub timeout: Option<f64>,

    #[serde(default)]
    pub retries: Option<u32>,

    #[serde(default)]
    pub backoff_ms: Option<u64>,

    #[serde(default)]
    pub ndots: Option<usize>,

    #[serde(default)]
    pub search: Option<Vec<String>>,
}

impl ConfigOverrides {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

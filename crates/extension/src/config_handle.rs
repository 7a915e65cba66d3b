use arc_swap::ArcSwap;
use dns_sql_application::ports::ConfigSource;
use dns_sql_domain::{ConfigError, ConfigOverrides, ResolverConfig};
use std::sync::Arc;
use tracing::info;

/// Live resolver configuration of one connection.
///
/// Readers take an immutable snapshot; reconfiguration swaps in a new value.
/// A resolution already running keeps the snapshot it started with.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<ArcSwap<ResolverConfig>>,
}

impl ConfigHandle {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<ResolverConfig> {
        self.inner.load_full()
    }

    /// Applies `overrides` onto the current configuration and swaps the
    /// result in. Nothing changes when the overrides are rejected.
    pub fn reconfigure(&self, overrides: &ConfigOverrides) -> Result<Arc<ResolverConfig>, ConfigError> {
        let next = Arc::new(self.snapshot().apply(overrides)?);
        self.inner.store(Arc::clone(&next));

        info!(
            servers = next.servers.len(),
            timeout_ms = next.timeout.as_millis() as u64,
            retries = next.retries,
            worst_case_ms = next.worst_case_latency().as_millis() as u64,
            "Resolver configuration updated"
        );
        Ok(next)
    }
}

impl ConfigSource for ConfigHandle {
    fn current(&self) -> Arc<ResolverConfig> {
        self.snapshot()
    }
}

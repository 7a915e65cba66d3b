use dns_sql_domain::ResolverConfig;
use std::sync::Arc;

/// Read access to the live resolver configuration.
pub trait ConfigSource: Send + Sync {
    /// Snapshot of the configuration in effect now. Later reconfiguration
    /// never changes a returned snapshot.
    fn current(&self) -> Arc<ResolverConfig>;
}

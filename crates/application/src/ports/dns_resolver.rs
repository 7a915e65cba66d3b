use async_trait::async_trait;
use dns_sql_domain::{DnsQuery, ResolutionResult, ResolveError, ResolverConfig};
use std::sync::Arc;

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionResult, ResolveError>;
}

/// Builds a resolver bound to one immutable configuration.
pub trait ResolverFactory: Send + Sync {
    fn create(&self, config: Arc<ResolverConfig>) -> Arc<dyn DnsResolver>;
}

use super::client::ResolverClient;
use dns_sql_application::ports::{DnsResolver, ResolverFactory};
use dns_sql_domain::ResolverConfig;
use std::sync::Arc;

/// Builds [`ResolverClient`]s that talk to real nameservers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkResolverFactory;

impl ResolverFactory for NetworkResolverFactory {
    fn create(&self, config: Arc<ResolverConfig>) -> Arc<dyn DnsResolver> {
        Arc::new(ResolverClient::new(config))
    }
}

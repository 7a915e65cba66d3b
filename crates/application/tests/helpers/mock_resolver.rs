#![allow(dead_code)]
use async_trait::async_trait;
use dns_sql_application::ports::{ConfigSource, DnsResolver, ResolverFactory};
use dns_sql_domain::{
    DnsClass, DnsQuery, RData, ResolutionResult, ResolveError, ResolverConfig, ResourceRecord,
    ResponseCode, Section, SectionedRecord,
};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

pub struct StaticConfigSource(pub Arc<ResolverConfig>);

impl StaticConfigSource {
    pub fn new(config: ResolverConfig) -> Arc<Self> {
        Arc::new(Self(Arc::new(config)))
    }
}

impl ConfigSource for StaticConfigSource {
    fn current(&self) -> Arc<ResolverConfig> {
        Arc::clone(&self.0)
    }
}

/// Records every query and the configuration it was resolved under.
#[derive(Default)]
pub struct MockDnsResolver {
    pub queries: Mutex<Vec<(DnsQuery, Arc<ResolverConfig>)>>,
    error: Mutex<Option<ResolveError>>,
}

impl MockDnsResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, error: ResolveError) {
        *self.error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<(DnsQuery, Arc<ResolverConfig>)> {
        self.queries.lock().unwrap().last().cloned()
    }
}

struct BoundResolver {
    mock: Arc<MockDnsResolver>,
    config: Arc<ResolverConfig>,
}

#[async_trait]
impl DnsResolver for BoundResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionResult, ResolveError> {
        self.mock
            .queries
            .lock()
            .unwrap()
            .push((query.clone(), Arc::clone(&self.config)));

        if let Some(error) = self.mock.error.lock().unwrap().clone() {
            return Err(error);
        }

        let record = ResourceRecord::new(
            query.domain.clone(),
            DnsClass::IN,
            60,
            RData::A {
                address: Ipv4Addr::new(93, 184, 216, 34),
            },
        );
        Ok(ResolutionResult {
            records: vec![SectionedRecord {
                section: Section::Answer,
                record,
            }],
            truncated: false,
            rcode: ResponseCode::NoError,
            nameserver: self
                .config
                .servers
                .first()
                .map(|s| s.to_string())
                .unwrap_or_default(),
        })
    }
}

/// Hands out resolvers that all report to the same [`MockDnsResolver`].
pub struct MockResolverFactory(pub Arc<MockDnsResolver>);

impl ResolverFactory for MockResolverFactory {
    fn create(&self, config: Arc<ResolverConfig>) -> Arc<dyn DnsResolver> {
        Arc::new(BoundResolver {
            mock: Arc::clone(&self.0),
            config,
        })
    }
}

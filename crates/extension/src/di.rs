use crate::config_handle::ConfigHandle;
use dns_sql_application::ports::{ConfigSource, ResolverFactory};
use dns_sql_application::use_cases::{LookupRecordsUseCase, SearchListUseCase};
use dns_sql_infrastructure::dns::NetworkResolverFactory;
use std::sync::Arc;

/// Everything the SQL functions of one connection share.
#[derive(Clone)]
pub struct UseCases {
    pub config: ConfigHandle,
    pub lookup_records: Arc<LookupRecordsUseCase>,
    pub search_list: Arc<SearchListUseCase>,
}

impl UseCases {
    pub fn new(config: ConfigHandle) -> Self {
        Self::with_factory(config, Arc::new(NetworkResolverFactory))
    }

    pub fn with_factory(config: ConfigHandle, resolvers: Arc<dyn ResolverFactory>) -> Self {
        let source: Arc<dyn ConfigSource> = Arc::new(config.clone());

        Self {
            lookup_records: Arc::new(LookupRecordsUseCase::new(Arc::clone(&source), resolvers)),
            search_list: Arc::new(SearchListUseCase::new(source)),
            config,
        }
    }
}

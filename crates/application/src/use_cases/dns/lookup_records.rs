use crate::errors::LookupError;
use crate::ports::{ConfigSource, ResolverFactory};
use dns_sql_domain::{DnsClass, DnsProtocol, DnsQuery, RecordType, ResolutionResult};
use std::sync::Arc;
use tracing::debug;

/// Arguments of one `dns()` invocation, as given by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupRequest {
    pub name: Option<String>,
    pub record_type: Option<String>,
    pub class: Option<String>,
    pub nameserver: Option<String>,
}

impl LookupRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_nameserver(mut self, nameserver: impl Into<String>) -> Self {
        self.nameserver = Some(nameserver.into());
        self
    }
}

pub struct LookupRecordsUseCase {
    config: Arc<dyn ConfigSource>,
    resolvers: Arc<dyn ResolverFactory>,
}

impl LookupRecordsUseCase {
    pub fn new(config: Arc<dyn ConfigSource>, resolvers: Arc<dyn ResolverFactory>) -> Self {
        Self { config, resolvers }
    }

    /// Validates the arguments and resolves them exactly once.
    pub async fn execute(&self, request: &LookupRequest) -> Result<ResolutionResult, LookupError> {
        let query = build_query(request)?;

        let mut config = self.config.current();
        if let Some(server) = request.nameserver.as_deref() {
            let server: DnsProtocol = server.parse().map_err(|e| {
                LookupError::InvalidArgument(format!("invalid nameserver '{}': {}", server, e))
            })?;
            config = Arc::new(config.with_single_server(server));
        }

        debug!(
            domain = %query.domain,
            record_type = %query.record_type,
            class = %query.class,
            servers = config.servers.len(),
            "Looking up records"
        );

        let resolver = self.resolvers.create(config);
        Ok(resolver.resolve(&query).await?)
    }
}

fn build_query(request: &LookupRequest) -> Result<DnsQuery, LookupError> {
    let name = match request.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(LookupError::InvalidArgument(
                "a domain name is required".to_string(),
            ))
        }
    };

    let record_type = match request.record_type.as_deref() {
        Some(t) => t
            .parse::<RecordType>()
            .map_err(|_| LookupError::InvalidArgument(format!("unknown record type '{}'", t)))?,
        None => RecordType::A,
    };

    let class = match request.class.as_deref() {
        Some(c) => c
            .parse::<DnsClass>()
            .map_err(|_| LookupError::InvalidArgument(format!("unknown class '{}'", c)))?,
        None => DnsClass::IN,
    };

    Ok(DnsQuery::new(name, record_type).with_class(class))
}

use crate::errors::LookupError;
use crate::ports::ConfigSource;
use dns_sql_domain::dns_name::search_candidates;
use std::sync::Arc;

/// Expands a partial name with the configured search domains.
pub struct SearchListUseCase {
    config: Arc<dyn ConfigSource>,
}

impl SearchListUseCase {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }

    /// Candidate FQDNs for `partial`, in the order a stub resolver tries them.
    /// `ndots` defaults to the configured value.
    pub fn execute(&self, partial: &str, ndots: Option<usize>) -> Result<Vec<String>, LookupError> {
        let partial = partial.trim();
        if partial.is_empty() {
            return Err(LookupError::InvalidArgument(
                "a partial domain name is required".to_string(),
            ));
        }

        let config = self.config.current();
        let ndots = ndots.unwrap_or(config.ndots);
        Ok(search_candidates(partial, ndots, &config.search))
    }
}

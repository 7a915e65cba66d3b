mod config_source;
mod dns_resolver;

pub use config_source::ConfigSource;
pub use dns_resolver::{DnsResolver, ResolverFactory};

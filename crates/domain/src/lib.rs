//! dns-sql domain layer: DNS data model, nameserver configuration and the
//! error taxonomy shared by every other crate.
pub mod config;
pub mod dns_name;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod message;
pub mod resolution;

pub use config::{ConfigOverrides, ResolverConfig};
pub use dns_protocol::{DnsProtocol, NameserverAddr};
pub use dns_query::DnsQuery;
pub use dns_record::{DnsClass, RData, RecordType, ResourceRecord};
pub use errors::{ConfigError, DecodeError, ResolveError, TransportError};
pub use message::{Header, Message, Question, ResponseCode};
pub use resolution::{ResolutionResult, Section, SectionedRecord};

pub mod resolver;
pub mod transport;
pub mod wire;

pub use resolver::{NetworkResolverFactory, ResolverClient};
pub use transport::{DnsExchange, NetworkExchange};

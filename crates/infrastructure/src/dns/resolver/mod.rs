mod client;
mod factory;

pub use client::ResolverClient;
pub use factory::NetworkResolverFactory;

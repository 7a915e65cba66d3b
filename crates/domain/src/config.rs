mod resolver;

pub use resolver::{
    ConfigOverrides, ResolverConfig, MAX_ATTEMPTS, MAX_BACKOFF_MS, MAX_NDOTS, MAX_TIMEOUT_SECS,
};

use tracing_subscriber::EnvFilter;

/// Variable holding the filter directives, e.g. `DNS_SQL_LOG=dns_sql=debug`.
pub const LOG_ENV_VAR: &str = "DNS_SQL_LOG";

/// Installs a stderr subscriber when [`LOG_ENV_VAR`] is set.
///
/// The host process owns logging otherwise: nothing is installed when the
/// variable is absent, and an already installed global subscriber is left
/// alone. Returns whether a subscriber was installed by this call.
pub fn init_logging() -> bool {
    let Ok(directives) = std::env::var(LOG_ENV_VAR) else {
        return false;
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .try_init()
        .is_ok()
}

use dns_sql_application::LookupError;
use dns_sql_domain::{ConfigError, ResolveError};
use thiserror::Error;

/// Failure of one SQL-level call, prefixed with the function that failed.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("{function}: invalid argument: {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },

    #[error("{function}: {kind} for {name}{detail}")]
    Resolve {
        function: &'static str,
        kind: &'static str,
        name: String,
        detail: String,
    },

    #[error("{function}: {source}")]
    Config {
        function: &'static str,
        #[source]
        source: ConfigError,
    },

    #[error("{function}: {reason}")]
    Runtime {
        function: &'static str,
        reason: String,
    },
}

impl AdapterError {
    pub fn invalid_argument(function: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function,
            reason: reason.into(),
        }
    }

    pub fn from_lookup(function: &'static str, err: LookupError) -> Self {
        match err {
            LookupError::InvalidArgument(reason) => Self::InvalidArgument { function, reason },
            LookupError::Resolve(err) => Self::from_resolve(function, err),
        }
    }

    pub fn from_resolve(function: &'static str, err: ResolveError) -> Self {
        let kind = err.kind();
        let name = display_name(err.name());
        let detail = match err {
            ResolveError::ServerFailure { server, .. } => format!(" from {}", server),
            ResolveError::AllNameserversFailed {
                attempts,
                last_error,
                ..
            } => match last_error {
                Some(last) => format!(" after {} attempts: {}", attempts, last),
                None => format!(" after {} attempts", attempts),
            },
            ResolveError::InvalidQuery { reason, .. } => format!(": {}", reason),
            ResolveError::Nxdomain { .. } | ResolveError::NoNameservers { .. } => String::new(),
        };
        Self::Resolve {
            function,
            kind,
            name,
            detail,
        }
    }

    pub fn config(function: &'static str, source: ConfigError) -> Self {
        Self::Config { function, source }
    }
}

/// Names are reported the way users type them: without the root dot.
fn display_name(name: &str) -> String {
    match name.strip_suffix('.') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => name.to_string(),
    }
}

impl From<AdapterError> for rusqlite::Error {
    fn from(err: AdapterError) -> Self {
        rusqlite::Error::ModuleError(err.to_string())
    }
}

/// Scalar functions report through the user-function channel instead of the
/// module one.
pub(crate) fn user_function_error(err: AdapterError) -> rusqlite::Error {
    rusqlite::Error::UserFunctionError(Box::new(err))
}

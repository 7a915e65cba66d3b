use crate::RecordType;
use std::fmt;
use std::io;
use thiserror::Error;

/// Failure to turn bytes into a [`crate::Message`], or a name into labels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed name at offset {offset}: {reason}")]
    MalformedName { offset: usize, reason: &'static str },

    #[error("Message truncated at offset {offset} (needed {needed} more bytes)")]
    TruncatedMessage { offset: usize, needed: usize },

    #[error("RDATA length mismatch for {rtype}: {len} bytes")]
    RdataLengthMismatch { rtype: RecordType, len: usize },

    #[error("Section count mismatch in {section}: declared {declared}, found {found}")]
    UnexpectedSectionCount {
        section: &'static str,
        declared: u16,
        found: u16,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport timeout waiting for {server}")]
    Timeout { server: String },

    #[error("Transport failure reaching {server}: {reason}")]
    Unreachable { server: String, reason: String },

    #[error("Transport connection refused by {server}")]
    ConnectionRefused { server: String },

    #[error("Protocol error from {server}: {reason}")]
    Protocol { server: String, reason: String },
}

impl TransportError {
    /// Maps a socket-level error onto the transport taxonomy.
    pub fn from_io(server: impl fmt::Display, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                Self::ConnectionRefused {
                    server: server.to_string(),
                }
            }
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout {
                server: server.to_string(),
            },
            _ => Self::Unreachable {
                server: server.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Whether the same nameserver is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unreachable { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("NXDOMAIN for {name}")]
    Nxdomain { name: String },

    #[error("SERVFAIL for {name} from {server}")]
    ServerFailure { name: String, server: String },

    #[error("All nameservers failed for {name} after {attempts} attempts")]
    AllNameserversFailed {
        name: String,
        attempts: usize,
        last_error: Option<String>,
    },

    #[error("Invalid query for {name}: {reason}")]
    InvalidQuery { name: String, reason: String },

    #[error("No nameservers configured to resolve {name}")]
    NoNameservers { name: String },
}

impl ResolveError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nxdomain { .. } => "NXDOMAIN",
            Self::ServerFailure { .. } => "SERVFAIL",
            Self::AllNameserversFailed { .. } => "ALL_NAMESERVERS_FAILED",
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::NoNameservers { .. } => "NO_NAMESERVERS",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Nxdomain { name }
            | Self::ServerFailure { name, .. }
            | Self::AllNameserversFailed { name, .. }
            | Self::InvalidQuery { name, .. }
            | Self::NoNameservers { name } => name,
        }
    }

    /// Definitive answers end the walk over nameservers.
    pub fn is_definitive(&self) -> bool {
        matches!(self, Self::Nxdomain { .. } | Self::ServerFailure { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid nameserver '{0}': {1}")]
    InvalidNameserver(String, String),

    #[error("Failed to read {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

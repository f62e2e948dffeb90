//! Shared error type across tracemeter crates.

use thiserror::Error;

/// Stable error codes, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A metric name is already registered.
    DuplicateMetric,
    /// A label name cannot be expressed in the exposition format.
    InvalidLabel,
    /// The metrics registry or encoder failed.
    Registry,
    /// The listener could not bind.
    Bind,
    /// Invalid configuration.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorKind::InvalidLabel => "INVALID_LABEL",
            ErrorKind::Registry => "REGISTRY",
            ErrorKind::Bind => "BIND",
            ErrorKind::Config => "CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TraceMeterError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum TraceMeterError {
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("invalid label: {0}")]
    InvalidLabel(String),
    #[error("registry: {0}")]
    Registry(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl TraceMeterError {
    /// Map the error to its stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TraceMeterError::DuplicateMetric(_) => ErrorKind::DuplicateMetric,
            TraceMeterError::InvalidLabel(_) => ErrorKind::InvalidLabel,
            TraceMeterError::Registry(_) => ErrorKind::Registry,
            TraceMeterError::Bind { .. } => ErrorKind::Bind,
            TraceMeterError::Config(_) => ErrorKind::Config,
            TraceMeterError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            TraceMeterError::Internal(_) => ErrorKind::Internal,
        }
    }
}

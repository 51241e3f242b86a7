//! Error types for probe operations.
//!
//! Every failure a connection attempt can produce is collapsed into one of
//! three classes (connection, authentication, other) so the probe loop can
//! decide "try the next configuration" by inspecting a tag instead of
//! downcasting. Passwords never appear in error messages; the context
//! strings carry host/port at most.

use serde::Serialize;
use thiserror::Error;

/// Classification of a failed connection attempt.
///
/// This is the tag the probe loop inspects: it deliberately collapses the
/// richer [`ProbeError`] variants into the three classes a human reading
/// the report cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or transport-level failure (unreachable, refused, dropped)
    Connection,
    /// Credentials rejected by the remote server
    Authentication,
    /// Anything else, including malformed configuration
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection => write!(f, "connection error"),
            Self::Authentication => write!(f, "authentication error"),
            Self::Other => write!(f, "error"),
        }
    }
}

/// Main error type for redisprobe operations.
///
/// # Security
/// Error messages are sanitized: connection context may name a host and
/// port but never a password.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Transport-level connection failure
    #[error("connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credentials rejected by the remote server
    #[error("authentication rejected: {context}")]
    Authentication {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration or settings problem detected before connecting
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed (settings file reads)
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Unclassified failure
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience type alias for Results with ProbeError
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Collapses this error into the three-way classification the probe
    /// loop and the report use.
    ///
    /// Configuration and I/O problems count as "other": the taxonomy
    /// distinguishes only what the remote side did.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Configuration { .. } | Self::Io { .. } | Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Creates a connection error without an underlying source
    pub fn connection(context: impl Into<String>) -> Self {
        Self::Connection {
            context: context.into(),
            source: None,
        }
    }

    /// Creates a connection error wrapping an underlying failure
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an authentication error without an underlying source
    pub fn authentication(context: impl Into<String>) -> Self {
        Self::Authentication {
            context: context.into(),
            source: None,
        }
    }

    /// Creates an authentication error wrapping an underlying failure
    pub fn authentication_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Authentication {
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates an unclassified error wrapping an underlying failure
    pub fn other<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }
}

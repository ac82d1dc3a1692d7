//! Unified error handling for catalogctl-core
//!
//! Every failure the core can produce falls into one of a handful of classes:
//! bad local input, incomplete configuration, a failure reported by the
//! management service, or an initialization wait that ran out of budget.
//!
//! # Example
//!
//! ```rust
//! use catalogctl_core::{CoreError, RemoteError, RemoteErrorKind};
//!
//! let err: CoreError = RemoteError::new(RemoteErrorKind::NotFound, "no such service").into();
//! assert!(err.is_not_found());
//! assert!(!err.is_timeout());
//! ```

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of failures reported by the management service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Transport failure or an unexpected server response
    Network,
    /// TLS handshake or credential rejection (401/403)
    Auth,
    /// The target service, member or config file does not exist (404)
    NotFound,
    /// The request was rejected by the remote side (400/409/412/422)
    Validation,
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorKind::Network => write!(f, "network error"),
            RemoteErrorKind::Auth => write!(f, "authentication error"),
            RemoteErrorKind::NotFound => write!(f, "not found"),
            RemoteErrorKind::Validation => write!(f, "request rejected"),
        }
    }
}

/// A failure surfaced by a [`ManageClient`](crate::ManageClient) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Validation, message)
    }
}

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing or malformed local input, caught before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Incomplete or unreadable configuration (TLS material, config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the management service
    #[error("Management service error: {0}")]
    Remote(#[from] RemoteError),

    /// The service did not report itself initialized within the wait budget
    #[error("The catalog service is not initialized after {} seconds", .0.as_secs())]
    InitTimeout(Duration),

    /// Service metadata deletion failed after its volumes were enumerated
    #[error("Delete service failed: {source}")]
    DeleteFailed {
        volume_ids: Vec<String>,
        #[source]
        source: RemoteError,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            CoreError::Remote(e) => Some(e.kind),
            CoreError::DeleteFailed { source, .. } => Some(source.kind),
            _ => None,
        }
    }

    /// Returns true if the management service reported a missing resource
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.remote_kind() == Some(RemoteErrorKind::NotFound)
    }

    /// Returns true if this is a TLS or credential failure
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.remote_kind() == Some(RemoteErrorKind::Auth)
    }

    /// Returns true if the initialization wait budget ran out
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::InitTimeout(_))
    }

    /// Volume IDs captured before the failure, if any
    #[must_use]
    pub fn retained_volume_ids(&self) -> Option<&[String]> {
        match self {
            CoreError::DeleteFailed { volume_ids, .. } => Some(volume_ids),
            _ => None,
        }
    }
}

//! Error types for relationship graph operations.
//!
//! Every failure the core reports falls into one of the [`ErrorKind`]
//! categories. The boundary layer inspects the kind to pick a status
//! and shows the message to the caller.

use thiserror::Error;
use tracing::warn;

use super::store::StoreError;

/// Classification of a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed caller input.
    Validation,
    /// A user required by the operation does not exist.
    NotFound,
    /// The edge being created already exists.
    Conflict,
    /// The operation is forbidden by an existing block.
    Permission,
    /// Unexpected store failure.
    Internal,
}

impl ErrorKind {
    /// Status code the boundary layer reports for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Permission => 403,
            Self::Internal => 500,
        }
    }

    /// Converts to string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Permission => "permission",
            Self::Internal => "internal",
        }
    }
}

/// Error type for graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Invalid input provided.
    #[error("{0}")]
    Validation(String),

    /// Referenced user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Edge already exists.
    #[error("{0}")]
    Conflict(String),

    /// Edge creation forbidden by a block.
    #[error("{0}")]
    Permission(String),

    /// Store failure that is not a uniqueness collision.
    #[error("Internal error: {0}")]
    Internal(#[source] StoreError),
}

impl GraphError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Permission(_) => ErrorKind::Permission,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for GraphError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(detail) => Self::Conflict(detail),
            other => {
                warn!(error = %other, "store failure");
                Self::Internal(other)
            }
        }
    }
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

//! Error types for udmf core.

use crate::store::StoreState;
use std::fmt;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller-supplied data could not be persisted (e.g. a record failed to encode).
    #[error("invalid parameters: {message}")]
    InvalidParameters {
        /// Description of the problem.
        message: String,
    },

    /// Persisted data could not be read back (corrupt or version-mismatched),
    /// or a runtime block could not be encoded.
    #[error("unknown error: {message}")]
    Unknown {
        /// Description of the problem.
        message: String,
    },

    /// A composite operation failed in one of its steps.
    #[error("database error: {message}")]
    DbError {
        /// Description of the failed step.
        message: String,
    },

    /// The key-value engine reported a failure.
    #[error("storage error: {0}")]
    Storage(#[from] udmf_storage::StorageError),

    /// The store is not in the `Ready` state.
    #[error("store is not ready: {state}")]
    NotReady {
        /// The state the store was in.
        state: StoreState,
    },
}

impl CoreError {
    /// Creates an invalid parameters error.
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Creates an unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Creates a database error.
    pub fn db_error(message: impl Into<String>) -> Self {
        Self::DbError {
            message: message.into(),
        }
    }

    /// Returns the flat status code of this error.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidParameters { .. } => Status::InvalidParameters,
            Self::Unknown { .. } => Status::Unknown,
            Self::DbError { .. } | Self::Storage(_) => Status::DbError,
            Self::NotReady { .. } => Status::NotReady,
        }
    }
}

/// Flat status code for callers that report results across a process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Success.
    Ok,
    /// A record could not be encoded.
    InvalidParameters,
    /// Persisted data could not be decoded.
    Unknown,
    /// The engine reported a failure.
    DbError,
    /// The store was used outside the `Ready` state.
    NotReady,
}

impl Status {
    /// Maps an operation result to its status code.
    pub fn from_result<T>(result: &CoreResult<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => e.status(),
        }
    }

    /// Returns true for [`Status::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "E_OK",
            Self::InvalidParameters => "E_INVALID_PARAMETERS",
            Self::Unknown => "E_UNKNOWN",
            Self::DbError => "E_DB_ERROR",
            Self::NotReady => "E_NOT_READY",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udmf_storage::StorageError;

    #[test]
    fn status_mapping() {
        assert_eq!(
            CoreError::invalid_parameters("x").status(),
            Status::InvalidParameters
        );
        assert_eq!(CoreError::unknown("x").status(), Status::Unknown);
        assert_eq!(CoreError::db_error("x").status(), Status::DbError);
        assert_eq!(
            CoreError::from(StorageError::Closed).status(),
            Status::DbError
        );
        assert_eq!(
            CoreError::NotReady {
                state: StoreState::Closed
            }
            .status(),
            Status::NotReady
        );
    }

    #[test]
    fn status_from_result() {
        let ok: CoreResult<()> = Ok(());
        assert_eq!(Status::from_result(&ok), Status::Ok);
        assert!(Status::from_result(&ok).is_ok());

        let err: CoreResult<()> = Err(CoreError::unknown("bad runtime"));
        assert_eq!(Status::from_result(&err), Status::Unknown);
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::DbError.to_string(), "E_DB_ERROR");
    }
}

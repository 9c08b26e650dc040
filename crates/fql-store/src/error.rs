//! Store error types and recoverability tiers.

use std::time::Duration;

use thiserror::Error;

use fql_compiler::BindError;
use fql_core::ParseError;

/// Errors surfaced by the data-access façade.
///
/// Every variant carries a stable machine-readable code via
/// [`StoreError::code`]; the code is the API, messages may change.
///
/// All variants except [`StoreError::Unrecoverable`] are recoverable: no
/// data mutation has happened, so the caller may catch the error and let
/// the surrounding transaction commit other work. An unrecoverable error
/// means intended and actual effect have diverged and the transaction
/// must be rolled back.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The filter string was not valid FQL.
    #[error("parse error in filter {fql:?}: {error}")]
    Parse {
        /// The offending FQL source text.
        fql: String,
        /// The underlying parse error.
        error: ParseError,
    },

    /// Binding the filter, select list, or ordering against the schema
    /// failed.
    #[error("{error} (table {table}, filter {fql:?})")]
    Bind {
        /// The table queried.
        table: String,
        /// The FQL source text, when the error came from a filter.
        fql: String,
        /// The underlying bind error.
        error: BindError,
    },

    /// A row addressed by id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A bulk mutation affected fewer rows than addressed. The current
    /// transaction must be rolled back.
    #[error("{0}")]
    Unrecoverable(String),

    /// The driver reported an error.
    #[error("database error: {0}")]
    Driver(#[from] sqlx::Error),

    /// A driver call exceeded the configured statement timeout.
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    pub(crate) fn parse(fql: &str, error: ParseError) -> Self {
        Self::Parse {
            fql: String::from(fql),
            error,
        }
    }

    pub(crate) fn bind(table: &str, fql: &str, error: BindError) -> Self {
        Self::Bind {
            table: String::from(table),
            fql: String::from(fql),
            error,
        }
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Bind { error, .. } => error.code(),
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unrecoverable(_) => "UNRECOVERABLE",
            Self::Driver(_) | Self::Timeout(_) => "DRIVER_ERROR",
        }
    }

    /// Returns false when the surrounding transaction must be rolled back.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Unrecoverable(_))
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let err = StoreError::NotFound(String::from("id 1 was not found"));
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.is_recoverable());

        let err = StoreError::Unrecoverable(String::from("count mismatch"));
        assert_eq!(err.code(), "UNRECOVERABLE");
        assert!(!err.is_recoverable());

        let err = StoreError::bind(
            "t",
            "x == 1",
            BindError::UnboundVariable(String::from("x")),
        );
        assert_eq!(err.code(), "UNBOUND_VARIABLE");
    }
}

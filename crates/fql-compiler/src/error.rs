//! Compiler error types.

use thiserror::Error;

/// Errors raised while binding an FQL expression against a schema.
///
/// Binding never mutates data, so all of these are recoverable: the
/// caller may catch them and keep the surrounding transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The referenced column does not exist on the table in scope.
    #[error("table {table} has no column named {column}")]
    UnknownColumn {
        /// Table searched.
        table: String,
        /// Missing column name.
        column: String,
    },

    /// A dotted path navigated through a column that is not a foreign key
    /// to another table's `id` column.
    #[error("column {table}.{column} is not a foreign key to an id column")]
    NotAForeignKey {
        /// Table owning the column.
        table: String,
        /// Column name.
        column: String,
    },

    /// A dotted path navigated through a column with several foreign-key
    /// edges.
    #[error("column {table}.{column} has multiple foreign keys, navigation is ambiguous")]
    AmbiguousForeignKey {
        /// Table owning the column.
        table: String,
        /// Column name.
        column: String,
    },

    /// A dotted path asked for `id` through a foreign key. The foreign-key
    /// column itself already carries that id.
    #[error("reading id through foreign key {column} is not supported, use the foreign key column instead")]
    ForbiddenIdThroughFk {
        /// The foreign-key column that was navigated.
        column: String,
    },

    /// A variable had no value in the parameter map.
    #[error("no value bound for variable :{0}")]
    UnboundVariable(String),

    /// An operator was applied to operands of the wrong shape.
    #[error("invalid use of {op}: {reason}")]
    OperatorMisuse {
        /// The operator, as written in FQL.
        op: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// An ORDER BY specifier did not match `path [asc|desc]`.
    #[error("not a valid order specifier: {0}")]
    InvalidOrder(String),
}

impl BindError {
    /// Returns the stable machine-readable error code.
    ///
    /// The code is the API; messages may change between releases.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            Self::NotAForeignKey { .. } => "NOT_A_FOREIGN_KEY",
            Self::AmbiguousForeignKey { .. } => "AMBIGUOUS_FOREIGN_KEY",
            Self::ForbiddenIdThroughFk { .. } => "FORBIDDEN_ID_THROUGH_FK",
            Self::UnboundVariable(_) => "UNBOUND_VARIABLE",
            Self::OperatorMisuse { .. } => "OPERATOR_MISUSE",
            Self::InvalidOrder(_) => "PARSE_ERROR",
        }
    }
}

/// Errors raised while configuring the schema catalog.
///
/// These indicate misconfiguration and surface at startup, never during
/// query processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A registered table lacks the mandatory integer `id` primary key.
    #[error("table {0} must have an integer primary-key column named id")]
    MissingId(String),

    /// A table name was registered twice.
    #[error("table {0} is already registered")]
    DuplicateTable(String),

    /// A state-machine table lacks a usable `state` column.
    #[error("table {0} must have a non-nullable text column named state")]
    MissingState(String),

    /// A column had the wrong type for its role.
    #[error("column {table}.{column} must have type {expected}")]
    WrongColumnType {
        /// Table owning the column.
        table: String,
        /// Column name.
        column: String,
        /// Expected type description.
        expected: &'static str,
    },
}

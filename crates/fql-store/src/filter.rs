//! Filter and read-query inputs accepted by the managers.

use fql_compiler::{Params, SqlExpr};

/// A row filter.
///
/// Most call sites pass FQL text (optionally with a variable map); code
/// that already holds a bound predicate can pass it directly.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    /// No predicate: every row matches.
    #[default]
    All,
    /// An FQL source string.
    Fql(String),
    /// An FQL source string plus its variable bindings.
    Bound {
        /// FQL source text.
        fql: String,
        /// Values for the `:name` variables in `fql`.
        params: Params,
    },
    /// A pre-bound predicate, bypassing parse and bind.
    Predicate(SqlExpr),
}

impl Filter {
    /// Creates a filter from FQL source text.
    #[must_use]
    pub fn fql(source: impl Into<String>) -> Self {
        Self::Fql(source.into())
    }

    /// Creates a filter from FQL source text and its variable bindings.
    #[must_use]
    pub fn with_params(source: impl Into<String>, params: Params) -> Self {
        Self::Bound {
            fql: source.into(),
            params,
        }
    }
}

impl From<&str> for Filter {
    fn from(source: &str) -> Self {
        Self::Fql(String::from(source))
    }
}

impl From<String> for Filter {
    fn from(source: String) -> Self {
        Self::Fql(source)
    }
}

impl From<(&str, Params)> for Filter {
    fn from((source, params): (&str, Params)) -> Self {
        Self::with_params(source, params)
    }
}

impl From<(String, Params)> for Filter {
    fn from((source, params): (String, Params)) -> Self {
        Self::with_params(source, params)
    }
}

impl From<SqlExpr> for Filter {
    fn from(predicate: SqlExpr) -> Self {
        Self::Predicate(predicate)
    }
}

/// The inputs of a read: filter, select list, ordering, and pagination.
///
/// `fields` defaults to every column of the table, in schema order.
#[derive(Debug, Clone, Default)]
pub struct ReadQuery {
    /// Row filter.
    pub filter: Filter,
    /// Fields to select; dotted foreign-key paths are allowed.
    pub fields: Option<Vec<String>>,
    /// Order specifiers (`path [asc|desc]`), applied in sequence.
    pub order: Vec<String>,
    /// Maximum number of rows, applied when positive.
    pub limit: Option<i64>,
    /// Number of rows to skip, applied when positive.
    pub offset: Option<i64>,
}

impl ReadQuery {
    /// Creates a query matching all rows with all fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the fields to select.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Appends an order specifier.
    #[must_use]
    pub fn order(mut self, spec: impl Into<String>) -> Self {
        self.order.push(spec.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

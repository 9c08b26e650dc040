//! The binder: walks a parsed FQL expression against a schema catalog,
//! resolving identifiers through the join context, substituting variables
//! from the parameter map, and dispatching operators.

use std::sync::Arc;

use fql_core::Expr;

use crate::error::BindError;
use crate::join::JoinTree;
use crate::ops;
use crate::schema::{Catalog, TableSchema};
use crate::sql::{ColumnRef, SqlExpr};
use crate::value::{Params, Value};

/// Binds FQL expressions against one root table.
///
/// A binder accumulates the join context shared by every path it
/// resolves; predicate, select list, and ordering of a single query must
/// all go through the same binder so they agree on aliases.
pub struct Binder<'a> {
    catalog: &'a Catalog,
    params: &'a Params,
    joins: JoinTree,
}

impl<'a> Binder<'a> {
    /// Creates a binder rooted at `table`.
    #[must_use]
    pub fn new(catalog: &'a Catalog, table: Arc<TableSchema>, params: &'a Params) -> Self {
        Self {
            catalog,
            params,
            joins: JoinTree::new(table),
        }
    }

    /// Binds an expression to a relational predicate tree.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] for unknown columns, invalid foreign-key
    /// navigation, unbound variables, or operator misuse.
    pub fn bind(&mut self, expr: &Expr) -> Result<SqlExpr, BindError> {
        match expr {
            Expr::Literal(literal) => Ok(SqlExpr::Value(Value::from(literal))),
            Expr::Identifier(path) => Ok(SqlExpr::Column(self.joins.resolve(self.catalog, path)?)),
            Expr::Variable(name) => self
                .params
                .get(name)
                .cloned()
                .map(SqlExpr::Value)
                .ok_or_else(|| BindError::UnboundVariable(name.clone())),
            Expr::List(items) => {
                let bound = items
                    .iter()
                    .map(|item| self.bind(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SqlExpr::List(bound))
            }
            Expr::Unary { op, operand } => {
                let operand = self.bind(operand)?;
                ops::apply_unary(*op, operand)
            }
            Expr::Binary { op, left, right } => {
                let left = self.bind(left)?;
                let right = self.bind(right)?;
                ops::apply_binary(*op, left, right)
            }
        }
    }

    /// Resolves a dotted column path (as used in select lists and order
    /// specifiers) through the shared join context.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the path does not resolve to a column.
    pub fn column(&mut self, path: &str) -> Result<ColumnRef, BindError> {
        let segments: Vec<String> = path.split('.').map(String::from).collect();
        self.joins.resolve(self.catalog, &segments)
    }

    /// Returns the join context accumulated so far.
    #[must_use]
    pub fn joins(&self) -> &JoinTree {
        &self.joins
    }

    /// Consumes the binder, yielding the frozen join context.
    #[must_use]
    pub fn into_joins(self) -> JoinTree {
        self.joins
    }
}

//! Query assembly.
//!
//! Combines a bound predicate, the join context, a select list, and
//! optional ordering and pagination into statements ready for the driver:
//! SQL text plus an ordered list of out-of-band bind parameters.
//!
//! Mutating statements never embed the join tree directly; they use the
//! `id IN (SELECT id FROM <join-tree> WHERE …)` pattern so the joins stay
//! inside a read-only subselect.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use fql_core::Expr;

use crate::binder::Binder;
use crate::error::BindError;
use crate::schema::{Catalog, ColumnType, TableSchema};
use crate::sql::SqlExpr;
use crate::value::{Params, Value};

/// A statement ready for the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Bind values in placeholder order.
    pub params: Vec<Value>,
}

/// One entry of a SELECT list, kept for schema-typed row decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectField {
    /// The field as requested (possibly a dotted foreign-key path).
    pub name: String,
    /// The resolved column type.
    pub ty: ColumnType,
    /// The resolved nullability. Columns reached through an outer join are
    /// nullable regardless of their declaration.
    pub nullable: bool,
}

/// An assembled SELECT statement with its decoding metadata.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    /// The statement.
    pub query: Query,
    /// The select list, in output-column order.
    pub fields: Vec<SelectField>,
}

/// A parsed ORDER BY specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    /// Dotted column path.
    pub path: String,
    /// True for `desc`; ascending is the default.
    pub descending: bool,
}

fn order_regex() -> &'static Regex {
    static ORDER_REGEX: OnceLock<Regex> = OnceLock::new();
    ORDER_REGEX.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(?:\s+(asc|desc))?$")
            .expect("order regex is valid")
    })
}

/// Parses an order specifier of the form `path` or `path asc|desc`.
///
/// # Errors
///
/// Returns [`BindError::InvalidOrder`] if the specifier does not match.
pub fn parse_order(spec: &str) -> Result<OrderSpec, BindError> {
    let captures = order_regex()
        .captures(spec)
        .ok_or_else(|| BindError::InvalidOrder(String::from(spec)))?;
    Ok(OrderSpec {
        path: String::from(&captures[1]),
        descending: captures.get(2).is_some_and(|m| m.as_str() == "desc"),
    })
}

/// Assembles driver statements for one table, sharing a single binder so
/// predicate, select list, and ordering agree on join aliases.
pub struct QueryBuilder<'a> {
    binder: Binder<'a>,
    table: Arc<TableSchema>,
}

impl<'a> QueryBuilder<'a> {
    /// Creates a builder rooted at `table`.
    #[must_use]
    pub fn new(catalog: &'a Catalog, table: Arc<TableSchema>, params: &'a Params) -> Self {
        Self {
            binder: Binder::new(catalog, Arc::clone(&table), params),
            table,
        }
    }

    /// Binds a parsed filter expression through this builder's binder.
    ///
    /// # Errors
    ///
    /// Propagates any [`BindError`] from binding.
    pub fn bind(&mut self, expr: &Expr) -> Result<SqlExpr, BindError> {
        self.binder.bind(expr)
    }

    /// Assembles a SELECT statement.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if a field or order path does not resolve.
    pub fn select(
        mut self,
        predicate: Option<SqlExpr>,
        fields: &[String],
        order: &[String],
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<SelectQuery, BindError> {
        let mut select_fields = Vec::with_capacity(fields.len());
        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            let column = self.binder.column(field)?;
            select_fields.push(SelectField {
                name: field.clone(),
                ty: column.ty,
                nullable: column.nullable || column.table != self.table.name(),
            });
            columns.push(column);
        }

        let mut orders = Vec::with_capacity(order.len());
        for spec in order {
            let spec = parse_order(spec)?;
            let column = self.binder.column(&spec.path)?;
            orders.push((column, spec.descending));
        }

        let mut sql = String::from("SELECT ");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{}.{}", column.table, column.column));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.binder.joins().from_clause());

        let mut params = Vec::new();
        if let Some(predicate) = &predicate {
            sql.push_str(" WHERE ");
            predicate.render(&mut sql, &mut params);
        }

        if !orders.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, (column, descending)) in orders.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&format!(
                    "{}.{} {}",
                    column.table,
                    column.column,
                    if *descending { "DESC" } else { "ASC" }
                ));
            }
        }

        append_limit_offset(&mut sql, limit, offset);

        Ok(SelectQuery {
            query: Query { sql, params },
            fields: select_fields,
        })
    }

    /// Assembles a COUNT statement over the root table's ids.
    #[must_use]
    pub fn count(self, predicate: Option<SqlExpr>) -> Query {
        let table = self.table.name();
        match predicate {
            None => Query {
                sql: format!("SELECT COUNT({table}.id) FROM {table}"),
                params: Vec::new(),
            },
            Some(predicate) => {
                let mut params = Vec::new();
                let mut pred_sql = String::new();
                predicate.render(&mut pred_sql, &mut params);
                Query {
                    sql: format!(
                        "SELECT COUNT({table}.id) FROM {table} WHERE {table}.id IN \
                         (SELECT {table}.id FROM {} WHERE {pred_sql})",
                        self.binder.joins().from_clause()
                    ),
                    params,
                }
            }
        }
    }

    /// Assembles an UPDATE statement using the id-subselect pattern.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnknownColumn`] for an assignment to a column
    /// the table does not have.
    pub fn update(self, predicate: Option<SqlExpr>, assignments: &[(String, Value)]) -> Result<Query, BindError> {
        validate_assignments(&self.table, assignments)?;
        let mut params = Vec::with_capacity(assignments.len());
        let mut sql = format!("UPDATE {} SET ", self.table.name());
        for (i, (column, value)) in assignments.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{column} = ?"));
            params.push(value.clone());
        }
        sql.push(' ');
        sql.push_str(&self.mutation_filter(predicate, &mut params));
        Ok(Query { sql, params })
    }

    /// Assembles a DELETE statement using the id-subselect pattern.
    #[must_use]
    pub fn delete(self, predicate: Option<SqlExpr>) -> Query {
        let mut params = Vec::new();
        let filter = self.mutation_filter(predicate, &mut params);
        Query {
            sql: format!("DELETE FROM {} {filter}", self.table.name()),
            params,
        }
    }

    /// Assembles an INSERT statement.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnknownColumn`] for a value keyed by a column
    /// the table does not have.
    pub fn insert(table: &TableSchema, assignments: &[(String, Value)]) -> Result<Query, BindError> {
        validate_assignments(table, assignments)?;
        if assignments.is_empty() {
            return Ok(Query {
                sql: format!("INSERT INTO {} DEFAULT VALUES", table.name()),
                params: Vec::new(),
            });
        }
        let columns: Vec<&str> = assignments.iter().map(|(name, _)| name.as_str()).collect();
        let placeholders: Vec<&str> = assignments.iter().map(|_| "?").collect();
        Ok(Query {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table.name(),
                columns.join(", "),
                placeholders.join(", ")
            ),
            params: assignments.iter().map(|(_, value)| value.clone()).collect(),
        })
    }

    /// Renders `WHERE id IN (SELECT id FROM <join-tree> WHERE …)`, with a
    /// literal `TRUE` standing in for an absent predicate.
    fn mutation_filter(&self, predicate: Option<SqlExpr>, params: &mut Vec<Value>) -> String {
        let table = self.table.name();
        let mut pred_sql = String::new();
        match predicate {
            Some(predicate) => predicate.render(&mut pred_sql, params),
            None => pred_sql.push_str("TRUE"),
        }
        format!(
            "WHERE {table}.id IN (SELECT {table}.id FROM {} WHERE {pred_sql})",
            self.binder.joins().from_clause()
        )
    }
}

fn validate_assignments(table: &TableSchema, assignments: &[(String, Value)]) -> Result<(), BindError> {
    for (column, _) in assignments {
        if table.get(column).is_none() {
            return Err(BindError::UnknownColumn {
                table: String::from(table.name()),
                column: column.clone(),
            });
        }
    }
    Ok(())
}

fn append_limit_offset(sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
    let limit = limit.filter(|n| *n > 0);
    let offset = offset.filter(|n| *n > 0);
    match (limit, offset) {
        (Some(l), Some(o)) => sql.push_str(&format!(" LIMIT {l} OFFSET {o}")),
        (Some(l), None) => sql.push_str(&format!(" LIMIT {l}")),
        // OFFSET needs a LIMIT in SQLite; -1 means unlimited
        (None, Some(o)) => sql.push_str(&format!(" LIMIT -1 OFFSET {o}")),
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_order_specifiers() {
        assert_eq!(
            parse_order("key").unwrap(),
            OrderSpec {
                path: String::from("key"),
                descending: false
            }
        );
        assert_eq!(
            parse_order("key asc").unwrap(),
            OrderSpec {
                path: String::from("key"),
                descending: false
            }
        );
        assert_eq!(
            parse_order("table2.key   desc").unwrap(),
            OrderSpec {
                path: String::from("table2.key"),
                descending: true
            }
        );
    }

    #[test]
    fn rejects_malformed_order_specifiers() {
        for spec in ["", "1key", "key DESC", "key; DROP TABLE x", "key desc extra", "a..b"] {
            let err = parse_order(spec).unwrap_err();
            assert_eq!(err.code(), "PARSE_ERROR", "specifier {spec:?}");
        }
    }

    #[test]
    fn limit_offset_rendering() {
        let mut sql = String::new();
        append_limit_offset(&mut sql, Some(2), Some(1));
        assert_eq!(sql, " LIMIT 2 OFFSET 1");

        let mut sql = String::new();
        append_limit_offset(&mut sql, None, Some(3));
        assert_eq!(sql, " LIMIT -1 OFFSET 3");

        let mut sql = String::new();
        append_limit_offset(&mut sql, Some(0), Some(0));
        assert_eq!(sql, "");
    }
}

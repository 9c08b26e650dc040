//! Bound relational predicate trees.
//!
//! A [`SqlExpr`] is the output of binding: identifiers have become
//! alias-qualified columns, variables and literals have become bind
//! values, and operators have been dispatched to their relational
//! constructors. Rendering produces SQL text plus an ordered list of
//! out-of-band bind parameters.

use crate::schema::{ColumnSchema, ColumnType};
use crate::value::Value;

/// An alias-qualified reference to a bound column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Table alias (the root table's own name, or a join alias).
    pub table: String,
    /// Column name.
    pub column: String,
    /// Declared column type.
    pub ty: ColumnType,
    /// Declared nullability.
    pub nullable: bool,
}

impl ColumnRef {
    /// Creates a reference to `column` under the given table alias.
    #[must_use]
    pub fn new(table: impl Into<String>, column: &ColumnSchema) -> Self {
        Self {
            table: table.into(),
            column: column.name.clone(),
            ty: column.ty,
            nullable: column.nullable,
        }
    }
}

/// Relational binary operators after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBinaryOp {
    /// Logical OR.
    Or,
    /// Logical AND.
    And,
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (the driver's native division)
    Div,
    /// `%`
    Mod,
    /// `||` string concatenation.
    Concat,
    /// `LIKE` (case sensitivity per the driver).
    Like,
    /// Case-insensitive LIKE, rendered via `LOWER()`.
    ILike,
    /// Membership in a list.
    In,
}

impl SqlBinaryOp {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
            Self::Like => "LIKE",
            Self::ILike => "LIKE",
            Self::In => "IN",
        }
    }
}

/// Relational unary operators after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlUnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical negation.
    Not,
}

/// A bound relational predicate or scalar expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// A bound column.
    Column(ColumnRef),

    /// A bind value (literal or substituted variable).
    Value(Value),

    /// A sequence of bound expressions; only legal as the right-hand side
    /// of `In`.
    List(Vec<SqlExpr>),

    /// A unary operation.
    Unary {
        /// Operator.
        op: SqlUnaryOp,
        /// Operand.
        operand: Box<SqlExpr>,
    },

    /// A binary operation.
    Binary {
        /// Operator.
        op: SqlBinaryOp,
        /// Left operand.
        left: Box<SqlExpr>,
        /// Right operand.
        right: Box<SqlExpr>,
    },

    /// SQL `IS NULL` / `IS NOT NULL`, produced for equality against NULL.
    IsNull {
        /// The tested operand.
        operand: Box<SqlExpr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },
}

impl SqlExpr {
    /// Returns the scalar type of the expression where one is known.
    #[must_use]
    pub fn scalar_type(&self) -> Option<ColumnType> {
        match self {
            Self::Column(c) => Some(c.ty),
            Self::Value(v) => v.scalar_type(),
            Self::List(_) => None,
            Self::Unary { op, operand } => match op {
                SqlUnaryOp::Neg => operand.scalar_type(),
                SqlUnaryOp::Not => Some(ColumnType::Boolean),
            },
            Self::Binary { op, left, right } => match op {
                SqlBinaryOp::Add
                | SqlBinaryOp::Sub
                | SqlBinaryOp::Mul
                | SqlBinaryOp::Div
                | SqlBinaryOp::Mod => left.scalar_type().or_else(|| right.scalar_type()),
                SqlBinaryOp::Concat => Some(ColumnType::Text),
                _ => Some(ColumnType::Boolean),
            },
            Self::IsNull { .. } => Some(ColumnType::Boolean),
        }
    }

    /// Returns true if this node is a bound column.
    #[must_use]
    pub const fn is_column(&self) -> bool {
        matches!(self, Self::Column(_))
    }

    /// Builds the predicate `table.id IN (ids…)` against the root table.
    #[must_use]
    pub fn id_in(table: &str, ids: &[i64]) -> Self {
        Self::Binary {
            op: SqlBinaryOp::In,
            left: Box::new(Self::Column(ColumnRef {
                table: String::from(table),
                column: String::from("id"),
                ty: ColumnType::Integer,
                nullable: false,
            })),
            right: Box::new(Self::List(ids.iter().copied().map(|id| Self::Value(Value::Int(id))).collect())),
        }
    }

    /// Builds the predicate `left AND right`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::Binary {
            op: SqlBinaryOp::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Renders the expression, appending SQL text to `sql` and bind values
    /// to `params` in placeholder order.
    ///
    /// Nested expressions are parenthesized unconditionally, so operator
    /// precedence never depends on the reader.
    pub fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Self::Column(c) => {
                sql.push_str(&c.table);
                sql.push('.');
                sql.push_str(&c.column);
            }
            Self::Value(v) => {
                sql.push('?');
                params.push(v.clone());
            }
            Self::List(items) => {
                sql.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    item.render(sql, params);
                }
                sql.push(')');
            }
            Self::Unary { op, operand } => {
                match op {
                    SqlUnaryOp::Neg => sql.push_str("(-"),
                    SqlUnaryOp::Not => sql.push_str("(NOT "),
                }
                operand.render(sql, params);
                sql.push(')');
            }
            Self::Binary { op, left, right } => {
                sql.push('(');
                if *op == SqlBinaryOp::ILike {
                    sql.push_str("LOWER(");
                    left.render(sql, params);
                    sql.push_str(") LIKE LOWER(");
                    right.render(sql, params);
                    sql.push(')');
                } else {
                    left.render(sql, params);
                    sql.push(' ');
                    sql.push_str(op.as_str());
                    sql.push(' ');
                    right.render(sql, params);
                }
                sql.push(')');
            }
            Self::IsNull { operand, negated } => {
                sql.push('(');
                operand.render(sql, params);
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
                sql.push(')');
            }
        }
    }

    /// Renders to a standalone `(sql, params)` pair.
    #[must_use]
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.render(&mut sql, &mut params);
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(table: &str, name: &str, ty: ColumnType) -> SqlExpr {
        SqlExpr::Column(ColumnRef {
            table: String::from(table),
            column: String::from(name),
            ty,
            nullable: true,
        })
    }

    #[test]
    fn renders_comparison_with_bind_param() {
        let expr = SqlExpr::Binary {
            op: SqlBinaryOp::Eq,
            left: Box::new(column("t", "key", ColumnType::Text)),
            right: Box::new(SqlExpr::Value(Value::from("a"))),
        };
        let (sql, params) = expr.to_sql();
        assert_eq!(sql, "(t.key = ?)");
        assert_eq!(params, vec![Value::from("a")]);
    }

    #[test]
    fn renders_in_list() {
        let expr = SqlExpr::id_in("t", &[7, 9]);
        let (sql, params) = expr.to_sql();
        assert_eq!(sql, "(t.id IN (?, ?))");
        assert_eq!(params, vec![Value::Int(7), Value::Int(9)]);
    }

    #[test]
    fn renders_ilike_via_lower() {
        let expr = SqlExpr::Binary {
            op: SqlBinaryOp::ILike,
            left: Box::new(column("t", "name", ColumnType::Text)),
            right: Box::new(SqlExpr::Value(Value::from("%smith%"))),
        };
        let (sql, _) = expr.to_sql();
        assert_eq!(sql, "(LOWER(t.name) LIKE LOWER(?))");
    }

    #[test]
    fn renders_is_null() {
        let expr = SqlExpr::IsNull {
            operand: Box::new(column("t", "account", ColumnType::Text)),
            negated: true,
        };
        let (sql, params) = expr.to_sql();
        assert_eq!(sql, "(t.account IS NOT NULL)");
        assert!(params.is_empty());
    }

    #[test]
    fn param_order_follows_placeholders() {
        let expr = SqlExpr::Binary {
            op: SqlBinaryOp::Concat,
            left: Box::new(SqlExpr::Value(Value::from("%"))),
            right: Box::new(SqlExpr::Value(Value::from("x"))),
        };
        let (sql, params) = expr.to_sql();
        assert_eq!(sql, "(? || ?)");
        assert_eq!(params, vec![Value::from("%"), Value::from("x")]);
    }

    #[test]
    fn concat_is_text_typed() {
        let expr = SqlExpr::Binary {
            op: SqlBinaryOp::Concat,
            left: Box::new(SqlExpr::Value(Value::from("%"))),
            right: Box::new(column("t", "value", ColumnType::Text)),
        };
        assert_eq!(expr.scalar_type(), Some(ColumnType::Text));
    }
}

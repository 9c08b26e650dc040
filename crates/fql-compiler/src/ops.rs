//! Operator dispatch: mapping FQL operators onto relational-predicate
//! constructors, with operand-shape preconditions enforced.

use fql_core::{BinaryOp, UnaryOp};

use crate::error::BindError;
use crate::schema::ColumnType;
use crate::sql::{SqlBinaryOp, SqlExpr, SqlUnaryOp};

/// Applies a binary FQL operator to two bound operands.
///
/// # Errors
///
/// Returns [`BindError::OperatorMisuse`] when the operand shapes do not
/// fit the operator: `in` needs a column on the left and a list on the
/// right, `like`/`ilike` need a column on the left, and a list operand is
/// illegal anywhere else.
pub fn apply_binary(op: BinaryOp, left: SqlExpr, right: SqlExpr) -> Result<SqlExpr, BindError> {
    if matches!(left, SqlExpr::List(_)) || (op != BinaryOp::In && matches!(right, SqlExpr::List(_))) {
        return Err(BindError::OperatorMisuse {
            op: op.as_str(),
            reason: String::from("a list is only allowed as the right operand of in"),
        });
    }

    let sql_op = match op {
        BinaryOp::Or => SqlBinaryOp::Or,
        BinaryOp::And => SqlBinaryOp::And,

        BinaryOp::Eq | BinaryOp::NotEq => {
            // NULL-aware equality: comparing against the NULL value becomes
            // an IS NULL test, as SQL `= NULL` would match nothing.
            let negated = op == BinaryOp::NotEq;
            if matches!(right, SqlExpr::Value(ref v) if v.is_null()) {
                return Ok(SqlExpr::IsNull {
                    operand: Box::new(left),
                    negated,
                });
            }
            if matches!(left, SqlExpr::Value(ref v) if v.is_null()) {
                return Ok(SqlExpr::IsNull {
                    operand: Box::new(right),
                    negated,
                });
            }
            if negated {
                SqlBinaryOp::NotEq
            } else {
                SqlBinaryOp::Eq
            }
        }

        BinaryOp::In => {
            if !left.is_column() {
                return Err(BindError::OperatorMisuse {
                    op: "in",
                    reason: String::from("left operand must be a bound column"),
                });
            }
            if !matches!(right, SqlExpr::List(_)) {
                return Err(BindError::OperatorMisuse {
                    op: "in",
                    reason: String::from("right operand must be a list"),
                });
            }
            SqlBinaryOp::In
        }

        BinaryOp::Like | BinaryOp::Ilike => {
            if !left.is_column() {
                return Err(BindError::OperatorMisuse {
                    op: op.as_str(),
                    reason: String::from("left operand must be a bound column"),
                });
            }
            if op == BinaryOp::Like {
                SqlBinaryOp::Like
            } else {
                SqlBinaryOp::ILike
            }
        }

        BinaryOp::Lt => SqlBinaryOp::Lt,
        BinaryOp::LtEq => SqlBinaryOp::LtEq,
        BinaryOp::Gt => SqlBinaryOp::Gt,
        BinaryOp::GtEq => SqlBinaryOp::GtEq,

        // `+` on text means concatenation; the driver's `+` would coerce
        // the operands to numbers instead.
        BinaryOp::Add => {
            if is_text(&left) || is_text(&right) {
                SqlBinaryOp::Concat
            } else {
                SqlBinaryOp::Add
            }
        }
        BinaryOp::Sub => SqlBinaryOp::Sub,
        BinaryOp::Mul => SqlBinaryOp::Mul,
        BinaryOp::Div => SqlBinaryOp::Div,
        BinaryOp::Mod => SqlBinaryOp::Mod,
    };

    Ok(SqlExpr::Binary {
        op: sql_op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Applies a unary FQL operator to a bound operand.
///
/// Unary `+` is the identity; `-` negates; `not` is logical negation.
///
/// # Errors
///
/// Returns [`BindError::OperatorMisuse`] for a list operand.
pub fn apply_unary(op: UnaryOp, operand: SqlExpr) -> Result<SqlExpr, BindError> {
    if matches!(operand, SqlExpr::List(_)) {
        return Err(BindError::OperatorMisuse {
            op: op.as_str(),
            reason: String::from("a list is only allowed as the right operand of in"),
        });
    }
    Ok(match op {
        UnaryOp::Plus => operand,
        UnaryOp::Neg => SqlExpr::Unary {
            op: SqlUnaryOp::Neg,
            operand: Box::new(operand),
        },
        UnaryOp::Not => SqlExpr::Unary {
            op: SqlUnaryOp::Not,
            operand: Box::new(operand),
        },
    })
}

fn is_text(expr: &SqlExpr) -> bool {
    expr.scalar_type() == Some(ColumnType::Text)
}

//! Canonical printer for FQL expressions.
//!
//! Printing an expression and reparsing the output yields a structurally
//! equal tree. The canonical form uses double-quoted strings, dots without
//! surrounding whitespace, and the minimal parentheses required by operator
//! precedence.

use std::fmt;

use super::expression::{Expr, Literal, UnaryOp, UNARY_PRECEDENCE};

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::Int(i) => write!(f, "{i}"),
            // Debug formatting keeps a trailing `.0` on whole floats, so the
            // output still lexes as a float.
            Self::Float(v) => write!(f, "{v:?}"),
            Self::String(s) => write_quoted(f, s),
            Self::Null => f.write_str("null"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\0' => f.write_str("\\0")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Writes `expr`, parenthesized when its outermost operator binds looser
/// than `min_precedence`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min_precedence: u8) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Identifier(path) => f.write_str(&path.join(".")),
            Self::Variable(name) => write!(f, ":{name}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Unary { op, operand } => {
                match op {
                    UnaryOp::Not => f.write_str("not ")?,
                    op => f.write_str(op.as_str())?,
                }
                write_operand(f, operand, UNARY_PRECEDENCE)
            }
            Self::Binary { op, left, right } => {
                // Left-associative: equal precedence on the right needs
                // parentheses to survive a round-trip, on the left it does not.
                write_operand(f, left, op.precedence())?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, right, op.precedence() + 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::expression::{BinaryOp, Expr, Literal};

    fn int(i: i64) -> Expr {
        Expr::Literal(Literal::Int(i))
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn renders_minimal_parens() {
        let e = binary(BinaryOp::Add, int(1), binary(BinaryOp::Mul, int(2), int(3)));
        assert_eq!(e.to_string(), "1 + 2 * 3");

        let e = binary(BinaryOp::Mul, binary(BinaryOp::Add, int(1), int(2)), int(3));
        assert_eq!(e.to_string(), "(1 + 2) * 3");
    }

    #[test]
    fn renders_right_nested_same_precedence() {
        let e = binary(BinaryOp::Sub, int(1), binary(BinaryOp::Sub, int(2), int(3)));
        assert_eq!(e.to_string(), "1 - (2 - 3)");
    }

    #[test]
    fn renders_floats_with_fraction() {
        assert_eq!(Expr::Literal(Literal::Float(5.0)).to_string(), "5.0");
        assert_eq!(Expr::Literal(Literal::Float(5.2)).to_string(), "5.2");
    }

    #[test]
    fn renders_strings_double_quoted() {
        let e = Expr::Literal(Literal::String(String::from("it's a \"test\"\n")));
        assert_eq!(e.to_string(), "\"it's a \\\"test\\\"\\n\"");
    }

    #[test]
    fn renders_identifier_paths_without_spaces() {
        let e = Expr::Identifier(vec![String::from("a"), String::from("b")]);
        assert_eq!(e.to_string(), "a.b");
    }
}

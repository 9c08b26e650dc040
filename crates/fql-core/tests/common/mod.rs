#![allow(dead_code)]

use fql_core::{parse, BinaryOp, Expr, Literal, UnaryOp};

pub fn parse_ok(input: &str) -> Expr {
    parse(input).unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"))
}

/// Parses, prints canonically, reparses, and checks structural equality.
pub fn round_trip(input: &str) {
    let first = parse_ok(input);
    let printed = first.to_string();
    let second = parse_ok(&printed);
    assert_eq!(first, second, "round trip changed {input:?} (printed as {printed:?})");
}

pub fn int(i: i64) -> Expr {
    Expr::Literal(Literal::Int(i))
}

pub fn string(s: &str) -> Expr {
    Expr::Literal(Literal::String(String::from(s)))
}

pub fn ident(segments: &[&str]) -> Expr {
    Expr::Identifier(segments.iter().map(|s| String::from(*s)).collect())
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

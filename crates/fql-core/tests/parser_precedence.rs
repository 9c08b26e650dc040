//! Tests for operator precedence and associativity.

mod common;
use common::*;

use fql_core::{BinaryOp, UnaryOp};

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
        parse_ok("1 + 2 * 3"),
        binary(BinaryOp::Add, int(1), binary(BinaryOp::Mul, int(2), int(3)))
    );
    round_trip("1 + 2 * 3");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(
        parse_ok("(1 + 2) * 3"),
        binary(BinaryOp::Mul, binary(BinaryOp::Add, int(1), int(2)), int(3))
    );
    round_trip("(1 + 2) * 3");
}

#[test]
fn addition_is_left_associative() {
    assert_eq!(
        parse_ok("'%' + value + '%'"),
        binary(
            BinaryOp::Add,
            binary(BinaryOp::Add, string("%"), ident(&["value"])),
            string("%"),
        )
    );
    round_trip("'%' + value + '%'");
}

#[test]
fn comparison_binds_tighter_than_logic() {
    assert_eq!(
        parse_ok("a == 1 and b == 2"),
        binary(
            BinaryOp::And,
            binary(BinaryOp::Eq, ident(&["a"]), int(1)),
            binary(BinaryOp::Eq, ident(&["b"]), int(2)),
        )
    );
    round_trip("a == 1 and b == 2");
}

#[test]
fn and_binds_tighter_than_or() {
    assert_eq!(
        parse_ok("a or b and c"),
        binary(
            BinaryOp::Or,
            ident(&["a"]),
            binary(BinaryOp::And, ident(&["b"]), ident(&["c"])),
        )
    );
    round_trip("a or b and c");
}

#[test]
fn arithmetic_binds_tighter_than_comparison() {
    assert_eq!(
        parse_ok("credit + 10 > :min_value"),
        binary(
            BinaryOp::Gt,
            binary(BinaryOp::Add, ident(&["credit"]), int(10)),
            fql_core::Expr::Variable(String::from("min_value")),
        )
    );
    round_trip("credit + 10 > :min_value");
}

#[test]
fn unary_binds_tighter_than_binary() {
    assert_eq!(
        parse_ok("not a and b"),
        binary(
            BinaryOp::And,
            unary(UnaryOp::Not, ident(&["a"])),
            ident(&["b"]),
        )
    );
    assert_eq!(
        parse_ok("-1 * 2"),
        binary(BinaryOp::Mul, unary(UnaryOp::Neg, int(1)), int(2))
    );
    round_trip("not a and b");
    round_trip("-1 * 2");
}

#[test]
fn logic_chain_is_left_associative() {
    assert_eq!(
        parse_ok("a or b or c"),
        binary(
            BinaryOp::Or,
            binary(BinaryOp::Or, ident(&["a"]), ident(&["b"])),
            ident(&["c"]),
        )
    );
}

#[test]
fn realistic_filter_shape() {
    // name like "%Smith%" and account != null and status in ["married", "single"]
    let expr = parse_ok(r#"name like "%Smith%" and account != null and status in ["married", "single"]"#);
    let printed = expr.to_string();
    assert_eq!(parse_ok(&printed), expr);
    // leftmost conjunct groups first
    assert!(matches!(
        expr,
        fql_core::Expr::Binary { op: BinaryOp::And, .. }
    ));
}

#[test]
fn deeply_nested_chain_parses_quickly() {
    // The packrat memo keeps this linear; mostly a smoke test that nothing
    // goes quadratic or blows the stack at realistic depths.
    let clause = "(id == 2)";
    let joined = vec![clause; 100].join(" and ");
    let expr = parse_ok(&joined);
    assert!(matches!(
        expr,
        fql_core::Expr::Binary { op: BinaryOp::And, .. }
    ));
}

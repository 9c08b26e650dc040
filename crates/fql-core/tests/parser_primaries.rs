//! Tests for primary expressions: literals, identifiers, variables,
//! and lists.

mod common;
use common::*;

use fql_core::{Expr, Literal};

#[test]
fn identifier() {
    assert_eq!(parse_ok("test"), ident(&["test"]));
    round_trip("test");
}

#[test]
fn identifier_dotted_with_whitespace() {
    // Whitespace around the dots is allowed and normalizes away.
    assert_eq!(parse_ok("test . x . y"), ident(&["test", "x", "y"]));
    assert_eq!(parse_ok("test.x.y"), ident(&["test", "x", "y"]));
    round_trip("test . x . y");
}

#[test]
fn variable() {
    assert_eq!(parse_ok(":test"), Expr::Variable(String::from("test")));
    round_trip(":test");
}

#[test]
fn booleans() {
    assert_eq!(parse_ok("true"), Expr::Literal(Literal::Bool(true)));
    assert_eq!(parse_ok("false"), Expr::Literal(Literal::Bool(false)));
    round_trip("true");
    round_trip("false");
}

#[test]
fn integer() {
    assert_eq!(parse_ok("5"), int(5));
    round_trip("5");
}

#[test]
fn floats() {
    assert_eq!(parse_ok("5."), Expr::Literal(Literal::Float(5.0)));
    assert_eq!(parse_ok("5.2"), Expr::Literal(Literal::Float(5.2)));
    round_trip("5.");
    round_trip("5.2");
}

#[test]
fn strings_single_and_double_quoted() {
    assert_eq!(parse_ok("'test'"), string("test"));
    assert_eq!(parse_ok("\"test\""), string("test"));
    assert_eq!(parse_ok("'test'"), parse_ok("\"test\""));
    round_trip("'test'");
}

#[test]
fn string_escapes_round_trip() {
    round_trip(r#"'it\'s'"#);
    round_trip("\"line\\nbreak\"");
    round_trip(r#""back\\slash""#);
}

#[test]
fn null() {
    assert_eq!(parse_ok("null"), Expr::Literal(Literal::Null));
    round_trip("null");
}

#[test]
fn list() {
    assert_eq!(parse_ok("[1, 2]"), Expr::List(vec![int(1), int(2)]));
    round_trip("[1, 2]");
}

#[test]
fn list_of_mixed_primaries() {
    assert_eq!(
        parse_ok("['married', 'single', :other]"),
        Expr::List(vec![
            string("married"),
            string("single"),
            Expr::Variable(String::from("other")),
        ])
    );
    round_trip("['married', 'single', :other]");
}

#[test]
fn keywords_are_not_identifiers() {
    // `true` is a literal even where a column name would be legal.
    assert_eq!(parse_ok("true"), Expr::Literal(Literal::Bool(true)));
    // Capitalized spellings are plain identifiers.
    assert_eq!(parse_ok("True"), ident(&["True"]));
}

#[test]
fn parenthesized_primary() {
    assert_eq!(parse_ok("(5)"), int(5));
}

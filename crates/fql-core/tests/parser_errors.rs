//! Tests for parse error reporting.

use fql_core::parse;

fn parse_err(input: &str) -> fql_core::ParseError {
    match parse(input) {
        Ok(expr) => panic!("expected {input:?} to fail, parsed {expr:?}"),
        Err(e) => e,
    }
}

#[test]
fn empty_input() {
    let e = parse_err("");
    assert!(e.message.contains("end of input"));
}

#[test]
fn trailing_tokens_are_rejected() {
    let e = parse_err("1 + 2 3");
    assert_eq!(e.position(), 6);
    assert!(e.message.contains("end of input"));
}

#[test]
fn missing_operand() {
    parse_err("1 +");
    parse_err("and 1");
    parse_err("1 ==");
}

#[test]
fn unbalanced_parens() {
    parse_err("(1 + 2");
    parse_err("1 + 2)");
}

#[test]
fn empty_list_is_invalid() {
    parse_err("[]");
}

#[test]
fn trailing_comma_in_list_is_invalid() {
    parse_err("[1, 2,]");
}

#[test]
fn unterminated_list() {
    parse_err("[1, 2");
}

#[test]
fn single_equals_is_an_error() {
    let e = parse_err("a = 1");
    assert!(e.message.contains("=="));
}

#[test]
fn dangling_dot() {
    parse_err("a.");
    parse_err("a.1");
}

#[test]
fn keyword_after_dot_is_invalid() {
    parse_err("a.in");
}

#[test]
fn colon_without_name() {
    parse_err(": x");
    parse_err(":");
}

#[test]
fn unterminated_string() {
    let e = parse_err("'oops");
    assert!(e.message.contains("Unterminated"));
}

#[test]
fn unknown_character() {
    let e = parse_err("a ^ b");
    assert!(e.message.contains('^'));
}

#[test]
fn error_carries_position() {
    let e = parse_err("key == ?");
    assert_eq!(e.position(), 7);
}

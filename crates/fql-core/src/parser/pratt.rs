//! Binding powers for the precedence-climbing expression loop.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Binding power of unary prefix operators (`not`, `+`, `-`).
///
/// Tighter than every binary operator, so `not a and b` parses as
/// `(not a) and b` and `-1 * 2` as `(-1) * 2`.
pub(crate) const UNARY_BP: u8 = 13;

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` with `left_bp < right_bp`, making every
/// binary operator left-associative. `None` means the token is not an
/// infix operator.
#[must_use]
pub(crate) const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        // Logical OR (loosest)
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),

        // Logical AND
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),

        // Equality group
        TokenKind::EqEq
        | TokenKind::NotEq
        | TokenKind::Keyword(Keyword::In | Keyword::Like | Keyword::Ilike) => Some((5, 6)),

        // Relational
        TokenKind::LtEq | TokenKind::GtEq | TokenKind::Lt | TokenKind::Gt => Some((7, 8)),

        // Additive
        TokenKind::Plus | TokenKind::Minus => Some((9, 10)),

        // Multiplicative
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((11, 12)),

        _ => None,
    }
}

/// Converts a token to a binary operator.
#[must_use]
pub(crate) const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Keyword(Keyword::In) => Some(BinaryOp::In),
        TokenKind::Keyword(Keyword::Like) => Some(BinaryOp::Like),
        TokenKind::Keyword(Keyword::Ilike) => Some(BinaryOp::Ilike),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        _ => None,
    }
}

/// Converts a token in prefix position to a unary operator.
///
/// A `+` or `-` at the start of an operand is unary; between two operands
/// the precedence-climbing loop consumes it as additive before this
/// function is ever consulted. Position, not lookahead, disambiguates.
#[must_use]
pub(crate) const fn token_to_unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Keyword(Keyword::Not) => Some(UnaryOp::Not),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_ordering() {
        let or_bp = infix_binding_power(&TokenKind::Keyword(Keyword::Or)).unwrap();
        let and_bp = infix_binding_power(&TokenKind::Keyword(Keyword::And)).unwrap();
        let eq_bp = infix_binding_power(&TokenKind::EqEq).unwrap();
        let rel_bp = infix_binding_power(&TokenKind::Lt).unwrap();
        let add_bp = infix_binding_power(&TokenKind::Plus).unwrap();
        let mul_bp = infix_binding_power(&TokenKind::Star).unwrap();

        assert!(and_bp.0 > or_bp.0);
        assert!(eq_bp.0 > and_bp.0);
        assert!(rel_bp.0 > eq_bp.0);
        assert!(add_bp.0 > rel_bp.0);
        assert!(mul_bp.0 > add_bp.0);
        assert!(UNARY_BP > mul_bp.1);
    }

    #[test]
    fn binary_operators_are_left_associative() {
        for kind in [
            TokenKind::Keyword(Keyword::Or),
            TokenKind::EqEq,
            TokenKind::Plus,
            TokenKind::Star,
        ] {
            let (left, right) = infix_binding_power(&kind).unwrap();
            assert!(left < right);
        }
    }

    #[test]
    fn operator_mappings() {
        assert_eq!(token_to_binary_op(&TokenKind::EqEq), Some(BinaryOp::Eq));
        assert_eq!(
            token_to_binary_op(&TokenKind::Keyword(Keyword::Ilike)),
            Some(BinaryOp::Ilike)
        );
        assert_eq!(token_to_binary_op(&TokenKind::LeftParen), None);

        assert_eq!(token_to_unary_op(&TokenKind::Minus), Some(UnaryOp::Neg));
        assert_eq!(
            token_to_unary_op(&TokenKind::Keyword(Keyword::Not)),
            Some(UnaryOp::Not)
        );
        assert_eq!(token_to_unary_op(&TokenKind::Star), None);
    }
}

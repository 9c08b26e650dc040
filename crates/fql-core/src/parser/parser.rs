//! FQL parser implementation.

use std::collections::HashMap;

use super::error::ParseError;
use super::pratt::{infix_binding_power, token_to_binary_op, token_to_unary_op, UNARY_BP};
use crate::ast::{Expr, Literal};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// FQL parser.
///
/// The input is tokenized up front; expression parsing is a
/// precedence-climbing loop over the token vector with a packrat memo
/// table keyed on `(binding power, token index)`, which keeps reparses of
/// deeply nested operator chains linear.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    memo: HashMap<(u8, usize), (Expr, usize)>,
}

impl Parser {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            tokens: Lexer::new(input).tokenize(),
            pos: 0,
            memo: HashMap::new(),
        }
    }

    /// Parses the input as a single expression.
    ///
    /// The whole input must be consumed; trailing tokens are a parse error.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the input is not a valid FQL expression.
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.expression(0)?;
        let token = self.current().clone();
        match token.kind {
            TokenKind::Eof => Ok(expr),
            TokenKind::Error(message) => Err(ParseError::new(message, token.span)),
            kind => Err(ParseError::unexpected("end of input", kind, token.span)),
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        let token = self.current().clone();
        if &token.kind == kind {
            self.advance();
            return Ok(());
        }
        Err(match token.kind {
            TokenKind::Error(message) => ParseError::new(message, token.span),
            TokenKind::Eof => ParseError::unexpected_eof(expected, token.span),
            kind => ParseError::unexpected(expected, kind, token.span),
        })
    }

    /// Parses an expression whose operators all bind at least as tightly
    /// as `min_bp`, consulting the packrat memo first.
    fn expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let key = (min_bp, self.pos);
        if let Some((expr, next)) = self.memo.get(&key) {
            let expr = expr.clone();
            self.pos = *next;
            return Ok(expr);
        }
        let expr = self.expression_uncached(min_bp)?;
        self.memo.insert(key, (expr.clone(), self.pos));
        Ok(expr)
    }

    fn expression_uncached(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        // A `+`, `-`, or `not` at the start of an operand is a unary
        // prefix; in infix position the loop below consumes it first.
        let mut lhs = match token_to_unary_op(&self.current().kind) {
            Some(op) => {
                self.advance();
                let operand = self.expression(UNARY_BP)?;
                Expr::Unary {
                    op,
                    operand: Box::new(operand),
                }
            }
            None => self.primary()?,
        };

        loop {
            let Some((left_bp, right_bp)) = infix_binding_power(&self.current().kind) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            let Some(op) = token_to_binary_op(&self.current().kind) else {
                break;
            };
            self.advance();
            let right = self.expression(right_bp)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(right),
            };
        }

        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Integer(i) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(i)))
            }
            TokenKind::Float(v) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(v)))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                self.identifier_path(name)
            }
            TokenKind::Variable(name) => {
                self.advance();
                Ok(Expr::Variable(name))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression(0)?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LeftBracket => {
                self.advance();
                self.list()
            }
            TokenKind::Error(message) => Err(ParseError::new(message, token.span)),
            TokenKind::Eof => Err(ParseError::unexpected_eof("an expression", token.span)),
            kind => Err(ParseError::unexpected("an expression", kind, token.span)),
        }
    }

    /// Parses the remainder of a dotted identifier path. Whitespace around
    /// the dots is allowed; `a . b` normalizes to `a.b`.
    fn identifier_path(&mut self, first: String) -> Result<Expr, ParseError> {
        let mut segments = vec![first];
        while matches!(self.current().kind, TokenKind::Dot) {
            self.advance();
            let token = self.current().clone();
            match token.kind {
                TokenKind::Identifier(name) => {
                    self.advance();
                    segments.push(name);
                }
                TokenKind::Eof => {
                    return Err(ParseError::unexpected_eof("identifier after '.'", token.span));
                }
                kind => {
                    return Err(ParseError::unexpected("identifier after '.'", kind, token.span));
                }
            }
        }
        Ok(Expr::Identifier(segments))
    }

    /// Parses a list. The opening bracket has been consumed; lists have at
    /// least one element and no trailing comma.
    fn list(&mut self) -> Result<Expr, ParseError> {
        let mut items = vec![self.expression(0)?];
        while matches!(self.current().kind, TokenKind::Comma) {
            self.advance();
            items.push(self.expression(0)?);
        }
        self.expect(&TokenKind::RightBracket, "']'")?;
        Ok(Expr::List(items))
    }
}

/// Parses an FQL expression from source text.
///
/// # Errors
///
/// Returns a [`ParseError`] if the input is not a valid FQL expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    Parser::new(input).parse()
}

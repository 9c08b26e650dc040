//! Token types for the FQL lexer.

use super::Span;

/// FQL keywords.
///
/// Keywords are case-sensitive and always take precedence over
/// identifiers, so `true` is a boolean literal and never a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    True,
    False,
    Null,
    And,
    Or,
    Not,
    In,
    Like,
    Ilike,
}

impl Keyword {
    /// Looks up a keyword from raw identifier text.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "null" => Some(Self::Null),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            "in" => Some(Self::In),
            "like" => Some(Self::Like),
            "ilike" => Some(Self::Ilike),
            _ => None,
        }
    }

    /// Returns the source spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::In => "in",
            Self::Like => "like",
            Self::Ilike => "ilike",
        }
    }
}

/// The kind of a lexed token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal.
    Integer(i64),
    /// Float literal (`5.2`, or `5.` with no fractional digits).
    Float(f64),
    /// String literal with escapes resolved.
    String(String),
    /// Identifier (a single path segment; dots are separate tokens).
    Identifier(String),
    /// Variable reference, without the leading colon.
    Variable(String),
    /// Keyword.
    Keyword(Keyword),

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `==`
    EqEq,
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

    /// Lexical error with a message.
    Error(String),
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns a short human-readable description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Integer(i) => format!("integer {i}"),
            Self::Float(f) => format!("float {f}"),
            Self::String(_) => String::from("string literal"),
            Self::Identifier(name) => format!("identifier {name}"),
            Self::Variable(name) => format!("variable :{name}"),
            Self::Keyword(kw) => format!("keyword {}", kw.as_str()),
            Self::LeftParen => String::from("("),
            Self::RightParen => String::from(")"),
            Self::LeftBracket => String::from("["),
            Self::RightBracket => String::from("]"),
            Self::Comma => String::from(","),
            Self::Dot => String::from("."),
            Self::Plus => String::from("+"),
            Self::Minus => String::from("-"),
            Self::Star => String::from("*"),
            Self::Slash => String::from("/"),
            Self::Percent => String::from("%"),
            Self::EqEq => String::from("=="),
            Self::NotEq => String::from("!="),
            Self::Lt => String::from("<"),
            Self::LtEq => String::from("<="),
            Self::Gt => String::from(">"),
            Self::GtEq => String::from(">="),
            Self::Error(message) => message.clone(),
            Self::Eof => String::from("end of input"),
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The source byte range the token was lexed from.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

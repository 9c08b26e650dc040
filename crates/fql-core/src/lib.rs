//! # fql-core
//!
//! The front end of FQL, a small filter language that lets untrusted
//! clients express SQL-style `WHERE` predicates without writing SQL.
//!
//! This crate provides:
//! - A hand-written lexer and a Pratt expression parser with packrat
//!   memoization
//! - The immutable FQL expression tree ([`Expr`]) with a canonical
//!   printer (`Display`) whose output reparses to an equal tree
//! - An LRU-bounded compiled-expression cache ([`AstCache`])
//!
//! FQL is *not* SQL. Example expression:
//!
//! ```text
//! name like "%Smith%" and account != null and status in ["married", "single"]
//! ```
//!
//! Values coming from the outside world belong in variables, bound later
//! from a parameter map:
//!
//! ```rust
//! use fql_core::{parse, Expr};
//!
//! let expr = parse("credit > :min_value and state == 'open'").unwrap();
//! assert!(matches!(expr, Expr::Binary { .. }));
//! ```
//!
//! Binding identifiers against a schema and emitting relational queries
//! lives in the `fql-compiler` crate; this crate is purely textual.

pub mod ast;
pub mod cache;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, Literal, UnaryOp};
pub use cache::{AstCache, DEFAULT_CACHE_CAPACITY};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse, ParseError, Parser};

//! # fql-compiler
//!
//! The semantic half of FQL: binds parsed filter expressions against a
//! declared table schema and assembles relational queries.
//!
//! This crate provides:
//! - A schema [`Catalog`] of tables, columns, and foreign-key edges
//! - The [`Binder`], which resolves dotted identifier paths (materializing
//!   LEFT OUTER JOINs with deterministic aliases), substitutes variables
//!   from a parameter map, and dispatches operators type-awarely
//! - The [`QueryBuilder`] assembler, which emits SELECT / COUNT / INSERT /
//!   UPDATE / DELETE statements as SQL text plus out-of-band bind values
//!
//! ```rust
//! use fql_compiler::{integer, text, Catalog, Params, QueryBuilder, TableSchema};
//!
//! let mut catalog = Catalog::new();
//! let table = catalog
//!     .register(
//!         TableSchema::new("users")
//!             .column(integer("id").primary_key())
//!             .column(text("name").not_null()),
//!     )
//!     .unwrap();
//!
//! let params = Params::new();
//! let mut builder = QueryBuilder::new(&catalog, table, &params);
//! let filter = fql_core::parse("name like '%Smith%'").unwrap();
//! let predicate = builder.bind(&filter).unwrap();
//! let select = builder
//!     .select(Some(predicate), &[String::from("name")], &[], None, None)
//!     .unwrap();
//! assert_eq!(
//!     select.query.sql,
//!     "SELECT users.name FROM users WHERE (users.name LIKE ?)"
//! );
//! ```

pub mod binder;
pub mod error;
pub mod join;
mod ops;
pub mod query;
pub mod schema;
pub mod sql;
pub mod value;

pub use binder::Binder;
pub use error::{BindError, SchemaError};
pub use join::JoinTree;
pub use query::{parse_order, OrderSpec, Query, QueryBuilder, SelectField, SelectQuery};
pub use schema::{
    blob, boolean, date, datetime, float, integer, text, Catalog, ColumnSchema, ColumnType,
    ForeignKey, TableSchema,
};
pub use sql::{ColumnRef, SqlBinaryOp, SqlExpr, SqlUnaryOp};
pub use value::{Params, Value};

//! # fql-store
//!
//! The data-access façade over the FQL compiler pipeline.
//!
//! This crate provides:
//! - [`Db`] / [`Session`]: a connection-per-logical-operation model where
//!   each scope holds exactly one open transaction, committing on normal
//!   exit and rolling back on failure
//! - [`TableManager`]: per-table CRUD and query operations driving
//!   parse → bind → assemble → execute
//! - [`StateTableManager`]: the state-machine variant with
//!   `change_state` transitions
//! - [`Registry`]: an explicit name-to-manager map for service layers
//!
//! ## Example
//!
//! ```no_run
//! use fql_store::{integer, text, Catalog, Db, DbOptions, ReadQuery, TableSchema};
//!
//! # async fn demo() -> fql_store::Result<()> {
//! let mut catalog = Catalog::new();
//! catalog
//!     .register(
//!         TableSchema::new("users")
//!             .column(integer("id").primary_key())
//!             .column(text("name").not_null())
//!             .column(text("account")),
//!     )
//!     .unwrap();
//!
//! let db = Db::connect(&DbOptions::new("sqlite://app.db"), catalog).await?;
//! let users = db.manager("users").unwrap();
//!
//! let mut session = db.session().await?;
//! let rows = users
//!     .read(
//!         &mut session,
//!         &ReadQuery::new()
//!             .filter("name like '%Smith%' and account != null")
//!             .order("name asc"),
//!     )
//!     .await?;
//! session.commit().await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

mod db;
mod error;
mod filter;
mod manager;
mod registry;
mod state;

pub use db::{Db, DbOptions, Session};
pub use error::{Result, StoreError};
pub use filter::{Filter, ReadQuery};
pub use manager::{Record, TableManager};
pub use registry::Registry;
pub use state::StateTableManager;

// Re-export the compiler surface call sites need for catalogs and values.
pub use fql_compiler::{
    blob, boolean, date, datetime, float, integer, text, BindError, Catalog, ColumnSchema,
    ColumnType, Params, SchemaError, SqlExpr, TableSchema, Value,
};
pub use fql_core::{parse, AstCache, Expr, ParseError};

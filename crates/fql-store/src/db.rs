//! Database handle, sessions, and the transaction scope.
//!
//! A [`Session`] is the connection of one logical operation: it holds a
//! pooled connection with exactly one open transaction. Committing or
//! rolling back consumes the session, so a scope cannot keep issuing
//! statements after it ended, and a second connection cannot be smuggled
//! into the same scope — the session value *is* the scope.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use fql_compiler::{Catalog, Query, Value};
use fql_core::{AstCache, DEFAULT_CACHE_CAPACITY};

use crate::error::{Result, StoreError};
use crate::manager::TableManager;

/// Connection, cache, and timeout configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbOptions {
    /// Database URL, e.g. `sqlite://app.db` or `sqlite::memory:`.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
    /// Deadline applied to every driver call; `None` disables it.
    pub statement_timeout: Option<Duration>,
    /// Capacity of the compiled-expression cache; `0` disables caching.
    pub ast_cache_capacity: usize,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            statement_timeout: None,
            ast_cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl DbOptions {
    /// Creates options for the given URL with defaults for the rest.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// A configured database: pool, schema catalog, and expression cache.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
    catalog: Arc<Catalog>,
    cache: Arc<AstCache>,
    statement_timeout: Option<Duration>,
}

impl Db {
    /// Connects the pool and freezes the catalog.
    ///
    /// # Errors
    ///
    /// Returns a driver error if the pool cannot connect.
    pub async fn connect(options: &DbOptions, catalog: Catalog) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(&options.url)
            .await?;
        Ok(Self {
            pool,
            catalog: Arc::new(catalog),
            cache: Arc::new(AstCache::new(options.ast_cache_capacity)),
            statement_timeout: options.statement_timeout,
        })
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the schema catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Returns the compiled-expression cache.
    #[must_use]
    pub fn ast_cache(&self) -> &Arc<AstCache> {
        &self.cache
    }

    /// Creates a manager for a registered table, or `None` if the name is
    /// not in the catalog.
    #[must_use]
    pub fn manager(&self, table: &str) -> Option<TableManager> {
        let schema = Arc::clone(self.catalog.lookup_table(table)?);
        Some(TableManager::new(
            Arc::clone(&self.catalog),
            schema,
            Arc::clone(&self.cache),
        ))
    }

    /// Acquires a connection and begins the transaction of a new
    /// logical-operation scope.
    ///
    /// # Errors
    ///
    /// Returns a driver error if no connection can be acquired.
    pub async fn session(&self) -> Result<Session> {
        let tx = self.pool.begin().await?;
        Ok(Session {
            tx,
            statement_timeout: self.statement_timeout,
        })
    }

    /// Runs `f` inside a fresh session. A normal return commits; a
    /// propagated error rolls back before being returned.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a driver error from
    /// commit/session setup.
    pub async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, Result<T>>,
    {
        let mut session = self.session().await?;
        match f(&mut session).await {
            Ok(value) => {
                session.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = session.rollback().await {
                    warn!(%rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

/// One logical-operation scope: a connection with one open transaction.
///
/// Dropping a session without committing rolls the transaction back.
pub struct Session {
    tx: Transaction<'static, Sqlite>,
    statement_timeout: Option<Duration>,
}

impl Session {
    /// Commits the transaction and releases the connection.
    ///
    /// # Errors
    ///
    /// Returns a driver error if the commit fails.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(Into::into)
    }

    /// Rolls the transaction back and releases the connection.
    ///
    /// # Errors
    ///
    /// Returns a driver error if the rollback fails.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.map_err(Into::into)
    }

    /// Raw access to the underlying connection, for statements outside the
    /// façade (schema setup, pragmas).
    pub fn connection(&mut self) -> &mut sqlx::SqliteConnection {
        &mut self.tx
    }

    pub(crate) async fn fetch_all(&mut self, query: &Query) -> Result<Vec<SqliteRow>> {
        debug!(sql = %query.sql, params = query.params.len(), "fetch");
        let timeout = self.statement_timeout;
        let prepared = bind_params(sqlx::query(&query.sql), &query.params);
        with_timeout(timeout, prepared.fetch_all(&mut *self.tx)).await
    }

    pub(crate) async fn fetch_one(&mut self, query: &Query) -> Result<SqliteRow> {
        debug!(sql = %query.sql, params = query.params.len(), "fetch one");
        let timeout = self.statement_timeout;
        let prepared = bind_params(sqlx::query(&query.sql), &query.params);
        with_timeout(timeout, prepared.fetch_one(&mut *self.tx)).await
    }

    /// Executes a mutating statement and returns the affected-row count.
    pub(crate) async fn execute(&mut self, query: &Query) -> Result<u64> {
        debug!(sql = %query.sql, params = query.params.len(), "execute");
        let timeout = self.statement_timeout;
        let prepared = bind_params(sqlx::query(&query.sql), &query.params);
        let result = with_timeout(timeout, prepared.execute(&mut *self.tx)).await?;
        Ok(result.rows_affected())
    }

    /// Executes an INSERT and returns the new primary key.
    pub(crate) async fn insert(&mut self, query: &Query) -> Result<i64> {
        debug!(sql = %query.sql, params = query.params.len(), "insert");
        let timeout = self.statement_timeout;
        let prepared = bind_params(sqlx::query(&query.sql), &query.params);
        let result = with_timeout(timeout, prepared.execute(&mut *self.tx)).await?;
        Ok(result.last_insert_rowid())
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_params<'q>(mut query: SqliteQuery<'q>, params: &[Value]) -> SqliteQuery<'q> {
    for value in params {
        query = match value {
            Value::Null => query.bind(Option::<i64>::None),
            Value::Bool(b) => query.bind(*b),
            Value::Int(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
            Value::Date(d) => query.bind(*d),
            Value::DateTime(dt) => query.bind(*dt),
            Value::Blob(b) => query.bind(b.clone()),
        };
    }
    query
}

async fn with_timeout<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = sqlx::Result<T>>,
) -> Result<T> {
    match timeout {
        Some(duration) => match tokio::time::timeout(duration, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(StoreError::Timeout(duration)),
        },
        None => fut.await.map_err(Into::into),
    }
}

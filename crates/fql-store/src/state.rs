//! State-machine façade: managers for tables whose rows move through a
//! `state` column.

use chrono::Utc;

use fql_compiler::{ColumnRef, ColumnType, SchemaError, SqlBinaryOp, SqlExpr, Value};

use crate::db::Session;
use crate::error::Result;
use crate::filter::Filter;
use crate::manager::{assignments, Record, TableManager};

/// A [`TableManager`] for tables with a non-nullable text `state` column.
///
/// When the table also has a `last_state_change` datetime column, every
/// state transition stamps it with the current UTC time.
#[derive(Debug, Clone)]
pub struct StateTableManager {
    inner: TableManager,
    state_column: ColumnRef,
    has_last_state_change: bool,
}

impl StateTableManager {
    /// Wraps a manager, validating the state-machine columns.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if `state` is missing, nullable, or not
    /// text, or if `last_state_change` exists but is not a datetime.
    pub fn new(inner: TableManager) -> std::result::Result<Self, SchemaError> {
        let schema = inner.schema();
        let state = schema
            .get("state")
            .filter(|column| column.ty == ColumnType::Text && !column.nullable)
            .ok_or_else(|| SchemaError::MissingState(String::from(schema.name())))?;
        let state_column = ColumnRef::new(schema.name(), state);

        let has_last_state_change = match schema.get("last_state_change") {
            None => false,
            Some(column) if column.ty == ColumnType::DateTime => true,
            Some(_) => {
                return Err(SchemaError::WrongColumnType {
                    table: String::from(schema.name()),
                    column: String::from("last_state_change"),
                    expected: "datetime",
                })
            }
        };

        Ok(Self {
            inner,
            state_column,
            has_last_state_change,
        })
    }

    /// Returns the wrapped manager.
    #[must_use]
    pub fn manager(&self) -> &TableManager {
        &self.inner
    }

    /// Moves the rows matching `filter` whose state is `old_state` into
    /// `new_state`, applying `extra` values in the same update. Returns
    /// the affected-row count.
    ///
    /// # Errors
    ///
    /// Returns parse/bind errors from the filter, or a driver error.
    pub async fn change_state(
        &self,
        session: &mut Session,
        filter: &Filter,
        old_state: &str,
        new_state: &str,
        extra: Option<&Record>,
    ) -> Result<u64> {
        let mut values: Record = extra.cloned().unwrap_or_default();
        values.insert(String::from("state"), Value::from(new_state));
        if self.has_last_state_change {
            values.insert(
                String::from("last_state_change"),
                Value::from(Utc::now().naive_utc()),
            );
        }
        let query =
            self.inner
                .update_query(filter, Some(self.state_equals(old_state)), &assignments(&values))?;
        session.execute(&query).await
    }

    /// Moves one row by id from `old_state` to `new_state`.
    ///
    /// # Errors
    ///
    /// Returns `UNRECOVERABLE` if the row is missing or not in
    /// `old_state`; the transaction must then be rolled back.
    pub async fn change_state_by_id(
        &self,
        session: &mut Session,
        id: i64,
        old_state: &str,
        new_state: &str,
        extra: Option<&Record>,
    ) -> Result<()> {
        self.change_state_many_by_id(session, &[id], old_state, new_state, extra)
            .await
    }

    /// Moves several rows by id from `old_state` to `new_state`.
    ///
    /// # Errors
    ///
    /// Returns `UNRECOVERABLE` if the affected count differs from the
    /// number of ids; the transaction must then be rolled back.
    pub async fn change_state_many_by_id(
        &self,
        session: &mut Session,
        ids: &[i64],
        old_state: &str,
        new_state: &str,
        extra: Option<&Record>,
    ) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let filter = Filter::Predicate(SqlExpr::id_in(self.inner.table_name(), ids));
        let affected = self
            .change_state(session, &filter, old_state, new_state, extra)
            .await?;
        self.inner.check_affected(affected, ids.len(), "updating")
    }

    fn state_equals(&self, state: &str) -> SqlExpr {
        SqlExpr::Binary {
            op: SqlBinaryOp::Eq,
            left: Box::new(SqlExpr::Column(self.state_column.clone())),
            right: Box::new(SqlExpr::Value(Value::from(state))),
        }
    }
}

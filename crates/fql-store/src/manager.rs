//! Per-table data-access managers.
//!
//! A [`TableManager`] exposes the CRUD and query operations of one table,
//! driving the FQL pipeline: filter text is parsed (through the shared
//! expression cache), bound against the catalog, assembled into driver
//! statements, and executed inside the caller's [`Session`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use fql_compiler::{
    Catalog, ColumnType, Params, Query, QueryBuilder, SelectField, SelectQuery, SqlExpr,
    TableSchema, Value,
};
use fql_core::AstCache;

use crate::db::Session;
use crate::error::{Result, StoreError};
use crate::filter::{Filter, ReadQuery};

/// A result row or a set of column assignments, keyed by field name.
///
/// Read results are keyed by the requested field strings, so a dotted
/// foreign-key path comes back under that exact path.
pub type Record = BTreeMap<String, Value>;

/// The data-access façade for one table.
///
/// Managers are cheap to clone and hold no connection; every operation
/// executes inside the [`Session`] passed to it.
#[derive(Debug, Clone)]
pub struct TableManager {
    catalog: Arc<Catalog>,
    schema: Arc<TableSchema>,
    cache: Arc<AstCache>,
}

impl TableManager {
    /// Creates a manager for `schema`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, schema: Arc<TableSchema>, cache: Arc<AstCache>) -> Self {
        Self {
            catalog,
            schema,
            cache,
        }
    }

    /// Returns the table schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    /// Returns the table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.schema.name()
    }

    /// Inserts one row and returns its new primary key.
    ///
    /// # Errors
    ///
    /// Returns `UNKNOWN_COLUMN` for a value keyed by a missing column, or
    /// a driver error.
    pub async fn create(&self, session: &mut Session, values: &Record) -> Result<i64> {
        let query = self.insert_query(values)?;
        session.insert(&query).await
    }

    /// Inserts several rows, returning their new primary keys in input
    /// order.
    ///
    /// # Errors
    ///
    /// As [`TableManager::create`]; the first failure aborts the batch.
    pub async fn create_many(
        &self,
        session: &mut Session,
        values_list: &[Record],
    ) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(values_list.len());
        for values in values_list {
            let query = self.insert_query(values)?;
            ids.push(session.insert(&query).await?);
        }
        Ok(ids)
    }

    /// Reads one row by id.
    ///
    /// When `fields` is given without `id`, the id is fetched internally
    /// and stripped from the result.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` if the id does not exist.
    pub async fn read_by_id(
        &self,
        session: &mut Session,
        id: i64,
        fields: Option<&[&str]>,
    ) -> Result<Record> {
        let mut records = self.read_many_by_id(session, &[id], fields).await?;
        records.pop().ok_or_else(|| self.not_found(id))
    }

    /// Reads several rows by id, returned in exactly the order the ids
    /// were given.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` if any id does not exist.
    pub async fn read_many_by_id(
        &self,
        session: &mut Session,
        ids: &[i64],
        fields: Option<&[&str]>,
    ) -> Result<Vec<Record>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let has_id = fields.map_or(true, |fields| fields.contains(&"id"));
        let mut fetch: Vec<String> = match fields {
            Some(fields) => fields.iter().map(|f| String::from(*f)).collect(),
            None => self.schema.column_names(),
        };
        if !has_id {
            fetch.push(String::from("id"));
        }

        let rows = self
            .read(
                session,
                &ReadQuery::new()
                    .filter(SqlExpr::id_in(self.schema.name(), ids))
                    .fields(fetch),
            )
            .await?;

        let mut by_id: HashMap<i64, Record> = HashMap::with_capacity(rows.len());
        for row in rows {
            if let Some(id) = row.get("id").and_then(Value::as_int) {
                by_id.insert(id, row);
            }
        }

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let mut record = by_id.get(id).cloned().ok_or_else(|| self.not_found(*id))?;
            if !has_id {
                record.remove("id");
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Runs a general query and returns the matching rows.
    ///
    /// # Errors
    ///
    /// Returns parse/bind errors from the filter, fields, or ordering, or
    /// a driver error.
    pub async fn read(&self, session: &mut Session, query: &ReadQuery) -> Result<Vec<Record>> {
        let select = self.select_query(query)?;
        let rows = session.fetch_all(&select.query).await?;
        rows.iter().map(|row| decode_row(row, &select.fields)).collect()
    }

    /// Counts the rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns parse/bind errors from the filter, or a driver error.
    pub async fn count(&self, session: &mut Session, filter: &Filter) -> Result<i64> {
        let empty = Params::new();
        let mut builder = self.builder(filter_params(filter, &empty));
        let predicate = self.bind_filter(&mut builder, filter)?;
        let query = builder.count(predicate);
        let row = session.fetch_one(&query).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    /// Runs a query and also counts all rows matching its filter,
    /// ignoring pagination. Returns `(rows, total_count)`.
    ///
    /// # Errors
    ///
    /// As [`TableManager::read`].
    pub async fn read_and_count(
        &self,
        session: &mut Session,
        query: &ReadQuery,
    ) -> Result<(Vec<Record>, i64)> {
        let count = self.count(session, &query.filter).await?;
        let records = self.read(session, query).await?;
        Ok((records, count))
    }

    /// Updates the rows matching `filter` and returns the affected count.
    ///
    /// # Errors
    ///
    /// Returns `UNKNOWN_COLUMN` for a value keyed by a missing column,
    /// parse/bind errors from the filter, or a driver error.
    pub async fn update(
        &self,
        session: &mut Session,
        filter: &Filter,
        values: &Record,
    ) -> Result<u64> {
        let query = self.update_query(filter, None, &assignments(values))?;
        session.execute(&query).await
    }

    /// Updates one row by id.
    ///
    /// # Errors
    ///
    /// Returns `UNRECOVERABLE` if the id does not exist; the transaction
    /// must then be rolled back.
    pub async fn update_by_id(
        &self,
        session: &mut Session,
        id: i64,
        values: &Record,
    ) -> Result<()> {
        self.update_many_by_id(session, &[id], values).await
    }

    /// Updates several rows by id.
    ///
    /// # Errors
    ///
    /// Returns `UNRECOVERABLE` if the affected count differs from the
    /// number of ids; the transaction must then be rolled back.
    pub async fn update_many_by_id(
        &self,
        session: &mut Session,
        ids: &[i64],
        values: &Record,
    ) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let filter = Filter::Predicate(SqlExpr::id_in(self.schema.name(), ids));
        let affected = self.update(session, &filter, values).await?;
        self.check_affected(affected, ids.len(), "updating")
    }

    /// Deletes the rows matching `filter` and returns the affected count.
    ///
    /// # Errors
    ///
    /// Returns parse/bind errors from the filter, or a driver error.
    pub async fn delete(&self, session: &mut Session, filter: &Filter) -> Result<u64> {
        let empty = Params::new();
        let mut builder = self.builder(filter_params(filter, &empty));
        let predicate = self.bind_filter(&mut builder, filter)?;
        let query = builder.delete(predicate);
        session.execute(&query).await
    }

    /// Deletes one row by id.
    ///
    /// # Errors
    ///
    /// Returns `UNRECOVERABLE` if the id does not exist; the transaction
    /// must then be rolled back.
    pub async fn delete_by_id(&self, session: &mut Session, id: i64) -> Result<()> {
        self.delete_many_by_id(session, &[id]).await
    }

    /// Deletes several rows by id.
    ///
    /// # Errors
    ///
    /// Returns `UNRECOVERABLE` if the affected count differs from the
    /// number of ids; the transaction must then be rolled back.
    pub async fn delete_many_by_id(&self, session: &mut Session, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let filter = Filter::Predicate(SqlExpr::id_in(self.schema.name(), ids));
        let affected = self.delete(session, &filter).await?;
        self.check_affected(affected, ids.len(), "deleting")
    }

    fn builder<'a>(&'a self, params: &'a Params) -> QueryBuilder<'a> {
        QueryBuilder::new(&self.catalog, Arc::clone(&self.schema), params)
    }

    /// Parses (through the shared cache) and binds a filter, if any.
    fn bind_filter(
        &self,
        builder: &mut QueryBuilder<'_>,
        filter: &Filter,
    ) -> Result<Option<SqlExpr>> {
        match filter {
            Filter::All => Ok(None),
            Filter::Predicate(predicate) => Ok(Some(predicate.clone())),
            Filter::Fql(fql) | Filter::Bound { fql, .. } => {
                let ast = self
                    .cache
                    .get_or_parse(fql)
                    .map_err(|error| StoreError::parse(fql, error))?;
                let predicate = builder
                    .bind(&ast)
                    .map_err(|error| StoreError::bind(self.schema.name(), fql, error))?;
                Ok(Some(predicate))
            }
        }
    }

    fn select_query(&self, query: &ReadQuery) -> Result<SelectQuery> {
        let empty = Params::new();
        let mut builder = self.builder(filter_params(&query.filter, &empty));
        let predicate = self.bind_filter(&mut builder, &query.filter)?;
        let fields = match &query.fields {
            Some(fields) => fields.clone(),
            None => self.schema.column_names(),
        };
        builder
            .select(predicate, &fields, &query.order, query.limit, query.offset)
            .map_err(|error| StoreError::bind(self.schema.name(), filter_source(&query.filter), error))
    }

    fn insert_query(&self, values: &Record) -> Result<Query> {
        QueryBuilder::insert(&self.schema, &assignments(values))
            .map_err(|error| StoreError::bind(self.schema.name(), "", error))
    }

    /// Builds an UPDATE, optionally conjoining an extra pre-bound
    /// predicate with the caller's filter.
    pub(crate) fn update_query(
        &self,
        filter: &Filter,
        extra: Option<SqlExpr>,
        assignments: &[(String, Value)],
    ) -> Result<Query> {
        let empty = Params::new();
        let mut builder = self.builder(filter_params(filter, &empty));
        let predicate = self.bind_filter(&mut builder, filter)?;
        let predicate = match (predicate, extra) {
            (Some(bound), Some(extra)) => Some(bound.and(extra)),
            (None, Some(extra)) => Some(extra),
            (bound, None) => bound,
        };
        builder
            .update(predicate, assignments)
            .map_err(|error| StoreError::bind(self.schema.name(), filter_source(filter), error))
    }

    pub(crate) fn check_affected(&self, affected: u64, expected: usize, action: &str) -> Result<()> {
        if affected == expected as u64 {
            return Ok(());
        }
        warn!(
            table = self.schema.name(),
            affected,
            expected,
            "bulk mutation affected an unexpected number of rows, the transaction must be rolled back"
        );
        Err(StoreError::Unrecoverable(format!(
            "one or more ids were not found while {action} rows in table {}",
            self.schema.name()
        )))
    }

    fn not_found(&self, id: i64) -> StoreError {
        StoreError::NotFound(format!(
            "id {id} was not found in table {}",
            self.schema.name()
        ))
    }
}

/// Returns the parameter map carried by a filter, or `empty`.
fn filter_params<'a>(filter: &'a Filter, empty: &'a Params) -> &'a Params {
    match filter {
        Filter::Bound { params, .. } => params,
        _ => empty,
    }
}

/// Returns the FQL source carried by a filter, for diagnostics.
fn filter_source(filter: &Filter) -> &str {
    match filter {
        Filter::Fql(fql) | Filter::Bound { fql, .. } => fql,
        _ => "",
    }
}

pub(crate) fn assignments(values: &Record) -> Vec<(String, Value)> {
    values
        .iter()
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect()
}

fn decode_row(row: &SqliteRow, fields: &[SelectField]) -> Result<Record> {
    let mut record = Record::new();
    for (index, field) in fields.iter().enumerate() {
        record.insert(field.name.clone(), decode_value(row, index, field.ty)?);
    }
    Ok(record)
}

/// Decodes one output column according to its declared schema type.
fn decode_value(row: &SqliteRow, index: usize, ty: ColumnType) -> Result<Value> {
    Ok(match ty {
        ColumnType::Integer => row
            .try_get::<Option<i64>, _>(index)?
            .map_or(Value::Null, Value::Int),
        ColumnType::Float => row
            .try_get::<Option<f64>, _>(index)?
            .map_or(Value::Null, Value::Float),
        ColumnType::Text => row
            .try_get::<Option<String>, _>(index)?
            .map_or(Value::Null, Value::Text),
        ColumnType::Boolean => row
            .try_get::<Option<bool>, _>(index)?
            .map_or(Value::Null, Value::Bool),
        ColumnType::Date => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map_or(Value::Null, Value::Date),
        ColumnType::DateTime => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map_or(Value::Null, Value::DateTime),
        ColumnType::Blob => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map_or(Value::Null, Value::Blob),
    })
}

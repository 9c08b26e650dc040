//! Schema catalog: tables, columns, and foreign-key edges.
//!
//! The catalog is configured once at startup and immutable afterwards, so
//! it is shared across workers without locking. The binder requires every
//! registered table to carry an integer primary-key column named `id`;
//! [`Catalog::register`] enforces that invariant up front.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;

/// Scalar column types understood by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer.
    Integer,
    /// Double-precision float.
    Float,
    /// Text.
    Text,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time without timezone.
    DateTime,
    /// Binary blob.
    Blob,
}

/// A foreign-key edge to a column of another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Target table name.
    pub table: String,
    /// Target column name.
    pub column: String,
}

/// A column definition.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Scalar type.
    pub ty: ColumnType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Outgoing foreign-key edges. Dotted-path navigation requires exactly
    /// one edge targeting the `id` column of another table.
    pub foreign_keys: Vec<ForeignKey>,
}

impl ColumnSchema {
    /// Creates a nullable column of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: true,
            primary_key: false,
            foreign_keys: Vec::new(),
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as primary key (implies NOT NULL).
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Adds a foreign-key edge to `table.id`.
    #[must_use]
    pub fn references(self, table: impl Into<String>) -> Self {
        self.references_column(table, "id")
    }

    /// Adds a foreign-key edge to an arbitrary column of another table.
    #[must_use]
    pub fn references_column(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_keys.push(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Creates an integer column.
#[must_use]
pub fn integer(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Integer)
}

/// Creates a float column.
#[must_use]
pub fn float(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Float)
}

/// Creates a text column.
#[must_use]
pub fn text(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Text)
}

/// Creates a boolean column.
#[must_use]
pub fn boolean(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Boolean)
}

/// Creates a date column.
#[must_use]
pub fn date(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Date)
}

/// Creates a datetime column.
#[must_use]
pub fn datetime(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::DateTime)
}

/// Creates a blob column.
#[must_use]
pub fn blob(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Blob)
}

/// A table definition: a name and an ordered list of columns.
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Creates an empty table definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns true if the table satisfies the binder invariant: an
    /// integer primary-key column literally named `id`.
    #[must_use]
    pub fn has_id_primary_key(&self) -> bool {
        self.get("id")
            .is_some_and(|c| c.ty == ColumnType::Integer && c.primary_key)
    }
}

/// The schema catalog, mapping table names to their definitions.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, Arc<TableSchema>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table and returns its shared descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the table lacks an integer primary-key
    /// column named `id`, or if the name is already taken.
    pub fn register(&mut self, table: TableSchema) -> Result<Arc<TableSchema>, SchemaError> {
        if !table.has_id_primary_key() {
            return Err(SchemaError::MissingId(table.name));
        }
        if self.tables.contains_key(&table.name) {
            return Err(SchemaError::DuplicateTable(table.name));
        }
        let table = Arc::new(table);
        self.tables.insert(table.name().to_owned(), Arc::clone(&table));
        Ok(table)
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn lookup_table(&self, name: &str) -> Option<&Arc<TableSchema>> {
        self.tables.get(name)
    }

    /// Returns the registered table names, in no particular order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

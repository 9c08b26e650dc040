//! Join context: the tree of table aliases materialized while resolving
//! dotted identifier paths.
//!
//! The tree is rooted at the query's base table (whose alias is the table
//! name itself). Each foreign-key navigation installs at most one child
//! node per foreign-key column; children are kept in sorted key order so
//! that emission produces a stable FROM clause for identical inputs.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::BindError;
use crate::schema::{Catalog, ForeignKey, TableSchema};
use crate::sql::ColumnRef;

#[derive(Debug)]
struct JoinNode {
    table: Arc<TableSchema>,
    alias: String,
    children: BTreeMap<String, JoinNode>,
}

/// The join context for one query.
///
/// Created per query, grown during binding, then rendered and discarded.
#[derive(Debug)]
pub struct JoinTree {
    root: JoinNode,
    aliases: usize,
}

impl JoinTree {
    /// Creates a join context rooted at `table`.
    #[must_use]
    pub fn new(table: Arc<TableSchema>) -> Self {
        let alias = String::from(table.name());
        Self {
            root: JoinNode {
                table,
                alias,
                children: BTreeMap::new(),
            },
            aliases: 0,
        }
    }

    /// Returns the root table.
    #[must_use]
    pub fn root_table(&self) -> &Arc<TableSchema> {
        &self.root.table
    }

    /// Returns the alias of the root table (its own name).
    #[must_use]
    pub fn root_alias(&self) -> &str {
        &self.root.alias
    }

    /// Returns true if any foreign-key joins were materialized.
    #[must_use]
    pub fn has_joins(&self) -> bool {
        !self.root.children.is_empty()
    }

    /// Resolves a dotted identifier path to a bound column, materializing
    /// join nodes for every foreign-key hop.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when a segment names a missing column, a
    /// hop is not an unambiguous foreign key to an `id` column, or the
    /// path reads `id` through a foreign key.
    pub fn resolve(&mut self, catalog: &Catalog, path: &[String]) -> Result<ColumnRef, BindError> {
        resolve_in(&mut self.root, &mut self.aliases, catalog, path)
    }

    /// Renders the FROM clause: the root table LEFT OUTER JOINed with each
    /// materialized alias, in sorted foreign-key order.
    #[must_use]
    pub fn from_clause(&self) -> String {
        let mut sql = String::from(self.root.table.name());
        append_joins(&self.root, &mut sql);
        sql
    }
}

fn append_joins(node: &JoinNode, sql: &mut String) {
    for (fk_column, child) in &node.children {
        sql.push_str(&format!(
            " LEFT OUTER JOIN {} AS {} ON {}.id = {}.{}",
            child.table.name(),
            child.alias,
            child.alias,
            node.alias,
            fk_column
        ));
        append_joins(child, sql);
    }
}

fn resolve_in(
    node: &mut JoinNode,
    aliases: &mut usize,
    catalog: &Catalog,
    path: &[String],
) -> Result<ColumnRef, BindError> {
    let segment = &path[0];
    let foreign_keys = {
        let column = node.table.get(segment).ok_or_else(|| BindError::UnknownColumn {
            table: String::from(node.table.name()),
            column: segment.clone(),
        })?;
        if path.len() == 1 {
            return Ok(ColumnRef::new(node.alias.clone(), column));
        }
        column.foreign_keys.clone()
    };

    let target = follow_foreign_key(node, catalog, segment, &foreign_keys)?;

    if path[1] == "id" {
        return Err(BindError::ForbiddenIdThroughFk {
            column: segment.clone(),
        });
    }

    let child = match node.children.entry(segment.clone()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            *aliases += 1;
            let alias = format!("{}_{}", target.name(), aliases);
            entry.insert(JoinNode {
                table: target,
                alias,
                children: BTreeMap::new(),
            })
        }
    };
    resolve_in(child, aliases, catalog, &path[1..])
}

/// Checks that `segment` is an unambiguous foreign key targeting the `id`
/// column of a registered table, and returns that table.
fn follow_foreign_key(
    node: &JoinNode,
    catalog: &Catalog,
    segment: &str,
    foreign_keys: &[ForeignKey],
) -> Result<Arc<TableSchema>, BindError> {
    let not_a_fk = || BindError::NotAForeignKey {
        table: String::from(node.table.name()),
        column: String::from(segment),
    };
    let fk = match foreign_keys {
        [] => return Err(not_a_fk()),
        [fk] => fk,
        _ => {
            return Err(BindError::AmbiguousForeignKey {
                table: String::from(node.table.name()),
                column: String::from(segment),
            })
        }
    };
    if fk.column != "id" {
        return Err(not_a_fk());
    }
    catalog.lookup_table(&fk.table).cloned().ok_or_else(not_a_fk)
}

//! Manager registry.
//!
//! An explicit name-to-manager map, used to locate the managers an RPC or
//! service layer exposes. Registration happens once at startup; lookups
//! are shared-reference reads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::manager::TableManager;

/// A registry of named managers.
#[derive(Debug, Default)]
pub struct Registry {
    managers: HashMap<String, Arc<TableManager>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a manager under `name`, returning the shared handle.
    /// Re-registering a name replaces the previous manager.
    pub fn register(&mut self, name: impl Into<String>, manager: TableManager) -> Arc<TableManager> {
        let manager = Arc::new(manager);
        self.managers.insert(name.into(), Arc::clone(&manager));
        manager
    }

    /// Looks up a manager by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<TableManager>> {
        self.managers.get(name)
    }

    /// Returns the registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.managers.keys().map(String::as_str)
    }
}

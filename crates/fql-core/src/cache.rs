//! Compiled-expression cache.
//!
//! Parsing is cheap but not free, and the same filter strings tend to
//! arrive over and over from clients. [`AstCache`] keys parsed trees by
//! the exact source text in a bounded LRU; a hit hands out a shared
//! reference to the same immutable AST a cold parse would produce.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;

use crate::ast::Expr;
use crate::parser::{parse, ParseError};

/// Default number of cached expressions.
pub const DEFAULT_CACHE_CAPACITY: usize = 200;

/// A bounded LRU cache of parsed FQL expressions, keyed by source text.
///
/// Get and put are O(1) and a lookup counts as an access for eviction
/// purposes. The cache is shared across threads behind a single mutex;
/// the critical section is small enough that contention is not a concern.
/// A capacity of `0` disables caching entirely and every call reparses.
pub struct AstCache {
    entries: Option<Mutex<LruCache<String, Arc<Expr>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AstCache {
    /// Creates a cache holding up to `capacity` parsed expressions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached parse of `source`, parsing and inserting on a miss.
    ///
    /// Parse failures are returned without being cached.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if `source` is not a valid FQL expression.
    pub fn get_or_parse(&self, source: &str) -> Result<Arc<Expr>, ParseError> {
        if let Some(entries) = &self.entries {
            let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(expr) = entries.get(source) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(expr));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let expr = Arc::new(parse(source)?);
        if let Some(entries) = &self.entries {
            let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.put(String::from(source), Arc::clone(&expr));
        }
        Ok(expr)
    }

    /// Returns true if `source` is currently cached, without touching the
    /// recency order.
    #[must_use]
    pub fn contains(&self, source: &str) -> bool {
        self.entries.as_ref().is_some_and(|entries| {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .peek(source)
                .is_some()
        })
    }

    /// Returns the number of cached expressions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| {
            entries.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of lookups served from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of lookups that required a parse.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for AstCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for AstCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstCache")
            .field("len", &self.len())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

//! Compiled schema cache keyed by entity identity

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::model::EntityId;
use crate::schema::CompiledSchema;

/// Memoizes compiled schemas per entity
///
/// The cache is owned by the caller and shared by reference with any number of
/// compilers. Entries are never evicted; [`SchemaCache::clear`] drops them all.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<EntityId, Arc<CompiledSchema>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema for `id`, counting the hit or miss
    pub fn get(&self, id: EntityId) -> Option<Arc<CompiledSchema>> {
        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        trace!(entity = %id, hit = found.is_some(), "schema cache lookup");
        found
    }

    /// Store a schema unless another caller got there first; returns the stored entry
    pub fn insert(&self, id: EntityId, schema: CompiledSchema) -> Arc<CompiledSchema> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(id).or_insert_with(|| Arc::new(schema)).clone()
    }

    /// Compute-if-absent
    ///
    /// `compile` runs without any lock held, so it may itself consult this
    /// cache. Two racing callers may both compile; the first insert wins.
    pub fn get_or_compile<E>(
        &self,
        id: EntityId,
        compile: impl FnOnce() -> Result<CompiledSchema, E>,
    ) -> Result<Arc<CompiledSchema>, E> {
        if let Some(hit) = self.get(id) {
            return Ok(hit);
        }
        let schema = compile()?;
        Ok(self.insert(id, schema))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_get_or_compile_runs_once() {
        let cache = SchemaCache::new();
        let id = EntityId::next();
        let mut runs = 0;

        for _ in 0..3 {
            let schema = cache
                .get_or_compile(id, || {
                    runs += 1;
                    Ok::<_, Infallible>(CompiledSchema::titled("Customer"))
                })
                .unwrap();
            assert_eq!(schema.title.as_deref(), Some("Customer"));
        }

        assert_eq!(runs, 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = SchemaCache::new();
        let id = EntityId::next();
        cache.insert(id, CompiledSchema::titled("first"));
        let stored = cache.insert(id, CompiledSchema::titled("second"));
        assert_eq!(stored.title.as_deref(), Some("first"));
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SchemaCache::new();
        let id = EntityId::next();
        let result = cache.get_or_compile(id, || Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert!(!cache.contains(id));
    }

    #[test]
    fn test_clear() {
        let cache = SchemaCache::new();
        cache.insert(EntityId::next(), CompiledSchema::default());
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }
}

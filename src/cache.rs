//! Bounded annotation cache for caller-side memoisation (e.g. part-of-speech
//! labels fetched from an external tagger).
//!
//! Eviction is oldest-first by insertion order. Replacing the value of a key
//! that is already cached does not make it younger. None of the analysis
//! engines use this; the caller owns an instance and decides what to store.

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Entries are only ever read with `peek`, so the LRU list stays in
/// insertion order and eviction is oldest-first.
pub struct AnnotationCache<K, V> {
    // `None` when built with capacity 0
    entries: Option<LruCache<K, V>>,
}

impl<K, V> AnnotationCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.as_ref().and_then(|c| c.peek(key))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.as_ref().is_some_and(|c| c.contains(key))
    }

    /// Stores `value` under `key` and returns the entry evicted to make room,
    /// if any. With capacity 0 nothing is stored and the pair is handed back.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let Some(cache) = self.entries.as_mut() else {
            return Some((key, value));
        };
        if let Some(slot) = cache.peek_mut(&key) {
            *slot = value;
            return None;
        }
        cache.push(key, value)
    }

    /// Returns the cached value, computing and storing it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        if let Some(v) = self.get(&key) {
            return v.clone();
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |c| c.cap().get())
    }

    pub fn clear(&mut self) {
        if let Some(cache) = self.entries.as_mut() {
            cache.clear();
        }
    }
}

impl<K, V> fmt::Debug for AnnotationCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

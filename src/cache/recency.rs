//! Recency List Module
//!
//! Ordered entry storage implementing Least Recently Used eviction.

use std::borrow::Borrow;
use std::collections::VecDeque;

use crate::cache::CacheEntry;

// == Insertion Outcome ==
/// What happened to existing entries when a key was inserted.
#[derive(Debug, PartialEq, Eq)]
pub struct Insertion<K, V> {
    /// Previous value stored under the same key
    pub replaced: Option<V>,
    /// Least recently used entry pushed out by the insertion
    pub evicted: Option<CacheEntry<K, V>>,
}

// == Recency List ==
/// Entries ordered by access time, bounded by a fixed capacity.
///
/// Entries are stored in a VecDeque where:
/// - Front = Most recently used (index 0)
/// - Back = Least recently used
///
/// Lookups are linear scans with exact key equality. Not synchronized; the
/// owning cache serializes access.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    /// Entries by recency
    entries: VecDeque<CacheEntry<K, V>>,
    /// Maximum number of entries, always at least 1
    capacity: usize,
}

impl<K: Eq, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates an empty list holding at most `capacity` entries.
    ///
    /// Callers validate `capacity > 0`.
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    // == Position ==
    /// Returns the recency index of `key` without touching the order.
    pub fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries.iter().position(|e| e.key.borrow() == key)
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// Relative order of every other entry is preserved.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let index = self.position(key)?;
        self.promote(index);
        self.entries.front().map(|e| &e.value)
    }

    // == Peek ==
    /// Returns the value for `key` without marking it used.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries
            .iter()
            .find(|e| e.key.borrow() == key)
            .map(|e| &e.value)
    }

    // == Insert ==
    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// An existing entry for the same key is replaced rather than
    /// duplicated. If the list then exceeds its capacity, the least
    /// recently used entry is evicted.
    pub fn insert(&mut self, key: K, value: V) -> Insertion<K, V> {
        let replaced = self
            .position(&key)
            .and_then(|index| self.entries.remove(index))
            .map(|old| old.value);

        self.entries.push_front(CacheEntry::new(key, value));

        let evicted = if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        };

        Insertion { replaced, evicted }
    }

    // == Remove Matching ==
    /// Removes every entry whose key satisfies `predicate`.
    ///
    /// Survivors keep their relative order. The walk does not advance after
    /// a removal, so no entry is skipped.
    pub fn remove_matching<F>(&mut self, mut predicate: F) -> Vec<CacheEntry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if predicate(&self.entries[index].key) {
                if let Some(entry) = self.entries.remove(index) {
                    removed.push(entry);
                }
            } else {
                index += 1;
            }
        }
        removed
    }

    // == Clear ==
    /// Drops all entries and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Capacity ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Keys ==
    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    fn promote(&mut self, index: usize) {
        if index == 0 {
            return;
        }
        if let Some(entry) = self.entries.remove(index) {
            self.entries.push_front(entry);
        }
    }
}

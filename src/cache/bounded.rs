//! Bounded Cache Module
//!
//! Thread-safe cache combining the recency list with access statistics
//! behind a single reentrant lock.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, RecencyList};
use crate::error::{CacheError, Result};

/// Callback receiving entries evicted for capacity.
type EvictionListener<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

#[derive(Debug)]
struct CacheState<K, V> {
    list: RecencyList<K, V>,
    stats: CacheStats,
}

// == Bounded Recency Cache ==
/// Fixed-capacity cache ordered by recency of use.
///
/// Every method takes the lock for its whole body, so single calls are
/// atomic. For check-then-act sequences hold the lock yourself through
/// [`lock`](Self::lock) or [`with_lock`](Self::with_lock). The lock is
/// reentrant: the thread holding a [`CacheGuard`] may keep calling this
/// cache's own methods without deadlocking.
///
/// # Example
/// ```
/// use recency_cache::BoundedRecencyCache;
///
/// let cache = BoundedRecencyCache::new(3).unwrap();
/// cache.put("a".to_string(), 1);
/// cache.put("b".to_string(), 2);
/// cache.put("c".to_string(), 3);
/// cache.put("d".to_string(), 4);
///
/// assert_eq!(cache.size(), 3);
/// assert_eq!(cache.contains("a"), None);
/// assert_eq!(cache.contains("d"), Some(0));
/// ```
pub struct BoundedRecencyCache<K, V> {
    state: ReentrantMutex<RefCell<CacheState<K, V>>>,
    capacity: usize,
    listener: Option<EvictionListener<K, V>>,
}

impl<K: Eq, V> BoundedRecencyCache<K, V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// Returns `CacheError::InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        debug!(capacity, "Creating bounded recency cache");

        Ok(Self {
            state: ReentrantMutex::new(RefCell::new(CacheState {
                list: RecencyList::with_capacity(capacity),
                stats: CacheStats::new(),
            })),
            capacity,
            listener: None,
        })
    }

    // == Eviction Listener ==
    /// Registers a callback that takes ownership of every entry evicted
    /// because the cache was full.
    ///
    /// The callback runs once the guard that evicted the entry is dropped,
    /// so it may call back into the cache. Entries dropped by `remove_if`,
    /// `clear` or by replacing a key are not reported.
    pub fn on_evict<F>(mut self, listener: F) -> Self
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    // == Lock ==
    /// Acquires the cache lock until the returned guard is dropped.
    ///
    /// Other threads block until then. The owning thread may lock again,
    /// directly or through any cache method.
    pub fn lock(&self) -> CacheGuard<'_, K, V> {
        CacheGuard {
            state: self.state.lock(),
            listener: self.listener.as_ref(),
            evicted: Vec::new(),
        }
    }

    // == With Lock ==
    /// Runs `f` under a single lock acquisition.
    ///
    /// `f` may also call this cache's own methods.
    pub fn with_lock<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut CacheGuard<'_, K, V>) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    // == Put ==
    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// An existing entry for `key` is replaced and its old value returned.
    /// When the cache is full the least recently used entry is evicted.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        self.lock().put(key, value)
    }

    // == Try Get ==
    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn try_get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        V: Clone,
    {
        self.lock().try_get(key)
    }

    // == Contains ==
    /// Returns the recency index of `key` (0 = most recent).
    ///
    /// Does not change the order or the statistics.
    pub fn contains<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.lock().contains(key)
    }

    // == Remove If ==
    /// Removes every entry whose key satisfies `predicate` and returns how
    /// many were removed. Survivors keep their order.
    ///
    /// A panicking predicate aborts the scan; entries already removed stay
    /// removed and the lock is released. The predicate must not call back
    /// into this cache: the entries are borrowed for the whole scan and a
    /// nested call panics.
    pub fn remove_if<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        self.lock().remove_if(predicate)
    }

    // == Get Or Insert ==
    /// Returns the cached value for `key`, computing and storing it with
    /// `init` when absent. Lookup and insert happen under one lock.
    ///
    /// `init` runs while the lock is held, so other threads wait for it.
    pub fn get_or_insert_with<F>(&self, key: K, init: F) -> V
    where
        F: FnOnce() -> V,
        V: Clone,
    {
        self.with_lock(|cache| {
            if let Some(value) = cache.try_get(&key) {
                return value;
            }
            let value = init();
            cache.put(key, value.clone());
            value
        })
    }

    // == Clear ==
    /// Removes all entries. Capacity is unchanged.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // == Size ==
    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        self.lock().size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Keys ==
    /// Snapshot of the keys from most to least recently used.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.lock().keys()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }
}

impl<K, V> fmt::Debug for BoundedRecencyCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedRecencyCache")
            .field("capacity", &self.capacity)
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

// == Cache Guard ==
/// Exclusive access to a [`BoundedRecencyCache`].
///
/// Obtained from `lock` or `with_lock`. Operations behave like the cache's
/// own methods but reuse the held lock. Each one borrows the entries only
/// for its own duration, which is what lets the holder call the cache
/// again while the guard is alive. Dropping the guard releases this hold
/// on the lock, then hands any entries it evicted to the eviction listener.
pub struct CacheGuard<'a, K, V> {
    state: ReentrantMutexGuard<'a, RefCell<CacheState<K, V>>>,
    listener: Option<&'a EvictionListener<K, V>>,
    evicted: Vec<CacheEntry<K, V>>,
}

impl<K: Eq, V> CacheGuard<'_, K, V> {
    /// See [`BoundedRecencyCache::put`].
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut state = self.state.borrow_mut();
        let insertion = state.list.insert(key, value);

        if let Some(entry) = insertion.evicted {
            state.stats.record_eviction();
            trace!(
                capacity = state.list.capacity(),
                "Evicted least recently used entry"
            );
            if self.listener.is_some() {
                self.evicted.push(entry);
            }
        }

        let len = state.list.len();
        state.stats.set_total_entries(len);
        insertion.replaced
    }

    /// Returns a clone of the value for `key` and marks it most recently used.
    pub fn try_get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        V: Clone,
    {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match state.list.get(key) {
            Some(value) => {
                state.stats.record_hit();
                Some(value.clone())
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    /// Returns a clone of the value for `key` without marking it used or
    /// counting a hit.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        V: Clone,
    {
        RefCell::borrow(&self.state).list.peek(key).cloned()
    }

    /// See [`BoundedRecencyCache::contains`].
    pub fn contains<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        RefCell::borrow(&self.state).list.position(key)
    }

    /// See [`BoundedRecencyCache::remove_if`].
    pub fn remove_if<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let count = state.list.remove_matching(predicate).len();

        if count > 0 {
            state.stats.record_removals(count);
            state.stats.set_total_entries(state.list.len());
            debug!(
                removed = count,
                remaining = state.list.len(),
                "Removed matching entries"
            );
        }

        count
    }

    /// Removes all entries and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let count = state.list.clear();
        state.stats.set_total_entries(0);

        if count > 0 {
            debug!(cleared = count, "Cleared cache");
        }

        count
    }

    pub fn size(&self) -> usize {
        RefCell::borrow(&self.state).list.len()
    }

    pub fn capacity(&self) -> usize {
        RefCell::borrow(&self.state).list.capacity()
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        RefCell::borrow(&self.state).list.keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        let state = RefCell::borrow(&self.state);
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.list.len());
        stats
    }
}

impl<K, V> Drop for CacheGuard<'_, K, V> {
    fn drop(&mut self) {
        let Some(listener) = self.listener else {
            return;
        };
        if self.evicted.is_empty() {
            return;
        }

        let evicted = mem::take(&mut self.evicted);
        // Listener may re-enter the cache
        ReentrantMutexGuard::unlocked(&mut self.state, || {
            for entry in evicted {
                let (key, value) = entry.into_parts();
                (**listener)(key, value);
            }
        });
    }
}

//! Cache Entry Module
//!
//! Defines the key/value pair held by the recency list.

// == Cache Entry ==
/// A single cache entry.
///
/// The cache holds the value for as long as the entry stays in the list and
/// never inspects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    /// Identity of the entry, unique within a cache
    pub key: K,
    /// The stored value
    pub value: V,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    // == Into Parts ==
    /// Splits the entry into its key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("key".to_string(), 7);

        assert_eq!(entry.key, "key");
        assert_eq!(entry.value, 7);
    }

    #[test]
    fn test_entry_into_parts() {
        let entry = CacheEntry::new("key".to_string(), vec![1, 2, 3]);
        let (key, value) = entry.into_parts();

        assert_eq!(key, "key");
        assert_eq!(value, vec![1, 2, 3]);
    }
}

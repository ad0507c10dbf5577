use std::collections::HashMap;
use std::hash::Hash;

struct MemoEntry<V> {
    value: V,
    inserted: u64,
}

/// Bounded memo table for one function. When full, an insert evicts the
/// oldest entry.
pub struct MemoCache<K, V> {
    max_entries: usize,
    next_seq: u64,
    hits: u64,
    misses: u64,
    entries: HashMap<K, MemoEntry<V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> MemoCache<K, V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            next_seq: 0,
            hits: 0,
            misses: 0,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(victim) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&victim);
            }
        }
        let inserted = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(key, MemoEntry { value, inserted });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_after_insert() {
        let mut cache = MemoCache::new(2);
        assert_eq!(cache.get(&"SP"), None);
        cache.insert("SP", 1);
        assert_eq!(cache.get(&"SP"), Some(1));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let mut cache = MemoCache::new(2);
        cache.insert("AC", 1);
        cache.insert("AL", 2);
        cache.insert("AM", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"AC"), None);
        assert_eq!(cache.get(&"AL"), Some(2));
        assert_eq!(cache.get(&"AM"), Some(3));
    }

    #[test]
    fn test_replacing_a_key_does_not_evict() {
        let mut cache = MemoCache::new(2);
        cache.insert("AC", 1);
        cache.insert("AL", 2);
        cache.insert("AL", 20);

        assert_eq!(cache.get(&"AC"), Some(1));
        assert_eq!(cache.get(&"AL"), Some(20));
    }
}

/// Side-table from element identity to per-feature state.
///
/// DOM nodes are neither `Hash` nor `Ord`, only `PartialEq` (JS `===`), so
/// entries live in a vector and lookups are linear. Feature sets on a page
/// are small.
#[derive(Debug)]
pub struct Registry<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: PartialEq, V> Registry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Inserts state for `key` unless it is already registered. Returns
    /// `true` when this call claimed the key.
    pub fn claim(&mut self, key: K, init: impl FnOnce() -> V) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, init()));
        true
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// Keeps the first occurrence of each item, preserving order.
pub fn unique<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_idempotent() {
        let mut reg: Registry<u32, &str> = Registry::new();
        assert!(reg.claim(7, || "first"));
        assert!(!reg.claim(7, || "second"));
        assert_eq!(reg.get(&7), Some(&"first"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut reg: Registry<u32, bool> = Registry::new();
        reg.claim(1, || false);
        if let Some(revealed) = reg.get_mut(&1) {
            *revealed = true;
        }
        assert_eq!(reg.get(&1), Some(&true));
        assert!(reg.get(&2).is_none());
    }

    #[test]
    fn unique_keeps_first_occurrence_order() {
        assert_eq!(unique(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }
}

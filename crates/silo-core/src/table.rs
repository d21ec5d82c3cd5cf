//! Order-preserving partition-key table.
//!
//! Keys are assigned dense indices in first-seen order, starting at 0. The
//! index stored in a buffered record must still resolve to the same key when
//! the table is materialized for encoding, so materialization iterates the
//! append-only key list, never a hash map.

use std::collections::HashMap;

/// Deduplicating table from partition key to dense index.
///
/// Index assignment is first-seen order: the first distinct key gets 0, the
/// next distinct key 1, and so on. A key's index always equals its position
/// in [`keys`](Self::keys).
#[derive(Debug, Clone, Default)]
pub struct PartitionKeyTable {
    /// Keys in assignment order. Position == assigned index.
    keys: Vec<String>,
    /// Lookup from key to its position in `keys`.
    index: HashMap<String, u64>,
}

impl PartitionKeyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the index for `key`, assigning the next index if unseen.
    ///
    /// Returns `(index, newly_assigned)`.
    pub fn intern(&mut self, key: &str) -> (u64, bool) {
        if let Some(&idx) = self.index.get(key) {
            return (idx, false);
        }
        let idx = self.keys.len() as u64;
        self.keys.push(key.to_string());
        self.index.insert(key.to_string(), idx);
        (idx, true)
    }

    /// Look up the index for `key` without assigning.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.index.get(key).copied()
    }

    /// The keys in assignment order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Remove all keys.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.index.clear();
    }
}

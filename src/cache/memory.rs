//! In-process memory tier

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Memory tier mapping cache keys to an image URL or a confirmed absence
///
/// Owned by a single resolver. The lock is only held for the duration of a
/// map operation, never across an await point.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl MemoryCache {
    /// Creates an empty memory tier
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        // Map operations cannot leave the map half-written; ignore poisoning.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Looks up a key; the outer `None` means it was never stored
    pub fn get(&self, key: &str) -> Option<Option<String>> {
        self.lock().get(key).cloned()
    }

    /// Stores a URL or a confirmed absence for a key
    pub fn insert(&self, key: impl Into<String>, value: Option<String>) {
        self.lock().insert(key.into(), value);
    }

    /// Number of stored keys
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes every entry
    pub fn clear(&self) {
        self.lock().clear();
    }
}

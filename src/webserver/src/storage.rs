use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

// Shared in-memory key/value store holding arbitrary JSON values.
// Writers (set, delete) take the write lock, readers (get, snapshot) the read lock,
// so a read never observes a map in the middle of a mutation.
// Cloning hands out another reference to the same map.
#[derive(Clone, Default)]
pub struct Storage {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl Storage {
    // Create a new Storage with an empty map
    pub fn new() -> Self {
        Storage {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Every critical section leaves the map consistent, so a panic in another
    // holder does not invalidate the data and the guard is taken back.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    // Insert or overwrite the value stored under `key`. Last writer wins.
    pub fn set(&self, key: String, value: Value) {
        self.write().insert(key, value);
    }

    // Look up `key`, returning a copy of its value when present.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    // Remove `key`. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        self.write().remove(key);
    }

    // Copy of every entry taken under a single read lock.
    // The copy is detached from the store, so serializing it can't observe
    // writes that land afterwards.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

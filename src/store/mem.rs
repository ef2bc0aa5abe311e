use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{ObjectStore, StoreError, StoredObject, Visibility};

/// In-memory store. Clones share the same map, so detached scoring threads
/// and the tracker observe each other's writes.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, Vec<u8>>,
    puts: Vec<String>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing the put log. Fixture setup.
    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.lock().objects.insert(key.to_string(), bytes);
    }

    /// Remove an object if present.
    pub fn remove(&self, key: &str) {
        self.lock().objects.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().objects.contains_key(key)
    }

    /// Every key written through `put`, in write order.
    pub fn put_log(&self) -> Vec<String> {
        self.lock().puts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panicking writer leaves the map in a consistent state: puts are
        // whole-object inserts.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ObjectStore for MemStore {
    fn get(&self, key: &str) -> Result<StoredObject, StoreError> {
        self.lock()
            .objects
            .get(key)
            .map(|bytes| StoredObject::new(key, bytes.clone()))
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
        _visibility: Visibility,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.objects.insert(key.to_string(), bytes.to_vec());
        inner.puts.push(key.to_string());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

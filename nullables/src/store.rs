//! Metered store: simulates the host's gas meter.

use axm_store::{KvPair, KvStore, MemStore, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};

/// An in-memory store that allows a fixed number of operations and then
/// fails every call with [`StoreError::ResourceExhausted`].
pub struct MeteredStore {
    inner: MemStore,
    used: AtomicU64,
    limit: AtomicU64,
}

impl MeteredStore {
    pub fn new(limit: u64) -> Self {
        Self {
            inner: MemStore::new(),
            used: AtomicU64::new(0),
            limit: AtomicU64::new(limit),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(u64::MAX)
    }

    /// Reset the meter and allow `limit` more operations.
    pub fn set_limit(&self, limit: u64) {
        self.used.store(0, Ordering::SeqCst);
        self.limit.store(limit, Ordering::SeqCst);
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemStore {
        &self.inner
    }

    fn charge(&self) -> Result<(), StoreError> {
        let used = self.used.fetch_add(1, Ordering::SeqCst) + 1;
        if used > self.limit.load(Ordering::SeqCst) {
            return Err(StoreError::ResourceExhausted(format!(
                "out of gas after {} operations",
                used - 1
            )));
        }
        Ok(())
    }
}

impl KvStore for MeteredStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.charge()?;
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.charge()?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.charge()?;
        self.inner.delete(key)
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        self.charge()?;
        self.inner.range(start, end)
    }
}

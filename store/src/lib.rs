//! Ordered key-value storage capability.
//!
//! The referral engine sees storage only through [`KvStore`]: get / set /
//! delete / has over byte keys plus forward range iteration. Every backend
//! (LMDB, in-memory, a transaction branch) implements the trait, and the rest
//! of the codebase depends only on it.

pub mod branch;
pub mod error;
pub mod memory;

pub use branch::BranchStore;
pub use error::StoreError;
pub use memory::MemStore;

use std::sync::Arc;

/// One key-value pair produced by iteration.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// One buffered write: `Some(value)` sets the key, `None` deletes it.
pub type KvWrite = (Vec<u8>, Option<Vec<u8>>);

/// Ordered byte-key storage.
///
/// Methods take `&self`; backends use interior mutability so that a single
/// store can be shared by the keeper, its hooks and the caller.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All pairs with `start <= key < end` in ascending key order.
    /// `end = None` means unbounded.
    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError>;

    /// All pairs whose key starts with `prefix`, in ascending key order.
    fn prefix_iter(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        let end = prefix_end_bytes(prefix);
        self.range(prefix, end.as_deref())
    }

    /// Apply a batch of writes in order.
    ///
    /// The default applies them one by one. Backends with transactions
    /// override it so that either every write lands or none does.
    fn apply(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        for (key, value) in writes {
            match value {
                Some(value) => self.set(&key, &value)?,
                None => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

/// Smallest key greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix or all `0xff`),
/// i.e. the iteration is unbounded above.
pub fn prefix_end_bytes(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        (**self).has(key)
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        (**self).range(start, end)
    }

    fn apply(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        (**self).apply(writes)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        (**self).has(key)
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        (**self).range(start, end)
    }

    fn apply(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        (**self).apply(writes)
    }
}

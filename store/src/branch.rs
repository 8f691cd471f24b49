//! Transaction branch over a parent store.
//!
//! Writes are buffered in an overlay and become visible in the parent only
//! on [`BranchStore::commit`]. Dropping the branch discards them, which gives
//! the host its "failed transaction leaves no trace" semantics.
//!
//! ```ignore
//! let branch = BranchStore::new(&store);
//! keeper.register(&Context::new(&branch, now), ...)?;
//! branch.commit()?;
//! ```

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

use tracing::trace;

use crate::{KvPair, KvStore, StoreError};

/// `None` in the overlay marks a deletion.
type Overlay = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

pub struct BranchStore<'a> {
    parent: &'a dyn KvStore,
    writes: Mutex<Overlay>,
}

impl<'a> BranchStore<'a> {
    pub fn new(parent: &'a dyn KvStore) -> Self {
        Self {
            parent,
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of buffered writes (sets and deletes).
    pub fn pending(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Hand every buffered write to the parent as one batch, in key order.
    ///
    /// Whether a failed commit leaves part of the batch behind is up to the
    /// parent's [`KvStore::apply`]; the LMDB backend writes nothing.
    pub fn commit(self) -> Result<(), StoreError> {
        let writes = self.writes.into_inner().map_err(poisoned)?;
        trace!(writes = writes.len(), "committing branch");
        self.parent.apply(writes.into_iter().collect())
    }

    /// Drop every buffered write.
    pub fn discard(self) {
        trace!(writes = self.pending(), "discarding branch");
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("branch overlay lock poisoned".into())
}

impl KvStore for BranchStore<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(entry) = self.writes.lock().map_err(poisoned)?.get(key) {
            return Ok(entry.clone());
        }
        self.parent.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.writes
            .lock()
            .map_err(poisoned)?
            .insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.writes.lock().map_err(poisoned)?.insert(key.to_vec(), None);
        Ok(())
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        if matches!(end, Some(end) if end <= start) {
            return Ok(Vec::new());
        }
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.range(start, end)?.into_iter().collect();

        let writes = self.writes.lock().map_err(poisoned)?;
        let upper = end.map_or(Bound::Unbounded, Bound::Excluded);
        for (key, value) in writes.range::<[u8], _>((Bound::Included(start), upper)) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}

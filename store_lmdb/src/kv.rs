//! LMDB implementation of KvStore.
//!
//! Every single `set` or `delete` runs in its own write transaction. A batch
//! handed to [`KvStore::apply`] shares one transaction, which is aborted on
//! the first failure, so callers wrap the store in an
//! [`axm_store::BranchStore`] and commit it at the end to get
//! all-or-nothing semantics across a whole command.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use axm_store::{KvPair, KvStore, KvWrite, StoreError};
use tracing::debug;

use crate::LmdbError;

pub struct LmdbKvStore {
    pub(crate) env: Arc<Env>,
    pub(crate) db: Database<Bytes, Bytes>,
}

impl KvStore for LmdbKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self.db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.put(&mut wtxn, key, value).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn range(&self, start: &[u8], end: Option<&[u8]>) -> Result<Vec<KvPair>, StoreError> {
        if matches!(end, Some(end) if end <= start) {
            return Ok(Vec::new());
        }
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        // LMDB rejects a zero-length key as a cursor position
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let bounds = (lower, end.map_or(Bound::Unbounded, Bound::Excluded));
        let iter = self.db.range(&rtxn, &bounds).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in iter {
            let (key, value) = result.map_err(LmdbError::from)?;
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }

    fn apply(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        let count = writes.len();
        // dropping the txn on an early return aborts it
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for (key, value) in &writes {
            match value {
                Some(value) => self.db.put(&mut wtxn, key, value).map_err(LmdbError::from)?,
                None => {
                    self.db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        debug!(writes = count, "batch committed");
        Ok(())
    }
}

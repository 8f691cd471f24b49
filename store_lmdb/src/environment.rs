//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::{LmdbError, LmdbKvStore};

const REFERRAL_DB: &str = "referral";
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and the referral database handle.
pub struct LmdbEnvironment {
    path: PathBuf,
    env: Arc<Env>,
    referral_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per process for this path
        // and never mapped concurrently by another handle.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let referral_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(REFERRAL_DB))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            path: path.to_path_buf(),
            env: Arc::new(env),
            referral_db,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key-value view of the referral database.
    pub fn referral_store(&self) -> LmdbKvStore {
        LmdbKvStore {
            env: Arc::clone(&self.env),
            db: self.referral_db,
        }
    }
}

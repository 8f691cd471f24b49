//! LMDB storage backend for the referral engine.
//!
//! Implements [`axm_store::KvStore`] on top of the `heed` LMDB bindings. All
//! referral data lives in a single named database inside one environment.

pub mod environment;
pub mod error;
pub mod kv;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use kv::LmdbKvStore;

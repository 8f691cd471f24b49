//! Shared utilities for the referral tooling.

pub mod logging;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};

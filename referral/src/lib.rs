//! Referral keeper for the Axiome chain.
//!
//! Maintains a forest of accounts (each with at most one referrer), keeps
//! per-account activity and stake aggregates up to date as stake changes,
//! promotes and demotes accounts across status tiers, and splits delegation
//! fees among ancestors.
//!
//! Every entry point takes a [`Context`] carrying the transaction's store and
//! block time. Multi-account cascades go through a [`BunchUpdater`], which
//! buffers record writes and fires deduplicated hooks once on commit.

pub mod activity;
pub mod bunch;
pub mod context;
pub mod error;
pub mod fees;
pub mod genesis;
pub mod hooks;
pub mod keeper;
pub mod keys;
pub mod msg;
pub mod params;
pub mod query;
pub mod record;
pub mod relations;
pub mod requirements;
pub mod schedule;
pub mod staking_hooks;
pub mod status;
pub mod store;

pub use activity::{change_team_active, ACTIVATION_THRESHOLD, MAX_DEPTH};
pub use bunch::BunchUpdater;
pub use context::{Context, ReferralNotice};
pub use error::{ReferralError, UpdatePhase};
pub use fees::ReferralFee;
pub use genesis::{Downgrade, GenesisState, RefInfo, Refs};
pub use hooks::{HookRegistry, Listener, ReferralHook};
pub use keeper::{Keeper, StatusReader};
pub use msg::{MsgRegisterReferral, MsgUpdateParams};
pub use params::Params;
pub use query::{QueryError, Querier};
pub use record::{AccountRecord, ActiveAggregations};
pub use requirements::{check_requirements, Criterion, Rule, StatusCheckResult};
pub use staking_hooks::{RefStakingHooks, StakingHooks};
pub use status::Status;

//! Subcommand execution against the on-disk store.
//!
//! Each command runs inside a [`BranchStore`] over the LMDB database: writes
//! reach disk only when the command succeeds, so a failed cascade leaves the
//! store untouched.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use axm_referral::{
    Context, GenesisState, HookRegistry, Keeper, MsgRegisterReferral, Querier, ReferralNotice,
    Status,
};
use axm_store::BranchStore;
use axm_store_lmdb::{LmdbEnvironment, LmdbKvStore};
use axm_types::{AccountId, Timestamp};

use crate::config::DaemonConfig;
use crate::offline::{FixedDenom, OfflineBank, PlainCodec};

pub struct Tool {
    store: LmdbKvStore,
    keeper: Keeper,
    block_time: Timestamp,
}

impl Tool {
    pub fn open(config: &DaemonConfig, block_time: Timestamp) -> Result<Self> {
        let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
            .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
        let authority = AccountId::parse(config.authority.as_str())
            .context("invalid authority in config")?;
        let keeper = Keeper::new(
            Arc::new(OfflineBank),
            Arc::new(FixedDenom(config.bond_denom.clone())),
            Arc::new(PlainCodec::new(config.address_prefix.as_str())),
            authority,
            HookRegistry::new(),
        )
        .with_module_account(config.module_account.as_str());
        Ok(Self {
            store: env.referral_store(),
            keeper,
            block_time,
        })
    }

    /// Run `f` in a branch, persisting its writes only on success.
    fn write<T>(
        &self,
        f: impl FnOnce(&Keeper, &Context<'_>) -> Result<T, axm_referral::ReferralError>,
    ) -> Result<(T, Vec<ReferralNotice>)> {
        let branch = BranchStore::new(&self.store);
        let (out, events) = {
            let ctx = Context::new(&branch, self.block_time);
            let out = f(&self.keeper, &ctx)?;
            (out, ctx.take_events())
        };
        let writes = branch.pending();
        branch.commit().context("persisting changes")?;
        tracing::info!(writes, events = events.len(), "changes committed");
        Ok((out, events))
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&Keeper, &Context<'_>) -> Result<T, axm_referral::ReferralError>,
    ) -> Result<T> {
        let ctx = Context::new(&self.store, self.block_time);
        Ok(f(&self.keeper, &ctx)?)
    }

    pub fn init_genesis(&self, file: &Path) -> Result<()> {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("reading genesis {}", file.display()))?;
        let state: GenesisState = serde_json::from_str(&text).context("parsing genesis")?;
        self.write(|k, ctx| k.init_genesis(ctx, &state))?;
        tracing::info!(file = %file.display(), "genesis imported");
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState> {
        self.read(|k, ctx| k.export_genesis(ctx))
    }

    pub fn show(&self, account: &str) -> Result<impl Serialize> {
        let ctx = Context::new(&self.store, self.block_time);
        Ok(Querier::new(&self.keeper).get(&ctx, account)?)
    }

    pub fn children(&self, account: &str) -> Result<Vec<AccountId>> {
        let ctx = Context::new(&self.store, self.block_time);
        Ok(Querier::new(&self.keeper).children(&ctx, account)?)
    }

    pub fn check_status(&self, account: &str, status: Status) -> Result<impl Serialize> {
        let ctx = Context::new(&self.store, self.block_time);
        Ok(Querier::new(&self.keeper).check_status(&ctx, account, status)?)
    }

    pub fn fees(&self, account: &str) -> Result<impl Serialize> {
        let acc = self.keeper.parse_address(account)?;
        let (fees, burn) = self.read(|k, ctx| k.get_referral_fees_for_delegating(ctx, &acc))?;
        Ok(serde_json::json!({ "fees": fees, "burn": burn }))
    }

    pub fn register(&self, referrer: &str, referral: &str) -> Result<Vec<ReferralNotice>> {
        let msg = MsgRegisterReferral {
            referrer: referrer.to_string(),
            referral: referral.to_string(),
        };
        Ok(self.write(|k, ctx| k.register_referral(ctx, &msg))?.1)
    }

    pub fn stake(&self, account: &str, delta: i128) -> Result<Vec<ReferralNotice>> {
        let acc = self.keeper.parse_address(account)?;
        Ok(self.write(|k, ctx| k.on_balance_changed(ctx, &acc, delta))?.1)
    }

    pub fn begin_block(&self) -> Result<Vec<ReferralNotice>> {
        Ok(self.write(|k, ctx| k.begin_block(ctx))?.1)
    }

    pub fn downgrades(&self) -> Result<Vec<(Timestamp, AccountId)>> {
        self.read(|k, ctx| k.scheduled_downgrades(ctx))
    }
}

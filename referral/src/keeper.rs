//! The referral keeper and its collaborators.

use std::sync::Arc;

use axm_types::{AccountId, AddressCodec, BankKeeper, StakingKeeper};

use crate::{check_requirements, Context, HookRegistry, ReferralError, Status, StatusCheckResult};

/// Name of the module account used to burn the unassigned fee share.
pub const DEFAULT_MODULE_ACCOUNT: &str = "referral";

/// Entry point of the referral module.
///
/// Holds only collaborators and configuration. All state lives in the
/// store handed in through each call's [`Context`].
pub struct Keeper {
    pub(crate) bank: Arc<dyn BankKeeper>,
    pub(crate) staking: Arc<dyn StakingKeeper>,
    pub(crate) codec: Arc<dyn AddressCodec>,
    pub(crate) hooks: HookRegistry,
    pub(crate) authority: AccountId,
    pub(crate) module_account: String,
}

impl Keeper {
    pub fn new(
        bank: Arc<dyn BankKeeper>,
        staking: Arc<dyn StakingKeeper>,
        codec: Arc<dyn AddressCodec>,
        authority: AccountId,
        hooks: HookRegistry,
    ) -> Self {
        Self {
            bank,
            staking,
            codec,
            hooks,
            authority,
            module_account: DEFAULT_MODULE_ACCOUNT.to_string(),
        }
    }

    pub fn with_module_account(mut self, name: impl Into<String>) -> Self {
        self.module_account = name.into();
        self
    }

    pub fn authority(&self) -> &AccountId {
        &self.authority
    }

    pub fn module_account(&self) -> &str {
        &self.module_account
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Decode and validate an address coming from outside (messages,
    /// genesis). The codec decides what a well-formed address is.
    pub fn parse_address(&self, raw: &str) -> Result<AccountId, ReferralError> {
        self.codec
            .string_to_bytes(raw)
            .map_err(|e| ReferralError::InvalidAddress(format!("{raw}: {e}")))?;
        Ok(AccountId::parse(raw)?)
    }

    /// Stake delegated in `acc`'s whole network, its own included.
    pub fn get_delegated_in_network(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
    ) -> Result<u128, ReferralError> {
        let record = self.get(ctx, acc)?;
        record
            .team_delegated
            .checked_add(record.self_delegated)
            .ok_or(ReferralError::Overflow("delegated in network"))
    }

    /// Evaluate `status` against `acc` without changing anything.
    pub fn check_status_requirements(
        &self,
        ctx: &Context<'_>,
        acc: &AccountId,
        status: Status,
    ) -> Result<StatusCheckResult, ReferralError> {
        if status < Status::MIN || status > Status::MAX {
            return Err(ReferralError::InvalidStatus(status.as_u8()));
        }
        let record = self.get(ctx, acc)?;
        Ok(check_requirements(status, &record))
    }
}

/// Read-only view of referral status for the voting module.
pub trait StatusReader {
    fn status(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<Status, ReferralError>;
    fn exists(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<bool, ReferralError>;
}

impl StatusReader for Keeper {
    fn status(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<Status, ReferralError> {
        self.get_status(ctx, acc)
    }

    fn exists(&self, ctx: &Context<'_>, acc: &AccountId) -> Result<bool, ReferralError> {
        Keeper::exists(self, ctx, acc)
    }
}

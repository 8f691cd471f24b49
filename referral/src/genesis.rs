//! Genesis import and export.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use axm_types::{AccountId, Timestamp};

use crate::keys::{self, MARKER};
use crate::{AccountRecord, BunchUpdater, Context, Keeper, Params, ReferralError, Status};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefInfo {
    pub address: String,
    pub status: Status,
}

/// One referrer and its direct referrals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refs {
    pub referrer: String,
    pub referrals: Vec<RefInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downgrade {
    pub account: String,
    pub current: Status,
    pub time: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    /// `None` is an invalid genesis; an empty list is a valid empty forest.
    pub top_level_accounts: Option<Vec<RefInfo>>,
    #[serde(default)]
    pub other_accounts: Vec<Refs>,
    #[serde(default)]
    pub downgrades: Vec<Downgrade>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: Params::default(),
            top_level_accounts: Some(Vec::new()),
            other_accounts: Vec::new(),
            downgrades: Vec::new(),
        }
    }
}

impl GenesisState {
    /// Structural checks that need no store: params valid, top-level list
    /// present, every referrer declared before its referrals, no account
    /// declared twice.
    pub fn validate(&self) -> Result<(), ReferralError> {
        let top = self
            .top_level_accounts
            .as_ref()
            .ok_or_else(|| ReferralError::InvalidParams("empty top level accounts set".into()))?;
        self.params.validate()?;

        let mut seen = BTreeSet::new();
        for info in top {
            if !seen.insert(info.address.as_str()) {
                return Err(ReferralError::AlreadyExists(AccountId::parse(info.address.as_str())?));
            }
        }
        for group in &self.other_accounts {
            if group.referrer.is_empty() {
                return Err(ReferralError::InvalidParent);
            }
            if !seen.contains(group.referrer.as_str()) {
                return Err(ReferralError::ParentNotFound(AccountId::parse(
                    group.referrer.as_str(),
                )?));
            }
            for info in &group.referrals {
                if !seen.insert(info.address.as_str()) {
                    return Err(ReferralError::AlreadyExists(AccountId::parse(
                        info.address.as_str(),
                    )?));
                }
            }
        }
        for d in &self.downgrades {
            if !seen.contains(d.account.as_str()) {
                return Err(ReferralError::NotFound(AccountId::parse(d.account.as_str())?));
            }
        }
        Ok(())
    }
}

impl Keeper {
    pub fn init_genesis(&self, ctx: &Context<'_>, state: &GenesisState) -> Result<(), ReferralError> {
        state.validate()?;
        self.set_params(ctx, &state.params)?;
        self.import_from_genesis(
            ctx,
            state.top_level_accounts.as_deref().unwrap_or_default(),
            &state.other_accounts,
            &state.downgrades,
        )
    }

    /// Rebuild the forest. Statuses are taken from the file and no
    /// activity or status cascade runs for the imported accounts.
    pub fn import_from_genesis(
        &self,
        ctx: &Context<'_>,
        top_level: &[RefInfo],
        other_accounts: &[Refs],
        downgrades: &[Downgrade],
    ) -> Result<(), ReferralError> {
        tracing::info!(count = top_level.len(), "importing top level accounts");
        for top in top_level {
            let acc = self.parse_address(&top.address)?;
            self.add_top_level_account(ctx, &acc, top.status)?;
            tracing::debug!(account = %acc, "account added");
        }

        tracing::info!(groups = other_accounts.len(), "importing other accounts");
        for group in other_accounts {
            if group.referrer.is_empty() {
                return Err(ReferralError::InvalidParent);
            }
            let parent = self.parse_address(&group.referrer)?;
            for info in &group.referrals {
                let acc = self.parse_address(&info.address)?;
                self.insert_imported_child(ctx, &parent, &acc, info.status)?;
                tracing::debug!(account = %acc, %parent, "account added");
            }
        }

        tracing::info!(count = downgrades.len(), "importing status downgrades");
        let mut bu = BunchUpdater::new(self, ctx);
        for d in downgrades {
            let acc = self.parse_address(&d.account)?;
            bu.update(&acc, false, |rec| {
                tracing::debug!(account = %acc, from = %d.current, to = %rec.status, "status downgrade");
                if let Some(previous) = rec.status_downgrade_at {
                    self.remove_status_downgrade_schedule(ctx, &acc, previous)?;
                }
                rec.status_downgrade_at = Some(d.time);
                self.schedule_status_downgrade(ctx, &acc, d.time)
            })?;
        }
        tracing::info!("persisting genesis");
        bu.commit()
    }

    /// Plain insert of an imported child: record plus relation, no status
    /// checks on ancestors. Stakes arrive later through the staking hooks.
    fn insert_imported_child(
        &self,
        ctx: &Context<'_>,
        parent: &AccountId,
        child: &AccountId,
        status: Status,
    ) -> Result<(), ReferralError> {
        if self.exists(ctx, child)? {
            return Err(ReferralError::AlreadyExists(child.clone()));
        }
        if !self.exists(ctx, parent)? {
            return Err(ReferralError::ParentNotFound(parent.clone()));
        }
        let mut bu = BunchUpdater::new(self, ctx);
        bu.set(child, AccountRecord::new(Some(parent.clone()), status));
        ctx.store().set(&keys::relation_key(parent, child), MARKER)?;
        bu.commit()
    }

    /// Breadth-first dump: top-level accounts, then `(parent, children)`
    /// groups level by level, plus every pending downgrade.
    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<GenesisState, ReferralError> {
        let params = self.params(ctx)?;
        let mut top_level = Vec::new();
        let mut other = Vec::new();
        let mut downgrades = Vec::new();

        let mut level = Vec::new();
        for acc in self.get_top_level_accounts(ctx)? {
            let record = self.get(ctx, &acc)?;
            top_level.push(RefInfo {
                address: acc.to_string(),
                status: record.status,
            });
            level.push((acc, record));
        }

        while !level.is_empty() {
            let mut next = Vec::new();
            for (acc, record) in level {
                if let Some(time) = record.status_downgrade_at {
                    downgrades.push(Downgrade {
                        account: acc.to_string(),
                        current: record.status,
                        time,
                    });
                }
                let children = self.get_children(ctx, &acc)?;
                if children.is_empty() {
                    continue;
                }
                let mut referrals = Vec::with_capacity(children.len());
                for child in children {
                    let child_record = self.get(ctx, &child)?;
                    referrals.push(RefInfo {
                        address: child.to_string(),
                        status: child_record.status,
                    });
                    next.push((child, child_record));
                }
                other.push(Refs {
                    referrer: acc.to_string(),
                    referrals,
                });
            }
            level = next;
        }

        Ok(GenesisState {
            params,
            top_level_accounts: Some(top_level),
            other_accounts: other,
            downgrades,
        })
    }
}

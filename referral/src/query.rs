//! Read-only query surface.
//!
//! Requests carry raw address strings; failures collapse into
//! [`QueryError`] the way the host's query layer reports them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use axm_types::AccountId;

use crate::{AccountRecord, Context, Keeper, Params, ReferralError, Status, StatusCheckResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ReferralError> for QueryError {
    fn from(e: ReferralError) -> Self {
        match e.root_cause() {
            ReferralError::NotFound(_) | ReferralError::ParentNotFound(_) => {
                QueryError::NotFound(e.to_string())
            }
            ReferralError::InvalidAddress(_)
            | ReferralError::InvalidStatus(_)
            | ReferralError::InvalidParent => QueryError::InvalidArgument(e.to_string()),
            _ => QueryError::Internal(e.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinsResponse {
    pub delegated: u128,
}

pub struct Querier<'k> {
    keeper: &'k Keeper,
}

impl<'k> Querier<'k> {
    pub fn new(keeper: &'k Keeper) -> Self {
        Self { keeper }
    }

    /// Addresses go through the keeper's codec, like messages do.
    fn account(&self, raw: &str) -> Result<AccountId, QueryError> {
        self.keeper
            .parse_address(raw)
            .map_err(|e| QueryError::InvalidArgument(e.to_string()))
    }

    pub fn exists(&self, ctx: &Context<'_>, acc: &str) -> Result<bool, QueryError> {
        match self.account(acc) {
            Ok(acc) => Ok(self.keeper.exists(ctx, &acc)?),
            Err(_) => Ok(false),
        }
    }

    /// Direct referrals. An empty address yields an empty list.
    pub fn children(&self, ctx: &Context<'_>, acc: &str) -> Result<Vec<AccountId>, QueryError> {
        if acc.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.keeper.get_children(ctx, &self.account(acc)?)?)
    }

    pub fn get(&self, ctx: &Context<'_>, acc: &str) -> Result<AccountRecord, QueryError> {
        Ok(self.keeper.get(ctx, &self.account(acc)?)?)
    }

    pub fn coins(&self, ctx: &Context<'_>, acc: &str) -> Result<CoinsResponse, QueryError> {
        let delegated = self.keeper.get_delegated_in_network(ctx, &self.account(acc)?)?;
        Ok(CoinsResponse { delegated })
    }

    pub fn check_status(
        &self,
        ctx: &Context<'_>,
        acc: &str,
        status: Status,
    ) -> Result<StatusCheckResult, QueryError> {
        Ok(self
            .keeper
            .check_status_requirements(ctx, &self.account(acc)?, status)?)
    }

    pub fn params(&self, ctx: &Context<'_>) -> Result<Params, QueryError> {
        Ok(self.keeper.params(ctx)?)
    }

    pub fn status(&self, ctx: &Context<'_>, acc: &str) -> Result<Status, QueryError> {
        Ok(self.keeper.get_status(ctx, &self.account(acc)?)?)
    }

    pub fn parent(&self, ctx: &Context<'_>, acc: &str) -> Result<Option<AccountId>, QueryError> {
        Ok(self.keeper.get_parent(ctx, &self.account(acc)?)?)
    }
}

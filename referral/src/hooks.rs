//! Listeners fired after a bunch commit.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use axm_types::AccountId;

use crate::{Context, ReferralError};

/// Events other modules can subscribe to. Ordered by their wire names so
/// that callback dispatch order is stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReferralHook {
    StakeChanged,
    StatusUpdated,
}

impl ReferralHook {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StakeChanged => "stake-changed",
            Self::StatusUpdated => "status-updated",
        }
    }
}

impl fmt::Display for ReferralHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Listener = Box<dyn Fn(&Context<'_>, &AccountId) -> Result<(), ReferralError> + Send + Sync>;

/// Listeners by event, fixed once the keeper is built.
#[derive(Default)]
pub struct HookRegistry {
    listeners: BTreeMap<ReferralHook, Vec<Listener>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, hook: ReferralHook, listener: F) -> Self
    where
        F: Fn(&Context<'_>, &AccountId) -> Result<(), ReferralError> + Send + Sync + 'static,
    {
        self.listeners.entry(hook).or_default().push(Box::new(listener));
        self
    }

    pub fn len(&self, hook: ReferralHook) -> usize {
        self.listeners.get(&hook).map_or(0, Vec::len)
    }

    /// Run every listener of `hook` in registration order, stopping at the
    /// first failure.
    pub fn dispatch(
        &self,
        hook: ReferralHook,
        ctx: &Context<'_>,
        acc: &AccountId,
    ) -> Result<(), ReferralError> {
        let Some(listeners) = self.listeners.get(&hook) else {
            return Ok(());
        };
        for listener in listeners {
            listener(ctx, acc)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<ReferralHook, usize> =
            self.listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("HookRegistry").field("listeners", &counts).finish()
    }
}

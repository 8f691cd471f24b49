//! Per-transaction execution context.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use axm_store::KvStore;
use axm_types::{AccountId, Coin, Timestamp};

use crate::Status;

/// Typed events emitted by the keeper, in emission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferralNotice {
    StatusWillBeDowngraded {
        account: AccountId,
        at: Timestamp,
    },
    StatusDowngradeCanceled {
        account: AccountId,
    },
    StatusUpdated {
        account: AccountId,
        before: Status,
        after: Status,
    },
    ReferralFeePaid {
        from: AccountId,
        to: AccountId,
        amount: Coin,
    },
}

/// The store branch, block time and event sink of one host transaction.
///
/// The host owns rollback: it hands in a branch of its state and discards
/// it (together with the collected events) when the transaction fails.
pub struct Context<'a> {
    store: &'a dyn KvStore,
    block_time: Timestamp,
    events: RefCell<Vec<ReferralNotice>>,
}

impl<'a> Context<'a> {
    pub fn new(store: &'a dyn KvStore, block_time: Timestamp) -> Self {
        Self {
            store,
            block_time,
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &'a dyn KvStore {
        self.store
    }

    pub fn block_time(&self) -> Timestamp {
        self.block_time
    }

    pub fn emit(&self, notice: ReferralNotice) {
        self.events.borrow_mut().push(notice);
    }

    /// Snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<ReferralNotice> {
        self.events.borrow().clone()
    }

    pub fn take_events(&self) -> Vec<ReferralNotice> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use axm_nullables::{NullAddressCodec, NullBank, NullClock, NullStaking};
use axm_referral::{AccountRecord, Context, HookRegistry, Keeper};
use axm_store::{KvStore, MemStore};
use axm_types::AccountId;

pub const DENOM: &str = "uaxm";
pub const ONE_ACTIVE_STAKE: i128 = 100_000_000;

pub fn acc(s: &str) -> AccountId {
    AccountId::parse(s).unwrap()
}

pub struct Harness<S: KvStore = MemStore> {
    pub store: S,
    pub keeper: Keeper,
    pub bank: Arc<NullBank>,
    pub clock: NullClock,
}

impl Harness<MemStore> {
    pub fn new() -> Self {
        Self::with_store(MemStore::new(), HookRegistry::new())
    }

    pub fn with_hooks(hooks: HookRegistry) -> Self {
        Self::with_store(MemStore::new(), hooks)
    }
}

impl<S: KvStore> Harness<S> {
    pub fn with_store(store: S, hooks: HookRegistry) -> Self {
        let bank = Arc::new(NullBank::new());
        let keeper = Keeper::new(
            bank.clone(),
            Arc::new(NullStaking::new(DENOM)),
            Arc::new(NullAddressCodec::new()),
            acc("axm1gov"),
            hooks,
        );
        Self {
            store,
            keeper,
            bank,
            clock: NullClock::new(1_000),
        }
    }

    pub fn ctx(&self) -> Context<'_> {
        Context::new(&self.store, self.clock.now())
    }

    pub fn root(&self, name: &str) {
        self.keeper
            .add_top_level_account(&self.ctx(), &acc(name), axm_referral::Status::New)
            .unwrap();
    }

    pub fn child(&self, parent: &str, name: &str) {
        self.keeper
            .append_child(&self.ctx(), &acc(parent), &acc(name))
            .unwrap();
    }

    /// Root followed by a chain of children: `names[i + 1]` under `names[i]`.
    pub fn chain(&self, names: &[String]) {
        self.root(&names[0]);
        for pair in names.windows(2) {
            self.child(&pair[0], &pair[1]);
        }
    }

    pub fn stake(&self, name: &str, delta: i128) {
        self.keeper
            .on_balance_changed(&self.ctx(), &acc(name), delta)
            .unwrap();
    }

    pub fn record(&self, name: &str) -> AccountRecord {
        self.keeper.get(&self.ctx(), &acc(name)).unwrap()
    }
}

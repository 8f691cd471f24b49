//! Nullable bank: record fund movements without moving anything.

use axm_types::{BankKeeper, Coin, CollaboratorError, Input, Output};
use std::sync::Mutex;

/// One call received by [`NullBank`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BankCall {
    SendToModule {
        sender: Vec<u8>,
        module: String,
        coins: Vec<Coin>,
    },
    Burn {
        module: String,
        coins: Vec<Coin>,
    },
    InputOutput {
        input: Input,
        outputs: Vec<Output>,
    },
}

/// A bank that records every call. Optionally fails all of them.
pub struct NullBank {
    calls: Mutex<Vec<BankCall>>,
    fail_with: Mutex<Option<String>>,
}

impl NullBank {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Make every subsequent call fail with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.fail_with.lock().unwrap() = Some(reason.into());
    }

    /// Get all recorded calls (for assertions).
    pub fn calls(&self) -> Vec<BankCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Total amount burned across all calls.
    pub fn burned(&self) -> u128 {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                BankCall::Burn { coins, .. } => Some(coins.iter().map(|c| c.amount).sum::<u128>()),
                _ => None,
            })
            .sum()
    }

    fn record(&self, call: BankCall) -> Result<(), CollaboratorError> {
        if let Some(reason) = self.fail_with.lock().unwrap().clone() {
            return Err(CollaboratorError(reason));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl Default for NullBank {
    fn default() -> Self {
        Self::new()
    }
}

impl BankKeeper for NullBank {
    fn send_coins_from_account_to_module(
        &self,
        sender: &[u8],
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        self.record(BankCall::SendToModule {
            sender: sender.to_vec(),
            module: module.to_string(),
            coins: coins.to_vec(),
        })
    }

    fn burn_coins(&self, module: &str, coins: &[Coin]) -> Result<(), CollaboratorError> {
        self.record(BankCall::Burn {
            module: module.to_string(),
            coins: coins.to_vec(),
        })
    }

    fn input_output_coins(&self, input: &Input, outputs: &[Output]) -> Result<(), CollaboratorError> {
        self.record(BankCall::InputOutput {
            input: input.clone(),
            outputs: outputs.to_vec(),
        })
    }
}

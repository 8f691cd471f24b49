//! Collaborators for running the keeper outside a chain.
//!
//! There is no bank to move funds with, so every transfer is refused.
//! Addresses are taken as plain strings, optionally with a required prefix.

use axm_types::{AddressCodec, BankKeeper, Coin, CollaboratorError, Input, Output, StakingKeeper};

pub struct OfflineBank;

impl OfflineBank {
    fn refuse(what: &str) -> CollaboratorError {
        CollaboratorError(format!("{what}: no bank available in offline mode"))
    }
}

impl BankKeeper for OfflineBank {
    fn send_coins_from_account_to_module(
        &self,
        _sender: &[u8],
        _module: &str,
        _coins: &[Coin],
    ) -> Result<(), CollaboratorError> {
        Err(Self::refuse("send to module"))
    }

    fn burn_coins(&self, _module: &str, _coins: &[Coin]) -> Result<(), CollaboratorError> {
        Err(Self::refuse("burn"))
    }

    fn input_output_coins(&self, _input: &Input, _outputs: &[Output]) -> Result<(), CollaboratorError> {
        Err(Self::refuse("multi-send"))
    }
}

pub struct FixedDenom(pub String);

impl StakingKeeper for FixedDenom {
    fn bond_denom(&self) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}

/// UTF-8 address codec; an empty prefix accepts anything non-empty.
pub struct PlainCodec {
    prefix: String,
}

impl PlainCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl AddressCodec for PlainCodec {
    fn string_to_bytes(&self, text: &str) -> Result<Vec<u8>, CollaboratorError> {
        if text.is_empty() {
            return Err(CollaboratorError("empty address string is not allowed".into()));
        }
        if !text.starts_with(self.prefix.as_str()) || text.len() == self.prefix.len() {
            return Err(CollaboratorError(format!(
                "address {text:?} does not carry prefix {:?}",
                self.prefix
            )));
        }
        Ok(text.as_bytes().to_vec())
    }

    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String, CollaboratorError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| CollaboratorError(e.to_string()))
    }
}

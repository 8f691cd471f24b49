//! Narrow interfaces of the chain modules the referral engine talks to.
//!
//! The bank, staking and address-codec modules live outside this workspace.
//! The engine depends only on these traits; tests plug in the nullables.

use thiserror::Error;

use crate::Coin;

/// Failure reported by a collaborating module.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

/// Source side of a batched transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    pub address: Vec<u8>,
    pub coins: Vec<Coin>,
}

/// Destination side of a batched transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    pub address: Vec<u8>,
    pub coins: Vec<Coin>,
}

/// Fund movements the engine needs from the bank module.
pub trait BankKeeper: Send + Sync {
    fn send_coins_from_account_to_module(
        &self,
        sender: &[u8],
        module: &str,
        coins: &[Coin],
    ) -> Result<(), CollaboratorError>;

    fn burn_coins(&self, module: &str, coins: &[Coin]) -> Result<(), CollaboratorError>;

    /// One input funding many outputs, applied atomically by the bank.
    fn input_output_coins(&self, input: &Input, outputs: &[Output]) -> Result<(), CollaboratorError>;
}

/// Staking lookups.
pub trait StakingKeeper: Send + Sync {
    fn bond_denom(&self) -> Result<String, CollaboratorError>;
}

/// String <-> bytes conversion of account addresses.
pub trait AddressCodec: Send + Sync {
    fn string_to_bytes(&self, text: &str) -> Result<Vec<u8>, CollaboratorError>;
    fn bytes_to_string(&self, bytes: &[u8]) -> Result<String, CollaboratorError>;
}

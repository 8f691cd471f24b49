use std::fmt;

use thiserror::Error;

use axm_store::StoreError;
use axm_types::{AccountId, CollaboratorError, TypesError};

use crate::ReferralHook;

/// Step of a buffered update at which a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdatePhase {
    Load,
    Mutate,
    StatusCheck,
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Load => "load",
            Self::Mutate => "mutate",
            Self::StatusCheck => "status check",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("account {0} is out of the referral structure")]
    NotFound(AccountId),

    #[error("account {0} already exists")]
    AlreadyExists(AccountId),

    #[error("referrer cannot be empty")]
    InvalidParent,

    #[error("referrer {0} does not exist")]
    ParentNotFound(AccountId),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("there is no such status: {0}")]
    InvalidStatus(u8),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid authority: expected {expected}, got {got}")]
    Unauthorized { expected: String, got: String },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("record codec error: {0}")]
    Codec(String),

    #[error("bank error: {0}")]
    Bank(#[source] CollaboratorError),

    #[error("hook failed: {0}")]
    Hook(String),

    /// Metering limit hit. Never wrapped; aborts the whole transaction.
    #[error("resource limit exhausted: {0}")]
    ResourceExhausted(String),

    #[error("cannot update {account} ({phase})")]
    Update {
        account: AccountId,
        phase: UpdatePhase,
        #[source]
        source: Box<ReferralError>,
    },

    #[error("{event} callback failed for {account}")]
    Callback {
        event: ReferralHook,
        account: AccountId,
        #[source]
        source: Box<ReferralError>,
    },

    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl ReferralError {
    /// Whether the error must propagate without wrapping.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }

    /// Innermost error of an `Update` / `Callback` chain.
    pub fn root_cause(&self) -> &ReferralError {
        match self {
            Self::Update { source, .. } | Self::Callback { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn wrap_update(self, account: &AccountId, phase: UpdatePhase) -> Self {
        if self.is_fatal() {
            return self;
        }
        Self::Update {
            account: account.clone(),
            phase,
            source: Box::new(self),
        }
    }
}

impl From<StoreError> for ReferralError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ResourceExhausted(msg) => Self::ResourceExhausted(msg),
            other => Self::Store(other),
        }
    }
}

impl From<TypesError> for ReferralError {
    fn from(e: TypesError) -> Self {
        Self::InvalidAddress(e.to_string())
    }
}

impl From<bincode::Error> for ReferralError {
    fn from(e: bincode::Error) -> Self {
        Self::Codec(e.to_string())
    }
}

//! Account identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A chain account identifier in its string form (e.g. `axm1...`).
///
/// The binary address format is owned by the chain's address codec; the
/// referral engine only ever stores and compares the string form. Identifiers
/// are non-empty and at most [`AccountId::MAX_LEN`] bytes so that they can be
/// length-prefixed with a single byte inside composite store keys.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Longest identifier that still fits a one-byte length prefix.
    pub const MAX_LEN: usize = u8::MAX as usize;

    /// Validate and wrap a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TypesError::InvalidAccountId("empty account id".into()));
        }
        if s.len() > Self::MAX_LEN {
            return Err(TypesError::InvalidAccountId(format!(
                "account id is {} bytes long, at most {} allowed",
                s.len(),
                Self::MAX_LEN
            )));
        }
        Ok(Self(s))
    }

    /// Decode an identifier from the raw bytes of a store key.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| TypesError::InvalidAccountId(format!("not utf-8: {e}")))?;
        Self::parse(s)
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: empty identifiers are rejected by [`AccountId::parse`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Store key layout.
//!
//! - `0x00 || account`: [`AccountRecord`](crate::AccountRecord)
//! - `0x01 || len(parent) || parent || len(child) || child`: relation marker
//! - `0x02`: module params
//! - `0x05 || be_u64(time) || account`: status downgrade queue entry

use axm_types::{AccountId, Timestamp};

use crate::ReferralError;

pub const RECORD_PREFIX: u8 = 0x00;
pub const RELATION_PREFIX: u8 = 0x01;
pub const PARAMS_KEY: &[u8] = &[0x02];
pub const DOWNGRADE_PREFIX: u8 = 0x05;

/// Value stored under marker keys (relations, queue entries).
pub const MARKER: &[u8] = &[0x01];

pub fn record_key(acc: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + acc.len());
    key.push(RECORD_PREFIX);
    key.extend_from_slice(acc.as_bytes());
    key
}

pub fn parse_record_key(key: &[u8]) -> Result<AccountId, ReferralError> {
    match key.split_first() {
        Some((&RECORD_PREFIX, rest)) if !rest.is_empty() => AccountId::from_key_bytes(rest)
            .map_err(|e| ReferralError::Codec(format!("record key: {e}"))),
        _ => Err(ReferralError::Codec(format!("not a record key: {key:x?}"))),
    }
}

fn push_length_prefixed(key: &mut Vec<u8>, acc: &AccountId) {
    // AccountId is at most 255 bytes
    key.push(acc.len() as u8);
    key.extend_from_slice(acc.as_bytes());
}

/// Prefix under which all relations of `parent` live.
pub fn children_prefix(parent: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 + parent.len());
    key.push(RELATION_PREFIX);
    push_length_prefixed(&mut key, parent);
    key
}

pub fn relation_key(parent: &AccountId, child: &AccountId) -> Vec<u8> {
    let mut key = children_prefix(parent);
    push_length_prefixed(&mut key, child);
    key
}

/// Split a relation key into `(parent, child)`.
pub fn parse_relation_key(key: &[u8]) -> Result<(AccountId, AccountId), ReferralError> {
    let bad = |what: &str| ReferralError::Codec(format!("relation key {key:x?}: {what}"));

    let rest = match key.split_first() {
        Some((&RELATION_PREFIX, rest)) => rest,
        _ => return Err(bad("invalid prefix")),
    };
    let (&parent_len, rest) = rest.split_first().ok_or_else(|| bad("no parent length"))?;
    if rest.len() < parent_len as usize {
        return Err(bad("truncated parent"));
    }
    let (parent, rest) = rest.split_at(parent_len as usize);
    let (&child_len, child) = rest.split_first().ok_or_else(|| bad("no child length"))?;
    if child.len() != child_len as usize {
        return Err(bad("child length mismatch"));
    }
    let parent = AccountId::from_key_bytes(parent).map_err(|e| bad(&e.to_string()))?;
    let child = AccountId::from_key_bytes(child).map_err(|e| bad(&e.to_string()))?;
    Ok((parent, child))
}

pub fn downgrade_key(at: Timestamp, acc: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(9 + acc.len());
    key.push(DOWNGRADE_PREFIX);
    key.extend_from_slice(&at.to_be_bytes());
    key.extend_from_slice(acc.as_bytes());
    key
}

/// Exclusive end of the queue range holding every entry due at `now`.
pub fn downgrade_queue_end(now: Timestamp) -> Vec<u8> {
    match now.checked_add_secs(1) {
        Some(next) => {
            let mut key = Vec::with_capacity(9);
            key.push(DOWNGRADE_PREFIX);
            key.extend_from_slice(&next.to_be_bytes());
            key
        }
        None => vec![DOWNGRADE_PREFIX + 1],
    }
}

pub fn parse_downgrade_key(key: &[u8]) -> Result<(Timestamp, AccountId), ReferralError> {
    if key.len() < 10 || key[0] != DOWNGRADE_PREFIX {
        return Err(ReferralError::Codec(format!("not a downgrade key: {key:x?}")));
    }
    let mut time = [0u8; 8];
    time.copy_from_slice(&key[1..9]);
    let acc = AccountId::from_key_bytes(&key[9..])
        .map_err(|e| ReferralError::Codec(format!("downgrade key: {e}")))?;
    Ok((Timestamp::from_be_bytes(time), acc))
}

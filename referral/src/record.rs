//! Persisted per-account referral record.

use serde::{Deserialize, Serialize};

use axm_types::{AccountId, Timestamp};

use crate::{ReferralError, Status};

/// Number of activity counters: index 0 is the account itself, index `i`
/// counts active descendants at generation `i`.
pub const REF_COUNT_LEVELS: usize = 15;

/// Incrementally maintained structure aggregates used by the status engine.
///
/// `team*` buckets count active first-line referrals by the size class of
/// their own active team.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAggregations {
    pub first_line: i64,
    pub first_line_by3: i64,
    pub team0: i64,
    pub team15: i64,
    pub team50: i64,
    pub team100: i64,
    pub team300: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub status: Status,
    pub referrer: Option<AccountId>,
    pub active: bool,
    pub self_delegated: u128,
    pub team_delegated: u128,
    pub active_ref_counts: Vec<u64>,
    pub active_count: ActiveAggregations,
    pub status_downgrade_at: Option<Timestamp>,
}

impl AccountRecord {
    pub fn new(referrer: Option<AccountId>, status: Status) -> Self {
        Self {
            status,
            referrer,
            active: false,
            self_delegated: 0,
            team_delegated: 0,
            active_ref_counts: vec![0; REF_COUNT_LEVELS],
            active_count: ActiveAggregations::default(),
            status_downgrade_at: None,
        }
    }

    /// Pad the activity counters to the full depth.
    pub fn normalize(&mut self) {
        if self.active_ref_counts.len() < REF_COUNT_LEVELS {
            self.active_ref_counts.resize(REF_COUNT_LEVELS, 0);
        }
    }

    /// Active descendants over generations `from..=to`.
    pub fn active_refs_between(&self, from: usize, to: usize) -> u64 {
        self.active_ref_counts
            .iter()
            .skip(from)
            .take(to.saturating_sub(from) + 1)
            .sum()
    }

    /// Size of the active team: generations 1 through 13.
    pub fn active_team_size(&self) -> u64 {
        self.active_refs_between(1, 13)
    }

    pub fn is_top_level(&self) -> bool {
        self.referrer.is_none()
    }

    pub fn encode(&self) -> Result<Vec<u8>, ReferralError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a stored record. Counters come back normalized.
    pub fn decode(bytes: &[u8]) -> Result<Self, ReferralError> {
        let mut record: Self = bincode::deserialize(bytes)?;
        record.normalize();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_counters_are_padded_on_decode() {
        let mut record = AccountRecord::new(None, Status::New);
        record.active_ref_counts = vec![1, 2];
        let decoded = AccountRecord::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded.active_ref_counts.len(), REF_COUNT_LEVELS);
        assert_eq!(&decoded.active_ref_counts[..3], &[1, 2, 0]);
    }

    #[test]
    fn team_size_skips_self_and_last_generation() {
        let mut record = AccountRecord::new(None, Status::New);
        record.active_ref_counts = vec![1; REF_COUNT_LEVELS];
        assert_eq!(record.active_team_size(), 13);
        assert_eq!(record.active_refs_between(0, 14), 15);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            AccountRecord::decode(&[0xff, 0xff]),
            Err(ReferralError::Codec(_))
        ));
    }
}

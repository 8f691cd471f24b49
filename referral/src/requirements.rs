//! Status requirement engine.
//!
//! Pure evaluation of one tier's requirements against a record, with a
//! per-criterion breakdown. Stake amounts are compared in display units.

use serde::{Deserialize, Serialize};

use axm_types::to_display_units;

use crate::{AccountRecord, Status};

/// Minimum active first-line referrals a referral must have to count towards
/// the "3 by 3" criterion.
pub const GURU_MIN_X_PARAMETER: i64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    SelfStake,
    NCoinsInStructure,
    NReferralsWithXReferralsEach,
    NTeamsOfXPeopleEach,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub rule: Rule,
    pub target_value: u64,
    /// Clamped to `target_value`.
    pub actual_value: u64,
    pub parameter_x: u64,
    pub met: bool,
}

impl Criterion {
    fn at_least(rule: Rule, target: u64, actual: u64, parameter_x: u64) -> Self {
        Self {
            rule,
            target_value: target,
            actual_value: actual.min(target),
            parameter_x,
            met: actual >= target,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheckResult {
    pub overall: bool,
    pub criteria: Vec<Criterion>,
}

impl StatusCheckResult {
    fn passed() -> Self {
        Self {
            overall: true,
            criteria: Vec::new(),
        }
    }

    fn push(&mut self, criterion: Criterion) {
        self.overall &= criterion.met;
        self.criteria.push(criterion);
    }
}

enum Structure {
    None,
    /// `count` first-line referrals, each with at least `size` active
    /// referrals of their own (`size == 0` means just active).
    XByX { count: u64, size: u64 },
    /// Three teams of at least `leg` people plus three-by-three.
    Core { leg: u64 },
}

struct Requirement {
    self_stake: u64,
    team_stake: u64,
    structure: Structure,
}

fn requirement(status: Status) -> Option<Requirement> {
    let (self_stake, team_stake, structure) = match status {
        Status::Unspecified | Status::New => return None,
        Status::Starter => (100, 0, Structure::None),
        Status::Leader => (250, 20_000, Structure::XByX { count: 3, size: 0 }),
        Status::Guru => (600, 50_000, Structure::XByX { count: 3, size: 3 }),
        Status::Boss => (1_500, 150_000, Structure::Core { leg: 15 }),
        Status::Pro => (4_000, 300_000, Structure::Core { leg: 50 }),
        Status::Top => (10_000, 800_000, Structure::Core { leg: 100 }),
        Status::Mega => (30_000, 2_000_000, Structure::Core { leg: 300 }),
    };
    Some(Requirement {
        self_stake,
        team_stake,
        structure,
    })
}

fn non_negative(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

/// Active first-line referrals whose own team is at least `leg` people.
fn teams_of_at_least(record: &AccountRecord, leg: u64) -> u64 {
    let agg = &record.active_count;
    let buckets = [
        (15, agg.team15),
        (50, agg.team50),
        (100, agg.team100),
        (300, agg.team300),
    ];
    buckets
        .iter()
        .filter(|(size, _)| *size >= leg)
        .map(|(_, count)| non_negative(*count))
        .sum()
}

/// Evaluate `status`'s requirements against `record`. The record's own
/// status is irrelevant.
pub fn check_requirements(status: Status, record: &AccountRecord) -> StatusCheckResult {
    let Some(req) = requirement(status) else {
        return StatusCheckResult::passed();
    };
    let mut result = StatusCheckResult::passed();

    if req.team_stake > 0 {
        result.push(Criterion::at_least(
            Rule::NCoinsInStructure,
            req.team_stake,
            to_display_units(record.team_delegated),
            0,
        ));
    }
    if req.self_stake > 0 {
        result.push(Criterion::at_least(
            Rule::SelfStake,
            req.self_stake,
            to_display_units(record.self_delegated),
            0,
        ));
    }

    match req.structure {
        Structure::None => {}
        Structure::XByX { count, size } => {
            let actual = if size == 0 {
                record.active_count.first_line
            } else {
                record.active_count.first_line_by3
            };
            result.push(Criterion::at_least(
                Rule::NReferralsWithXReferralsEach,
                count,
                non_negative(actual),
                size,
            ));
        }
        Structure::Core { leg } => {
            result.push(Criterion::at_least(
                Rule::NTeamsOfXPeopleEach,
                3,
                teams_of_at_least(record, leg),
                leg,
            ));
            result.push(Criterion::at_least(
                Rule::NReferralsWithXReferralsEach,
                3,
                non_negative(record.active_count.first_line_by3),
                GURU_MIN_X_PARAMETER as u64,
            ));
        }
    }
    result
}

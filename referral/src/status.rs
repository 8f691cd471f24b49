//! Status tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ReferralError;

/// Ordinal status tier. `Unspecified` marks an unset value and passes every
/// requirement check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    #[default]
    Unspecified = 0,
    New = 1,
    Starter = 2,
    Leader = 3,
    Guru = 4,
    Boss = 5,
    Pro = 6,
    Top = 7,
    Mega = 8,
}

impl Status {
    pub const MIN: Status = Status::New;
    pub const MAX: Status = Status::Mega;

    pub const ALL: [Status; 8] = [
        Status::New,
        Status::Starter,
        Status::Leader,
        Status::Guru,
        Status::Boss,
        Status::Pro,
        Status::Top,
        Status::Mega,
    ];

    pub fn from_u8(value: u8) -> Result<Self, ReferralError> {
        Ok(match value {
            0 => Self::Unspecified,
            1 => Self::New,
            2 => Self::Starter,
            3 => Self::Leader,
            4 => Self::Guru,
            5 => Self::Boss,
            6 => Self::Pro,
            7 => Self::Top,
            8 => Self::Mega,
            other => return Err(ReferralError::InvalidStatus(other)),
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The tier above, `None` at the top.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Mega => None,
            other => Self::from_u8(other.as_u8() + 1).ok(),
        }
    }

    /// The tier below, never lower than [`Status::MIN`].
    pub fn prev(self) -> Option<Self> {
        match self {
            Self::Unspecified | Self::New => None,
            other => Self::from_u8(other.as_u8() - 1).ok(),
        }
    }

    /// How many ancestor levels of delegation fees this tier collects.
    pub fn lines_opened(self) -> usize {
        match self {
            Self::New => 0,
            Self::Starter => 2,
            Self::Leader => 4,
            Self::Guru => 6,
            Self::Boss => 8,
            Self::Pro => 10,
            Self::Top => 12,
            Self::Mega | Self::Unspecified => 14,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::New => "NEW",
            Self::Starter => "STARTER",
            Self::Leader => "LEADER",
            Self::Guru => "GURU",
            Self::Boss => "BOSS",
            Self::Pro => "PRO",
            Self::Top => "TOP",
            Self::Mega => "MEGA",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Status {
    type Err = ReferralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_u8(n);
        }
        let upper = s.to_ascii_uppercase();
        let name = upper.strip_prefix("STATUS_").unwrap_or(&upper);
        Self::ALL
            .into_iter()
            .find(|st| st.name() == name)
            .ok_or(ReferralError::InvalidStatus(u8::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_step_one_at_a_time() {
        assert_eq!(Status::Unspecified.next(), Some(Status::New));
        assert_eq!(Status::Leader.next(), Some(Status::Guru));
        assert_eq!(Status::Mega.next(), None);
        assert_eq!(Status::Guru.prev(), Some(Status::Leader));
        assert_eq!(Status::New.prev(), None);
    }

    #[test]
    fn lines_opened_grow_by_two() {
        let lines: Vec<usize> = Status::ALL.iter().map(|s| s.lines_opened()).collect();
        assert_eq!(lines, vec![0, 2, 4, 6, 8, 10, 12, 14]);
    }

    #[test]
    fn parse_names_and_numbers() {
        assert_eq!("guru".parse::<Status>().unwrap(), Status::Guru);
        assert_eq!("STATUS_MEGA".parse::<Status>().unwrap(), Status::Mega);
        assert_eq!("3".parse::<Status>().unwrap(), Status::Leader);
        assert!("9".parse::<Status>().is_err());
        assert!("nobody".parse::<Status>().is_err());
    }
}

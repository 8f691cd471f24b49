//! Exact non-negative rational numbers for fee ratios.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::TypesError;

/// A non-negative fraction `num / den`, always kept in lowest terms.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawFraction", into = "RawFraction")]
pub struct Fraction {
    num: u64,
    den: u64,
}

#[derive(Serialize, Deserialize)]
struct RawFraction {
    num: u64,
    den: u64,
}

impl Fraction {
    pub const ZERO: Self = Self { num: 0, den: 1 };
    pub const ONE: Self = Self { num: 1, den: 1 };

    pub fn new(num: u64, den: u64) -> Result<Self, TypesError> {
        if den == 0 {
            return Err(TypesError::InvalidFraction(format!("{num}/0")));
        }
        Ok(Self::reduced(num as u128, den as u128))
    }

    pub fn percent(n: u64) -> Self {
        Self::reduced(n as u128, 100)
    }

    pub fn permille(n: u64) -> Self {
        Self::reduced(n as u128, 1000)
    }

    pub fn numerator(&self) -> u64 {
        self.num
    }

    pub fn denominator(&self) -> u64 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Sum of two fractions, `None` if the reduced result does not fit.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let num = (self.num as u128)
            .checked_mul(other.den as u128)?
            .checked_add((other.num as u128).checked_mul(self.den as u128)?)?;
        let den = (self.den as u128).checked_mul(other.den as u128)?;
        let g = gcd(num, den);
        let (num, den) = (num / g, den / g);
        Some(Self {
            num: u64::try_from(num).ok()?,
            den: u64::try_from(den).ok()?,
        })
    }

    /// `floor(amount * self)` without intermediate overflow for fractions ≤ 1.
    pub fn mul_floor(&self, amount: u128) -> u128 {
        let num = self.num as u128;
        let den = self.den as u128;
        (amount / den) * num + (amount % den) * num / den
    }

    fn reduced(num: u128, den: u128) -> Self {
        let g = gcd(num, den);
        // both parts only ever shrink, so they still fit the u64 they came from
        Self {
            num: (num / g) as u64,
            den: (den / g) as u64,
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    if a == 0 {
        1
    } else {
        a
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as u128 * other.den as u128;
        let rhs = other.num as u128 * self.den as u128;
        lhs.cmp(&rhs)
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl TryFrom<RawFraction> for Fraction {
    type Error = TypesError;

    fn try_from(raw: RawFraction) -> Result<Self, Self::Error> {
        Self::new(raw.num, raw.den)
    }
}

impl From<Fraction> for RawFraction {
    fn from(f: Fraction) -> Self {
        RawFraction {
            num: f.num,
            den: f.den,
        }
    }
}

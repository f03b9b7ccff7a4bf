use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Rational number representation for precise timing
///
/// Cycle positions and event boundaries are always exact fractions, never
/// floats, so that queries agree on cycle boundaries no matter how long a
/// session runs. Fractions are stored reduced, with a positive denominator;
/// arithmetic cross-multiplies through `i128` intermediates, so combining
/// reduced `i64` fractions cannot overflow mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

/// Error parsing a fraction from its textual form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseFractionError {
    #[error("empty fraction literal")]
    Empty,
    #[error("invalid integer component: {0}")]
    InvalidInt(#[from] std::num::ParseIntError),
    #[error("denominator is zero")]
    ZeroDenominator,
}

impl Fraction {
    /// Create a new fraction, reduced to lowest terms
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self::reduced(numerator as i128, denominator as i128)
    }

    /// Create a fraction from a whole number
    pub fn from_int(n: i64) -> Self {
        Fraction {
            numerator: n,
            denominator: 1,
        }
    }

    /// Create a fraction from a float (approximation)
    pub fn from_float(f: f64) -> Self {
        let n = (f * 1_000_000.0).round() as i64;
        Fraction::new(n, 1_000_000)
    }

    /// Convert to float
    pub fn to_float(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Reduce a widened numerator/denominator pair back to canonical form
    fn reduced(num: i128, den: i128) -> Fraction {
        if den == 0 {
            panic!("denominator must be non-zero");
        }
        if num == 0 {
            return Fraction {
                numerator: 0,
                denominator: 1,
            };
        }
        // Euclid on magnitudes; the sign lives on the numerator
        let mut a = num.unsigned_abs();
        let mut b = den.unsigned_abs();
        while b != 0 {
            let r = a % b;
            a = b;
            b = r;
        }
        let divisor = a as i128;
        let sign = if (num < 0) == (den < 0) { 1 } else { -1 };
        Fraction {
            numerator: (sign * num.abs() / divisor) as i64,
            denominator: (den.abs() / divisor) as i64,
        }
    }

    /// Get the reciprocal
    pub fn reciprocal(self) -> Self {
        Fraction::new(self.denominator, self.numerator)
    }

    /// Check if fraction is zero
    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Check if fraction is negative
    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        Fraction {
            numerator: self.numerator.abs(),
            denominator: self.denominator,
        }
    }

    /// Floor, rounding towards negative infinity
    pub fn floor(self) -> Self {
        Fraction::from_int(self.numerator.div_euclid(self.denominator))
    }

    /// Ceiling, rounding towards positive infinity
    pub fn ceil(self) -> Self {
        Fraction::from_int(-((-self.numerator).div_euclid(self.denominator)))
    }

    /// The start of the cycle containing this time, i.e. the greatest
    /// integer at or below it
    pub fn sam(self) -> Self {
        self.floor()
    }

    /// The start of the next cycle
    pub fn next_sam(self) -> Self {
        self.sam() + Fraction::from_int(1)
    }

    /// Position within the current cycle, in `[0, 1)`
    pub fn cycle_pos(self) -> Self {
        self - self.sam()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for Fraction {
    type Err = ParseFractionError;

    /// Parse `"3/4"` or a bare integer like `"2"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseFractionError::Empty);
        }
        match s.split_once('/') {
            Some((num, den)) => {
                let numerator: i64 = num.trim().parse()?;
                let denominator: i64 = den.trim().parse()?;
                if denominator == 0 {
                    return Err(ParseFractionError::ZeroDenominator);
                }
                Ok(Fraction::new(numerator, denominator))
            }
            None => Ok(Fraction::from_int(s.parse()?)),
        }
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction {
            numerator: n,
            denominator: 1,
        }
    }
}

impl From<f64> for Fraction {
    fn from(f: f64) -> Self {
        Fraction::from_float(f)
    }
}

impl From<(i64, i64)> for Fraction {
    fn from(pair: (i64, i64)) -> Self {
        Fraction::new(pair.0, pair.1)
    }
}

impl Add for Fraction {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Fraction::reduced(
            self.numerator as i128 * other.denominator as i128
                + other.numerator as i128 * self.denominator as i128,
            self.denominator as i128 * other.denominator as i128,
        )
    }
}

impl Sub for Fraction {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Fraction::reduced(
            self.numerator as i128 * other.denominator as i128
                - other.numerator as i128 * self.denominator as i128,
            self.denominator as i128 * other.denominator as i128,
        )
    }
}

impl Mul for Fraction {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Fraction::reduced(
            self.numerator as i128 * other.numerator as i128,
            self.denominator as i128 * other.denominator as i128,
        )
    }
}

impl Div for Fraction {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        Fraction::reduced(
            self.numerator as i128 * other.denominator as i128,
            self.denominator as i128 * other.numerator as i128,
        )
    }
}

impl Neg for Fraction {
    type Output = Self;

    fn neg(self) -> Self {
        Fraction {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication keeps order
        let lhs = self.numerator as i128 * other.denominator as i128;
        let rhs = other.numerator as i128 * self.denominator as i128;
        lhs.cmp(&rhs)
    }
}

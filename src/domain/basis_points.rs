//! Basis-point representation for fees and thresholds.

use core::fmt;

use super::{Amount, Rounding};
use crate::error::EngineError;

/// Maximum value that represents 100%.
const MAX_BPS: u32 = 10_000;

/// A percentage expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// All fee and tolerance parameters in the engine use this scale.  Any
/// `u32` value can be constructed, but values above 10 000 are nonsensical
/// as percentages; use [`is_valid_percent`](Self::is_valid_percent) to
/// check, and the config types enforce their own caps on top.
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::BasisPoints;
///
/// let bp = BasisPoints::new(30);
/// assert_eq!(bp.get(), 30);
/// assert!(bp.is_valid_percent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BasisPoints(u32);

impl BasisPoints {
    /// Zero basis points (0%).
    pub const ZERO: Self = Self(0);

    /// 100% expressed in basis points.
    pub const MAX_PERCENT: Self = Self(MAX_BPS);

    /// Creates a new `BasisPoints` from a raw `u32` value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying `u32` value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns `true` if the value is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the value is in the valid percentage range
    /// (`0..=10_000`).
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 <= MAX_BPS
    }

    /// Computes `amount * (self / 10_000)` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Overflow`] if the intermediate multiplication
    /// overflows.
    pub const fn apply(
        &self,
        amount: Amount,
        rounding: Rounding,
    ) -> crate::error::Result<Amount> {
        let bps = self.0 as u128;
        let raw = amount.get();

        let product = match raw.checked_mul(bps) {
            Some(v) => v,
            None => return Err(EngineError::Overflow("basis points apply overflow")),
        };

        let divisor = MAX_BPS as u128;
        let q = product / divisor;
        let r = product % divisor;

        match rounding {
            Rounding::Down => Ok(Amount::new(q)),
            Rounding::Up => {
                if r != 0 {
                    Ok(Amount::new(q + 1))
                } else {
                    Ok(Amount::new(q))
                }
            }
        }
    }

    /// Computes the complement `amount * ((10_000 - self) / 10_000)`,
    /// rounding down.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidParameter`] if `self` exceeds 100%.
    /// - [`EngineError::Overflow`] on intermediate overflow.
    pub const fn apply_complement(&self, amount: Amount) -> crate::error::Result<Amount> {
        if self.0 > MAX_BPS {
            return Err(EngineError::InvalidParameter(
                "basis points above 100 percent",
            ));
        }
        let remainder = Self(MAX_BPS - self.0);
        remainder.apply(amount, Rounding::Down)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

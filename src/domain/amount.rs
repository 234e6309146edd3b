//! Fixed-point token amount with checked arithmetic.

use core::fmt;

use primitive_types::U256;

use super::Rounding;

/// A token amount as an 18-decimal fixed-point integer.
///
/// `Amount` carries no asset identity — [`AssetIndex`](super::AssetIndex)
/// says which of the two pool assets a value belongs to.  All `u128`
/// values are valid amounts; one whole unit is [`Amount::ONE`] (`10^18`).
///
/// Arithmetic methods are checked: they return `None` on overflow,
/// underflow, or division by zero instead of panicking.  Products that can
/// exceed `u128` go through [`mul_div`](Self::mul_div), which widens to
/// 256 bits internally.
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::{Amount, Rounding};
///
/// let a = Amount::new(100);
/// let b = Amount::new(200);
/// assert_eq!(a.checked_add(&b), Some(Amount::new(300)));
/// assert_eq!(a.mul_div(&b, &Amount::new(50), Rounding::Down), Some(Amount::new(400)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// One whole unit at 18 decimals.
    pub const ONE: Self = Self(1_000_000_000_000_000_000);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Creates an `Amount` from a count of whole 18-decimal units.
    ///
    /// Returns `None` if the scaled value overflows `u128`.
    #[must_use]
    pub const fn from_units(units: u128) -> Option<Self> {
        match units.checked_mul(Self::ONE.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating subtraction, flooring at zero.
    pub const fn saturating_sub(&self, other: &Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Checked multiplication. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, other: &Self) -> Option<Self> {
        match self.0.checked_mul(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked division with explicit rounding direction.
    ///
    /// Returns `None` if `divisor` is zero.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        if divisor.0 == 0 {
            return None;
        }
        let q = self.0 / divisor.0;
        let r = self.0 % divisor.0;
        match rounding {
            Rounding::Down => Some(Self(q)),
            Rounding::Up => {
                if r != 0 {
                    // q + 1 cannot overflow: r != 0 implies q < u128::MAX.
                    Some(Self(q + 1))
                } else {
                    Some(Self(q))
                }
            }
        }
    }

    /// Computes `self * mul / div` with a 256-bit intermediate product.
    ///
    /// Returns `None` if `div` is zero or the final quotient does not fit
    /// in `u128`.
    #[must_use]
    pub fn mul_div(&self, mul: &Self, div: &Self, rounding: Rounding) -> Option<Self> {
        if div.0 == 0 {
            return None;
        }
        let product = U256::from(self.0) * U256::from(mul.0);
        let divisor = U256::from(div.0);
        let q = product / divisor;
        let r = product % divisor;
        let q = match rounding {
            Rounding::Down => q,
            Rounding::Up => {
                if r.is_zero() {
                    q
                } else {
                    q + U256::one()
                }
            }
        };
        if q > U256::from(u128::MAX) {
            return None;
        }
        Some(Self(q.as_u128()))
    }

    /// Returns the smaller of two amounts.
    ///
    /// Takes values (the type is `Copy`) so the call shape matches the
    /// derived `Ord::min` and auto-ref cannot pick the wrong receiver.
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Absolute difference between two amounts.
    pub const fn abs_diff(&self, other: &Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Pool share ledger units.

use core::fmt;

use super::{Amount, Rounding};

/// Units of ownership in the pool's share ledger.
///
/// Distinct from [`Amount`] because shares measure a fraction of the pool,
/// not a quantity of either asset.  Share value in asset terms is exposed
/// through the pool's virtual price.  All `u128` values are valid.
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::Shares;
///
/// let a = Shares::new(1_000);
/// let b = Shares::new(2_000);
/// assert_eq!(a.checked_add(&b), Some(Shares::new(3_000)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Shares(u128);

impl Shares {
    /// No shares.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Shares` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if zero.
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

    /// Computes `value * self / total` — this holding's slice of `value`.
    ///
    /// Rounds down (in the pool's favor).  Returns `None` if `total` is
    /// zero or the result overflows.
    #[must_use]
    pub fn pro_rata(&self, value: Amount, total: Shares) -> Option<Amount> {
        value.mul_div(
            &Amount::new(self.0),
            &Amount::new(total.0),
            Rounding::Down,
        )
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

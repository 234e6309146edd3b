//! Optimizer allocation quote.

use core::fmt;

use super::Amount;
use crate::error::EngineError;

/// The split the optimizer recommends for converting a total input amount:
/// part through the pool swap, the rest deposited directly into the yield
/// source.
///
/// Ephemeral — computed per query, never persisted.
///
/// # Invariants
///
/// - `swap_amount + direct_amount` equals the quoted total input.
/// - `expected_total == expected_swap_out + expected_direct_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllocationQuote {
    swap_amount: Amount,
    direct_amount: Amount,
    expected_swap_out: Amount,
    expected_direct_out: Amount,
    expected_total: Amount,
}

impl AllocationQuote {
    /// Creates a new `AllocationQuote` with validated invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvariantViolation`] if the expected outputs
    /// do not sum to `expected_total`.
    pub const fn new(
        swap_amount: Amount,
        direct_amount: Amount,
        expected_swap_out: Amount,
        expected_direct_out: Amount,
    ) -> crate::error::Result<Self> {
        let expected_total = match expected_swap_out.checked_add(&expected_direct_out) {
            Some(v) => v,
            None => {
                return Err(EngineError::Overflow("allocation expected total overflow"));
            }
        };
        Ok(Self {
            swap_amount,
            direct_amount,
            expected_swap_out,
            expected_direct_out,
            expected_total,
        })
    }

    /// Amount routed through the pool swap leg.
    pub const fn swap_amount(&self) -> Amount {
        self.swap_amount
    }

    /// Amount deposited directly into the yield source.
    pub const fn direct_amount(&self) -> Amount {
        self.direct_amount
    }

    /// Expected output of the swap leg.
    pub const fn expected_swap_out(&self) -> Amount {
        self.expected_swap_out
    }

    /// Expected output of the direct-deposit leg.
    pub const fn expected_direct_out(&self) -> Amount {
        self.expected_direct_out
    }

    /// Expected combined output of both legs.
    pub const fn expected_total(&self) -> Amount {
        self.expected_total
    }

    /// Returns `true` if the allocation routes everything through one leg.
    #[must_use]
    pub const fn is_single_leg(&self) -> bool {
        self.swap_amount.is_zero() || self.direct_amount.is_zero()
    }
}

impl fmt::Display for AllocationQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AllocationQuote(swap={}, direct={}, total_out={})",
            self.swap_amount, self.direct_amount, self.expected_total
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum() {
        let Ok(q) = AllocationQuote::new(
            Amount::new(600),
            Amount::new(400),
            Amount::new(590),
            Amount::new(392),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(q.expected_total(), Amount::new(982));
        assert!(!q.is_single_leg());
    }

    #[test]
    fn single_leg_detected() {
        let Ok(q) = AllocationQuote::new(
            Amount::ZERO,
            Amount::new(1_000),
            Amount::ZERO,
            Amount::new(980),
        ) else {
            panic!("expected Ok");
        };
        assert!(q.is_single_leg());
    }

    #[test]
    fn overflow_rejected() {
        let result =
            AllocationQuote::new(Amount::ZERO, Amount::ZERO, Amount::MAX, Amount::MAX);
        assert!(matches!(result, Err(EngineError::Overflow(_))));
    }
}

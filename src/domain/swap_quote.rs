//! Outcome of a swap quote or execution.

use core::fmt;

use super::{Amount, BasisPoints};
use crate::error::EngineError;

/// The priced outcome of exchanging `dx` of one asset for the other.
///
/// Returned both by the read-only preview path and by the executed swap
/// (the executed path additionally mutates pool balances).
///
/// # Invariants
///
/// - `amount_out > 0`.
/// - `fee < amount_out + fee` (the fee was carved out of the gross output).
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::{Amount, BasisPoints, SwapQuote};
///
/// let quote = SwapQuote::new(Amount::new(990), Amount::new(3), BasisPoints::new(10));
/// assert!(quote.is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapQuote {
    amount_out: Amount,
    fee: Amount,
    price_impact: BasisPoints,
}

impl SwapQuote {
    /// Creates a new `SwapQuote` with validated invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if `amount_out` is zero.
    pub const fn new(
        amount_out: Amount,
        fee: Amount,
        price_impact: BasisPoints,
    ) -> crate::error::Result<Self> {
        if amount_out.is_zero() {
            return Err(EngineError::InvalidParameter("amount_out must be positive"));
        }
        Ok(Self {
            amount_out,
            fee,
            price_impact,
        })
    }

    /// Returns the net output amount after fees.
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Returns the fee retained by the pool.
    pub const fn fee(&self) -> Amount {
        self.fee
    }

    /// Returns the deviation of the realized pre-fee rate from the ideal
    /// 1:1 peg rate.
    #[must_use]
    pub const fn price_impact(&self) -> BasisPoints {
        self.price_impact
    }
}

impl fmt::Display for SwapQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapQuote(out={}, fee={}, impact={})",
            self.amount_out, self.fee, self.price_impact
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_quote() {
        let Ok(q) = SwapQuote::new(Amount::new(990), Amount::new(3), BasisPoints::new(10))
        else {
            panic!("expected Ok");
        };
        assert_eq!(q.amount_out(), Amount::new(990));
        assert_eq!(q.fee(), Amount::new(3));
        assert_eq!(q.price_impact(), BasisPoints::new(10));
    }

    #[test]
    fn zero_output_rejected() {
        let result = SwapQuote::new(Amount::ZERO, Amount::ZERO, BasisPoints::ZERO);
        assert!(matches!(result, Err(EngineError::InvalidParameter(_))));
    }

    #[test]
    fn display_format() {
        let Ok(q) = SwapQuote::new(Amount::new(1), Amount::ZERO, BasisPoints::ZERO) else {
            panic!("expected Ok");
        };
        assert!(format!("{q}").contains("SwapQuote"));
    }
}

//! Pool-side seam for recalling lent reserves.

use crate::domain::Amount;
use crate::error::Result;

/// Something the pool can recall lent base-asset reserves from.
///
/// The pool never talks to the vault directly; when a withdrawal or swap
/// needs more liquid base asset than is on hand, it asks its
/// `ReserveSource` for the shortfall.  The source returns the amount it
/// actually delivered, which may be less than requested (a paused or
/// depleted strategy delivers what it can, down to zero).  The *caller*
/// decides whether a partial delivery is tolerable.
pub trait ReserveSource {
    /// Recalls up to `amount` of the base asset; returns the amount
    /// actually delivered.
    ///
    /// # Errors
    ///
    /// Only unrecoverable faults (arithmetic, vault failure).  "Not enough
    /// funds" is expressed through a reduced return value, not an error.
    fn recall(&mut self, amount: Amount) -> Result<Amount>;
}

/// A reserve source with nothing to give.
///
/// Used by pools that have no strategy attached and in tests exercising
/// pure-pool behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReserves;

impl ReserveSource for NoReserves {
    fn recall(&mut self, _amount: Amount) -> Result<Amount> {
        Ok(Amount::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reserves_delivers_nothing() {
        let mut source = NoReserves;
        assert_eq!(source.recall(Amount::new(1_000)), Ok(Amount::ZERO));
    }
}

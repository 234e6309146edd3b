//! External yield-vault interface.

use crate::domain::{Amount, BasisPoints};
use crate::error::Result;

/// The interface of the external yield source the strategy deposits into.
///
/// The vault is owned by an independent actor; only this surface is
/// consumed.  Token custody and the `recipient`/`account` parameters of
/// the on-chain interface belong to the excluded token ledger, so the
/// trait works purely in amounts and shares.
///
/// # Numeric convention
///
/// Assets and [`price_per_share`](Vault::price_per_share) are 18-decimal
/// fixed point; one share is worth `price_per_share / 10^18` assets.
///
/// # Failure semantics
///
/// `withdraw` may return fewer assets than the share value implies (the
/// vault applies its own loss/slippage up to `max_loss`); this propagates
/// as a reduced return value, never as an error.
pub trait Vault {
    /// Deposits `amount` of the underlying asset; returns the shares
    /// minted.
    ///
    /// # Errors
    ///
    /// Implementation-defined; a failing deposit aborts the enclosing
    /// operation.
    fn deposit(&mut self, amount: Amount) -> Result<Amount>;

    /// Burns up to `shares` and returns the assets realized, tolerating a
    /// realization loss of at most `max_loss`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; a realization loss beyond `max_loss` is an
    /// error.
    fn withdraw(&mut self, shares: Amount, max_loss: BasisPoints) -> Result<Amount>;

    /// Current value of one share in underlying-asset terms (`10^18`
    /// scale).
    fn price_per_share(&self) -> Amount;

    /// Converts a share count to its current underlying value, rounding
    /// down.
    fn shares_to_assets(&self, shares: Amount) -> Amount {
        shares
            .mul_div(
                &self.price_per_share(),
                &Amount::ONE,
                crate::domain::Rounding::Down,
            )
            .unwrap_or(Amount::ZERO)
    }

    /// Converts an asset amount to the shares required to realize it,
    /// rounding up so the holder never receives less than requested.
    fn assets_to_shares(&self, assets: Amount) -> Amount {
        let price = self.price_per_share();
        if price.is_zero() {
            return Amount::ZERO;
        }
        assets
            .mul_div(&Amount::ONE, &price, crate::domain::Rounding::Up)
            .unwrap_or(Amount::ZERO)
    }
}

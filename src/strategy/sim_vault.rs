//! In-memory yield vault for simulation and tests.

use crate::domain::{Amount, BasisPoints, Rounding};
use crate::error::{EngineError, Result};
use crate::traits::Vault;

/// A deterministic in-memory [`Vault`] whose share price moves only
/// through explicit [`gain`](Self::gain) and [`slash`](Self::slash)
/// calls.
///
/// Exists to drive the strategy and optimizer without an external yield
/// source: deposit, crank the price, harvest.  Deposits and withdrawals
/// are exact (the simulation applies no realization loss), so
/// `max_loss` is accepted and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimVault {
    assets: Amount,
    shares: Amount,
}

impl SimVault {
    /// Creates an empty vault with a share price of one.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            assets: Amount::ZERO,
            shares: Amount::ZERO,
        }
    }

    /// Returns the total underlying assets held.
    pub const fn total_assets(&self) -> Amount {
        self.assets
    }

    /// Returns the total shares outstanding.
    pub const fn total_shares(&self) -> Amount {
        self.shares
    }

    /// Simulates yield: adds `amount` to the underlying without minting
    /// shares, raising the share price.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Overflow`] if the holding overflows.
    pub fn gain(&mut self, amount: Amount) -> Result<()> {
        self.assets = self
            .assets
            .checked_add(&amount)
            .ok_or(EngineError::Overflow("vault gain"))?;
        Ok(())
    }

    /// Simulates a loss: removes up to `amount` from the underlying,
    /// lowering the share price.
    pub fn slash(&mut self, amount: Amount) {
        self.assets = self.assets.saturating_sub(&amount);
    }
}

impl Vault for SimVault {
    fn deposit(&mut self, amount: Amount) -> Result<Amount> {
        if amount.is_zero() {
            return Ok(Amount::ZERO);
        }
        let minted = if self.shares.is_zero() {
            amount
        } else {
            amount
                .mul_div(&self.shares, &self.assets, Rounding::Down)
                .ok_or(EngineError::DivisionByZero)?
        };
        self.assets = self
            .assets
            .checked_add(&amount)
            .ok_or(EngineError::Overflow("vault deposit"))?;
        self.shares = self
            .shares
            .checked_add(&minted)
            .ok_or(EngineError::Overflow("vault share supply"))?;
        Ok(minted)
    }

    fn withdraw(&mut self, shares: Amount, _max_loss: BasisPoints) -> Result<Amount> {
        let burned = shares.min(self.shares);
        if burned.is_zero() {
            return Ok(Amount::ZERO);
        }
        let out = burned
            .mul_div(&self.assets, &self.shares, Rounding::Down)
            .ok_or(EngineError::DivisionByZero)?;
        self.assets = self.assets.saturating_sub(&out);
        self.shares = self.shares.saturating_sub(&burned);
        Ok(out)
    }

    fn price_per_share(&self) -> Amount {
        if self.shares.is_zero() {
            return Amount::ONE;
        }
        self.assets
            .mul_div(&Amount::ONE, &self.shares, Rounding::Down)
            .unwrap_or(Amount::ZERO)
    }
}

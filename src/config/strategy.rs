//! Configuration for the yield strategy.

use crate::domain::BasisPoints;
use crate::error::EngineError;

/// Cap on the performance fee (50%).
const MAX_PERFORMANCE_FEE_BPS: u32 = 5_000;

/// Configuration for a [`YieldStrategy`](crate::strategy::YieldStrategy).
///
/// # Validation
///
/// - `performance_fee` at most 5 000 bp (50%).
/// - `max_withdraw_loss` a valid percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StrategyConfig {
    performance_fee: BasisPoints,
    max_withdraw_loss: BasisPoints,
}

impl StrategyConfig {
    /// Creates a new `StrategyConfig`.
    ///
    /// `max_withdraw_loss` is forwarded to the vault on every withdrawal
    /// as the tolerated realization loss.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if a fee violates its cap.
    pub fn new(
        performance_fee: BasisPoints,
        max_withdraw_loss: BasisPoints,
    ) -> crate::error::Result<Self> {
        let config = Self {
            performance_fee,
            max_withdraw_loss,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] naming the violated bound.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.performance_fee.get() > MAX_PERFORMANCE_FEE_BPS {
            return Err(EngineError::InvalidParameter("performance fee above cap"));
        }
        if !self.max_withdraw_loss.is_valid_percent() {
            return Err(EngineError::InvalidParameter(
                "max withdraw loss above 100 percent",
            ));
        }
        Ok(())
    }

    /// Returns the performance fee skimmed from gross harvest gains.
    #[must_use]
    pub const fn performance_fee(&self) -> BasisPoints {
        self.performance_fee
    }

    /// Returns the loss tolerance passed to vault withdrawals.
    #[must_use]
    pub const fn max_withdraw_loss(&self) -> BasisPoints {
        self.max_withdraw_loss
    }
}

//! Configuration for the two-asset StableSwap pool.

use crate::domain::{Amount, BasisPoints};
use crate::error::EngineError;

/// Maximum amplification coefficient accepted at construction.
const MAX_AMPLIFICATION: u64 = 1_000_000;

/// Cap on the swap and imbalance fees (10%).
const MAX_FEE_BPS: u32 = 1_000;

/// Default locked-profit degradation rate: full decay in ~6 hours.
///
/// Scaled by `10^18`; `rate · elapsed_seconds ≥ 10^18` means fully decayed.
pub const DEFAULT_DEGRADATION_RATE: Amount = Amount::new(46_296_296_296_296);

/// Configuration for a [`StablePool`](crate::pool::StablePool).
///
/// # Amplification
///
/// `amplification` (`A`) controls the curve shape: `A = 1` behaves like a
/// constant-product pool, large `A` approaches constant-sum (1:1) pricing.
/// Typical range for pegged pairs: 50–5000.
///
/// # Validation
///
/// - `amplification` in `1..=1_000_000`.
/// - `swap_fee` and `imbalance_fee` at most 1 000 bp (10%).
/// - `degradation_rate` non-zero and at most `10^18` (instant decay).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PoolConfig {
    amplification: u64,
    swap_fee: BasisPoints,
    imbalance_fee: BasisPoints,
    degradation_rate: Amount,
    liquidity_cooldown_secs: u64,
}

impl PoolConfig {
    /// Creates a new `PoolConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if any field violates the
    /// documented bounds.
    pub fn new(
        amplification: u64,
        swap_fee: BasisPoints,
        imbalance_fee: BasisPoints,
        degradation_rate: Amount,
        liquidity_cooldown_secs: u64,
    ) -> crate::error::Result<Self> {
        let config = Self {
            amplification,
            swap_fee,
            imbalance_fee,
            degradation_rate,
            liquidity_cooldown_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] naming the first violated
    /// bound.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.amplification == 0 {
            return Err(EngineError::InvalidParameter(
                "amplification must be greater than zero",
            ));
        }
        if self.amplification > MAX_AMPLIFICATION {
            return Err(EngineError::InvalidParameter("amplification above cap"));
        }
        if self.swap_fee.get() > MAX_FEE_BPS {
            return Err(EngineError::InvalidParameter("swap fee above cap"));
        }
        if self.imbalance_fee.get() > MAX_FEE_BPS {
            return Err(EngineError::InvalidParameter("imbalance fee above cap"));
        }
        if self.degradation_rate.is_zero() {
            return Err(EngineError::InvalidParameter(
                "degradation rate must be non-zero",
            ));
        }
        if self.degradation_rate > Amount::ONE {
            return Err(EngineError::InvalidParameter(
                "degradation rate above full-scale",
            ));
        }
        Ok(())
    }

    /// Returns the amplification coefficient.
    #[must_use]
    pub const fn amplification(&self) -> u64 {
        self.amplification
    }

    /// Returns the swap fee.
    #[must_use]
    pub const fn swap_fee(&self) -> BasisPoints {
        self.swap_fee
    }

    /// Returns the imbalance fee charged on unbalanced liquidity changes.
    #[must_use]
    pub const fn imbalance_fee(&self) -> BasisPoints {
        self.imbalance_fee
    }

    /// Returns the locked-profit degradation rate per second (`10^18`
    /// scale).
    pub const fn degradation_rate(&self) -> Amount {
        self.degradation_rate
    }

    /// Returns the per-caller cooldown for liquidity-changing operations,
    /// in seconds.
    #[must_use]
    pub const fn liquidity_cooldown_secs(&self) -> u64 {
        self.liquidity_cooldown_secs
    }
}

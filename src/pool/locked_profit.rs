//! Time-decayed exclusion of recently reported profit.
//!
//! Without this mechanism a caller could front-run a profit report,
//! deposit, wait one block, and withdraw a slice of the newly realized
//! gain at the other holders' expense.  Reported gains are therefore
//! locked and degrade linearly to zero over a bounded horizon; pricing
//! paths use [`free_funds`](LockedProfitTracker::free_funds) instead of
//! raw totals.

use crate::domain::{Amount, Rounding};

/// Full scale of the degradation coefficient (`1.0` at 18 decimals).
const COEFFICIENT: u128 = 1_000_000_000_000_000_000;

/// Tracks the still-locked portion of recently reported profit.
///
/// `degradation_rate` is the fraction of the lock released per second at
/// `10^18` scale; once `elapsed · rate ≥ 10^18` the lock is fully
/// released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedProfitTracker {
    locked_amount: Amount,
    last_report: u64,
    degradation_rate: Amount,
}

impl LockedProfitTracker {
    /// Creates a tracker with nothing locked.
    #[must_use]
    pub const fn new(degradation_rate: Amount) -> Self {
        Self {
            locked_amount: Amount::ZERO,
            last_report: 0,
            degradation_rate,
        }
    }

    /// Returns the raw locked amount as of the last report, before decay.
    pub const fn locked_at_report(&self) -> Amount {
        self.locked_amount
    }

    /// Returns the timestamp of the last report.
    #[must_use]
    pub const fn last_report(&self) -> u64 {
        self.last_report
    }

    /// Returns the profit still locked at `now`.
    ///
    /// Strictly decreasing in elapsed time and exactly zero once
    /// `elapsed · degradation_rate` reaches full scale.
    pub fn current_locked(&self, now: u64) -> Amount {
        if self.locked_amount.is_zero() {
            return Amount::ZERO;
        }
        let elapsed = now.saturating_sub(self.last_report);
        let decayed = u128::from(elapsed).saturating_mul(self.degradation_rate.get());
        if decayed >= COEFFICIENT {
            return Amount::ZERO;
        }
        let remaining = Amount::new(COEFFICIENT - decayed);
        self.locked_amount
            .mul_div(&remaining, &Amount::new(COEFFICIENT), Rounding::Down)
            .unwrap_or(Amount::ZERO)
    }

    /// Folds a profit/loss report into the lock.
    ///
    /// Gains add to whatever is still locked; losses eat into it, floored
    /// at zero.  The decay clock restarts at `now`.
    pub fn on_report(&mut self, gain: Amount, loss: Amount, now: u64) {
        let locked = self.current_locked(now);
        self.locked_amount = if !gain.is_zero() {
            locked.checked_add(&gain).unwrap_or(Amount::MAX)
        } else if !loss.is_zero() {
            locked.saturating_sub(&loss)
        } else {
            locked
        };
        self.last_report = now;
    }

    /// Returns `total_assets` minus the currently locked profit, floored
    /// at zero.
    pub fn free_funds(&self, total_assets: Amount, now: u64) -> Amount {
        total_assets.saturating_sub(&self.current_locked(now))
    }

    /// Drops the lock entirely (emergency accounting reset).
    pub fn reset(&mut self, now: u64) {
        self.locked_amount = Amount::ZERO;
        self.last_report = now;
    }
}

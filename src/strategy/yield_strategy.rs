//! Yield strategy bridging the pool's base reserves into an external
//! vault.

use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::domain::{AccountId, Amount, Rounding};
use crate::error::{EngineError, Result};
use crate::pool::StablePool;
use crate::traits::{ReserveSource, Vault};

/// Deploys the pool's idle base asset into a [`Vault`] and reconciles
/// the resulting profit or loss back through pool reports.
///
/// # Debt ledger
///
/// `debt_to_pool` is the strategy's own record of what it owes: principal
/// received through [`invest`](Self::invest) plus net harvested profit,
/// minus everything returned.  [`harvest`](Self::harvest) is the single
/// synchronization point where this ledger and the pool's recorded debt
/// are brought back in line.
///
/// # Pause semantics
///
/// A paused strategy (after [`emergency_withdraw_all`](Self::emergency_withdraw_all))
/// rejects new investment and harvests, and answers recalls with a zero
/// delivery; its funds already sit with the pool.
#[derive(Debug, Clone)]
pub struct YieldStrategy<V: Vault> {
    vault: V,
    id: AccountId,
    config: StrategyConfig,
    debt_to_pool: Amount,
    shares_held: Amount,
    idle: Amount,
    fees_collected: Amount,
    paused: bool,
}

impl<V: Vault> YieldStrategy<V> {
    /// Creates a strategy over `vault`, reporting as `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the config fails
    /// validation.
    pub fn new(id: AccountId, vault: V, config: StrategyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            vault,
            id,
            config,
            debt_to_pool: Amount::ZERO,
            shares_held: Amount::ZERO,
            idle: Amount::ZERO,
            fees_collected: Amount::ZERO,
            paused: false,
        })
    }

    /// Returns the identity this strategy reports under.
    #[must_use]
    pub const fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the strategy's own record of what it owes the pool.
    pub const fn debt_to_pool(&self) -> Amount {
        self.debt_to_pool
    }

    /// Returns the cumulative performance fees skimmed at harvest.
    pub const fn fees_collected(&self) -> Amount {
        self.fees_collected
    }

    /// Returns `true` once the strategy has been emergency-stopped.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Read access to the underlying vault.
    #[must_use]
    pub const fn vault(&self) -> &V {
        &self.vault
    }

    /// Mutable access to the underlying vault (simulation hooks).
    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    /// Everything the strategy currently holds, valued at the vault's
    /// share price: idle funds plus the value of held shares.
    pub fn total_assets(&self) -> Amount {
        self.idle
            .checked_add(&self.vault.shares_to_assets(self.shares_held))
            .unwrap_or(Amount::MAX)
    }

    /// Takes `amount` of base from the pool, records it as debt, and
    /// deposits it into the vault.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidParameter`] while paused.
    /// - Vault deposit failures propagate before any ledger change.
    pub fn invest(&mut self, amount: Amount) -> Result<()> {
        if self.paused {
            return Err(EngineError::InvalidParameter("strategy is paused"));
        }
        if amount.is_zero() {
            return Err(EngineError::InvalidParameter("zero investment"));
        }
        let minted = self.vault.deposit(amount)?;
        self.shares_held = self
            .shares_held
            .checked_add(&minted)
            .ok_or(EngineError::Overflow("strategy share holding"))?;
        self.debt_to_pool = self
            .debt_to_pool
            .checked_add(&amount)
            .ok_or(EngineError::Overflow("strategy debt"))?;
        debug!(%amount, %minted, "invested into vault");
        Ok(())
    }

    /// Answers a pool recall: returns up to `amount`, serving idle funds
    /// first and realizing vault shares for the rest.
    ///
    /// Over-realization from share rounding stays behind as idle; a
    /// shortfall (depleted or paused strategy) comes back as a reduced
    /// delivery, never an error.  Whatever is delivered reduces the debt
    /// ledger.
    ///
    /// # Errors
    ///
    /// Vault withdrawal faults propagate.
    pub fn pool_call_withdraw(&mut self, amount: Amount) -> Result<Amount> {
        if self.paused || amount.is_zero() {
            return Ok(Amount::ZERO);
        }

        let from_idle = self.idle.min(amount);
        self.idle = self.idle.saturating_sub(&from_idle);
        let remaining = amount.saturating_sub(&from_idle);

        let (expected_from_shares, realized) = if remaining.is_zero() {
            (Amount::ZERO, Amount::ZERO)
        } else {
            let shares = self
                .vault
                .assets_to_shares(remaining)
                .min(self.shares_held);
            let expected = self.vault.shares_to_assets(shares);
            let out = self
                .vault
                .withdraw(shares, self.config.max_withdraw_loss())?;
            self.shares_held = self.shares_held.saturating_sub(&shares);
            (expected, out)
        };

        let mut delivered = from_idle
            .checked_add(&realized)
            .ok_or(EngineError::Overflow("recall delivery"))?;
        if delivered > amount {
            self.idle = self
                .idle
                .checked_add(&delivered.saturating_sub(&amount))
                .ok_or(EngineError::Overflow("idle holding"))?;
            delivered = amount;
        }
        // Debt drops by what the burned shares were worth, so a vault
        // realization loss is recognized here rather than carried forward.
        let expected_total = from_idle
            .checked_add(&expected_from_shares)
            .ok_or(EngineError::Overflow("recall expectation"))?;
        self.debt_to_pool = self.debt_to_pool.saturating_sub(&expected_total);

        if delivered < amount {
            warn!(requested = %amount, %delivered, "recall delivered short");
        } else {
            debug!(%amount, "recall served in full");
        }
        Ok(delivered)
    }

    /// Realizes the vault position against the debt ledger and reports
    /// the outcome to `pool`.
    ///
    /// Idle funds are re-deposited first.  On a gain, the performance fee
    /// is skimmed from the gross by realizing the equivalent shares, and
    /// the net profit is added to the debt before reporting; on a loss the
    /// debt is written down to the position's current value.  Returns
    /// `(profit, loss)`, one of which is always zero.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidParameter`] while paused.
    /// - [`EngineError::UnauthorizedReport`] if `pool` has a different
    ///   strategy registered.
    pub fn harvest(&mut self, pool: &mut StablePool, now: u64) -> Result<(Amount, Amount)> {
        if self.paused {
            return Err(EngineError::InvalidParameter("strategy is paused"));
        }

        if !self.idle.is_zero() {
            let minted = self.vault.deposit(self.idle)?;
            self.shares_held = self
                .shares_held
                .checked_add(&minted)
                .ok_or(EngineError::Overflow("strategy share holding"))?;
            self.idle = Amount::ZERO;
        }

        let total = self.total_assets();
        if total < self.debt_to_pool {
            let loss = self.debt_to_pool.saturating_sub(&total);
            self.debt_to_pool = total;
            pool.report(&self.id, Amount::ZERO, loss, total, now)?;
            warn!(%loss, debt = %total, "harvest realized a loss");
            return Ok((Amount::ZERO, loss));
        }

        let gross = total.saturating_sub(&self.debt_to_pool);
        if gross.is_zero() {
            pool.report(&self.id, Amount::ZERO, Amount::ZERO, self.debt_to_pool, now)?;
            return Ok((Amount::ZERO, Amount::ZERO));
        }

        let fee = self.config.performance_fee().apply(gross, Rounding::Down)?;
        if fee > gross {
            return Err(EngineError::InvariantViolation("fee exceeds gross gain"));
        }
        let skimmed = if fee.is_zero() {
            Amount::ZERO
        } else {
            let fee_shares = self.vault.assets_to_shares(fee).min(self.shares_held);
            let out = self
                .vault
                .withdraw(fee_shares, self.config.max_withdraw_loss())?;
            self.shares_held = self.shares_held.saturating_sub(&fee_shares);
            out
        };
        self.fees_collected = self
            .fees_collected
            .checked_add(&skimmed)
            .ok_or(EngineError::Overflow("fee accumulator"))?;

        let net = gross.saturating_sub(&skimmed);
        self.debt_to_pool = self
            .debt_to_pool
            .checked_add(&net)
            .ok_or(EngineError::Overflow("strategy debt"))?;
        pool.report(&self.id, net, Amount::ZERO, self.debt_to_pool, now)?;
        info!(%gross, %net, fee = %skimmed, "harvest reported a gain");
        Ok((net, Amount::ZERO))
    }

    /// Winds the strategy down: realizes every share plus idle funds,
    /// hands the proceeds to the pool, and pauses.
    ///
    /// The pool clears the recorded debt regardless of whether the
    /// proceeds cover it; any shortfall is the loss absorbed by the reset.
    ///
    /// # Errors
    ///
    /// - Vault withdrawal faults propagate before any ledger change.
    /// - [`EngineError::UnauthorizedReport`] if `pool` has a different
    ///   strategy registered.
    pub fn emergency_withdraw_all(
        &mut self,
        pool: &mut StablePool,
        now: u64,
    ) -> Result<Amount> {
        let realized = if self.shares_held.is_zero() {
            Amount::ZERO
        } else {
            self.vault
                .withdraw(self.shares_held, self.config.max_withdraw_loss())?
        };
        self.shares_held = Amount::ZERO;
        let returned = realized
            .checked_add(&self.idle)
            .ok_or(EngineError::Overflow("emergency return"))?;
        self.idle = Amount::ZERO;
        self.paused = true;

        pool.emergency_reset(&self.id, returned, now)?;
        self.debt_to_pool = Amount::ZERO;
        warn!(%returned, "emergency withdrawal complete, strategy paused");
        Ok(returned)
    }
}

impl<V: Vault> ReserveSource for YieldStrategy<V> {
    fn recall(&mut self, amount: Amount) -> Result<Amount> {
        self.pool_call_withdraw(amount)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{PoolConfig, DEFAULT_DEGRADATION_RATE};
    use crate::domain::{BasisPoints, Shares};
    use crate::strategy::SimVault;

    const UNIT: u128 = 1_000_000_000_000_000_000;

    fn units(n: u128) -> Amount {
        Amount::new(n * UNIT)
    }

    fn strat_id() -> AccountId {
        AccountId::from_bytes([9u8; 32])
    }

    /// Strategy with a 10% performance fee over a fresh sim vault.
    fn strategy() -> YieldStrategy<SimVault> {
        let Ok(config) = StrategyConfig::new(BasisPoints::new(1_000), BasisPoints::new(100))
        else {
            panic!("config");
        };
        let Ok(strategy) = YieldStrategy::new(strat_id(), SimVault::new(), config) else {
            panic!("strategy");
        };
        strategy
    }

    fn pool_with_strategy() -> StablePool {
        let Ok(cfg) = PoolConfig::new(
            100,
            BasisPoints::new(4),
            BasisPoints::new(20),
            DEFAULT_DEGRADATION_RATE,
            0,
        ) else {
            panic!("pool config");
        };
        let Ok(mut pool) = StablePool::new(cfg) else {
            panic!("pool");
        };
        let Ok(_) = pool.add_liquidity(
            AccountId::from_bytes([1u8; 32]),
            [units(1_000), units(1_000)],
            Shares::ZERO,
            0,
        ) else {
            panic!("seed");
        };
        pool.register_strategy(strat_id());
        pool
    }

    // -- invest / withdraw ---------------------------------------------------

    #[test]
    fn invest_records_debt_and_deposits() {
        let mut s = strategy();
        let Ok(()) = s.invest(units(500)) else {
            panic!("invest");
        };
        assert_eq!(s.debt_to_pool(), units(500));
        assert_eq!(s.total_assets(), units(500));
    }

    #[test]
    fn withdraw_realizes_shares_and_reduces_debt() {
        let mut s = strategy();
        let Ok(()) = s.invest(units(500)) else {
            panic!("invest");
        };
        let Ok(delivered) = s.pool_call_withdraw(units(200)) else {
            panic!("withdraw");
        };
        assert_eq!(delivered, units(200));
        assert_eq!(s.debt_to_pool(), units(300));
        assert_eq!(s.total_assets(), units(300));
    }

    #[test]
    fn withdraw_beyond_holdings_delivers_short() {
        let mut s = strategy();
        let Ok(()) = s.invest(units(100)) else {
            panic!("invest");
        };
        let Ok(delivered) = s.pool_call_withdraw(units(500)) else {
            panic!("withdraw");
        };
        assert_eq!(delivered, units(100));
        assert_eq!(s.debt_to_pool(), Amount::ZERO);
    }

    #[test]
    fn paused_strategy_delivers_nothing() {
        let mut s = strategy();
        let mut pool = pool_with_strategy();
        let Ok(()) = s.invest(units(100)) else {
            panic!("invest");
        };
        let Ok(_) = s.emergency_withdraw_all(&mut pool, 0) else {
            panic!("emergency");
        };
        assert_eq!(s.pool_call_withdraw(units(50)), Ok(Amount::ZERO));
    }

    // -- harvest -------------------------------------------------------------

    #[test]
    fn harvest_gain_skims_fee_and_locks_net() {
        let mut s = strategy();
        let mut pool = pool_with_strategy();
        let Ok(()) = s.invest(units(1_000)) else {
            panic!("invest");
        };
        let Ok(()) = s.vault_mut().gain(units(50)) else {
            panic!("gain");
        };

        let Ok((profit, loss)) = s.harvest(&mut pool, 100) else {
            panic!("harvest");
        };
        assert_eq!(loss, Amount::ZERO);
        // 10% of the 50 gross goes to fees; rounding may shift a raw unit.
        assert!(profit.get().abs_diff(45 * UNIT) <= 2);
        assert!(s.fees_collected().get().abs_diff(5 * UNIT) <= 2);
        assert!(pool.strategy_debt().get().abs_diff(1_045 * UNIT) <= 2);
        assert_eq!(pool.current_locked(100), profit);
    }

    #[test]
    fn harvest_loss_writes_down_debt() {
        let mut s = strategy();
        let mut pool = pool_with_strategy();
        let Ok(()) = s.invest(units(1_000)) else {
            panic!("invest");
        };
        s.vault_mut().slash(units(100));

        let Ok((profit, loss)) = s.harvest(&mut pool, 100) else {
            panic!("harvest");
        };
        assert_eq!(profit, Amount::ZERO);
        assert_eq!(loss, units(100));
        assert_eq!(s.debt_to_pool(), units(900));
        assert_eq!(pool.strategy_debt(), units(900));
    }

    #[test]
    fn harvest_flat_position_reports_neutral() {
        let mut s = strategy();
        let mut pool = pool_with_strategy();
        let Ok(()) = s.invest(units(1_000)) else {
            panic!("invest");
        };
        let Ok((profit, loss)) = s.harvest(&mut pool, 100) else {
            panic!("harvest");
        };
        assert_eq!((profit, loss), (Amount::ZERO, Amount::ZERO));
        assert_eq!(pool.strategy_debt(), units(1_000));
    }

    #[test]
    fn harvest_against_wrong_pool_rejected() {
        let mut s = strategy();
        let mut pool = pool_with_strategy();
        pool.register_strategy(AccountId::from_bytes([7u8; 32]));
        let Ok(()) = s.invest(units(100)) else {
            panic!("invest");
        };
        let Ok(()) = s.vault_mut().gain(units(1)) else {
            panic!("gain");
        };
        assert_eq!(
            s.harvest(&mut pool, 0),
            Err(EngineError::UnauthorizedReport)
        );
    }

    // -- emergency -----------------------------------------------------------

    #[test]
    fn emergency_returns_everything_and_pauses() {
        let mut s = strategy();
        let mut pool = pool_with_strategy();
        let Ok(()) = s.invest(units(500)) else {
            panic!("invest");
        };
        let Ok(()) = s.vault_mut().gain(units(25)) else {
            panic!("gain");
        };
        let base_before = pool.balances()[0];

        let Ok(returned) = s.emergency_withdraw_all(&mut pool, 50) else {
            panic!("emergency");
        };
        assert_eq!(returned, units(525));
        assert!(s.is_paused());
        assert_eq!(s.debt_to_pool(), Amount::ZERO);
        assert_eq!(pool.strategy_debt(), Amount::ZERO);
        assert_eq!(
            pool.balances()[0],
            base_before.checked_add(&returned).unwrap_or(Amount::MAX)
        );
        assert!(s.invest(units(1)).is_err());
    }
}

//! Split-allocation search between the pool swap and the direct vault
//! deposit.

use tracing::{debug, info};

use crate::config::OptimizerConfig;
use crate::domain::{AllocationQuote, Amount, AssetIndex, Rounding};
use crate::error::{EngineError, Result};
use crate::pool::StablePool;
use crate::strategy::YieldStrategy;
use crate::traits::Vault;

/// Finds the input split that maximizes total output when converting the
/// base asset into the yield-bearing asset.
///
/// Two routes exist: swapping through the pool (concave output, slippage
/// grows with size) and depositing directly into the vault (linear at the
/// current share price).  The optimum equalizes the two marginal rates;
/// the search bisects on the forward-difference marginal of the swap leg
/// against the direct leg's, evaluating both pure routes first so the
/// result is never worse than either alone.
///
/// The optimizer is stateless: every call quotes against the state passed
/// in, and [`convert_with_split`](Self::convert_with_split) executes both
/// legs on clones that are committed only when the whole conversion lands
/// within tolerance.
#[derive(Debug, Clone, Copy)]
pub struct HybridOptimizer {
    config: OptimizerConfig,
}

/// A fully evaluated candidate split.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    swap_amount: Amount,
    swap_out: Amount,
    direct_out: Amount,
    total: Amount,
}

impl HybridOptimizer {
    /// Creates an optimizer with the given search parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the config fails
    /// validation.
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates an optimizer with the tuned default parameters.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            config: OptimizerConfig::default(),
        }
    }

    /// Returns the search parameters.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Searches for the output-maximizing split of `amount` between the
    /// swap leg and the direct leg.
    ///
    /// `quote_swap` and `quote_direct` price one leg each and must be pure
    /// with respect to the underlying state.  A leg quote failing with
    /// [`EngineError::InsufficientLiquidity`] disqualifies that candidate
    /// split rather than the whole search; any other quote error aborts.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidParameter`] for a zero `amount`.
    /// - [`EngineError::InsufficientLiquidity`] if no candidate split can
    ///   be priced at all.
    pub fn optimize<S, D>(
        &self,
        amount: Amount,
        quote_swap: S,
        quote_direct: D,
    ) -> Result<AllocationQuote>
    where
        S: Fn(Amount) -> Result<Amount>,
        D: Fn(Amount) -> Result<Amount>,
    {
        if amount.is_zero() {
            return Err(EngineError::InvalidParameter("zero conversion amount"));
        }

        let evaluate = |swap_amount: Amount| -> Result<Option<Candidate>> {
            let direct_amount = amount.saturating_sub(&swap_amount);
            let Some(swap_out) = Self::leg(&quote_swap, swap_amount)? else {
                return Ok(None);
            };
            let Some(direct_out) = Self::leg(&quote_direct, direct_amount)? else {
                return Ok(None);
            };
            let total = swap_out
                .checked_add(&direct_out)
                .ok_or(EngineError::Overflow("combined leg output"))?;
            Ok(Some(Candidate {
                swap_amount,
                swap_out,
                direct_out,
                total,
            }))
        };

        let mut best: Option<Candidate> = None;
        let mut consider = |candidate: Option<Candidate>| {
            if let Some(c) = candidate {
                if best.map_or(true, |b| c.total > b.total) {
                    best = Some(c);
                }
            }
        };

        // Pure routes first: the answer is never worse than either alone.
        consider(evaluate(Amount::ZERO)?);
        consider(evaluate(amount)?);

        let mut lo = Amount::ZERO;
        let mut hi = amount;
        for _ in 0..self.config.max_iterations() {
            if hi.saturating_sub(&lo) <= self.config.convergence_width() {
                break;
            }
            let mid = Amount::new(lo.get() / 2 + hi.get() / 2 + (lo.get() % 2 + hi.get() % 2) / 2);
            consider(evaluate(mid)?);

            // Forward-difference marginals over the same probe; the probe
            // clamps at the interval end rather than stepping outside it.
            let delta = self.config.probe_step().min(amount.saturating_sub(&mid));
            if delta.is_zero() {
                hi = mid;
                continue;
            }
            let swap_gain = match (
                Self::leg(&quote_swap, mid)?,
                Self::leg(&quote_swap, mid.checked_add(&delta).unwrap_or(amount))?,
            ) {
                (Some(at), Some(ahead)) => Some(ahead.saturating_sub(&at)),
                _ => None,
            };
            let direct_at = amount.saturating_sub(&mid);
            let direct_gain = match (
                Self::leg(&quote_direct, direct_at.saturating_sub(&delta))?,
                Self::leg(&quote_direct, direct_at)?,
            ) {
                (Some(behind), Some(at)) => Some(at.saturating_sub(&behind)),
                _ => None,
            };

            match (swap_gain, direct_gain) {
                // Swapping the next slice beats depositing it: move right.
                (Some(s), Some(d)) if s > d => lo = mid,
                (Some(_), Some(_)) => hi = mid,
                // An unpriceable swap probe means the swap leg is saturated.
                (None, _) => hi = mid,
                (_, None) => lo = mid,
            }
        }

        let best = best.ok_or(EngineError::InsufficientLiquidity)?;
        debug!(
            %amount,
            swap = %best.swap_amount,
            total_out = %best.total,
            "allocation search complete"
        );
        AllocationQuote::new(
            best.swap_amount,
            amount.saturating_sub(&best.swap_amount),
            best.swap_out,
            best.direct_out,
        )
    }

    /// Quotes one leg, treating a zero input as a zero output and an
    /// insufficient-liquidity rejection as "no candidate".
    fn leg<F>(quote: &F, input: Amount) -> Result<Option<Amount>>
    where
        F: Fn(Amount) -> Result<Amount>,
    {
        if input.is_zero() {
            return Ok(Some(Amount::ZERO));
        }
        match quote(input) {
            Ok(out) => Ok(Some(out)),
            Err(EngineError::InsufficientLiquidity) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Quotes and executes an optimized conversion of `amount` base into
    /// the yield-bearing asset, atomically.
    ///
    /// Both legs run on clones of `pool` and `strategy`; the originals are
    /// replaced only after every leg lands within the configured execution
    /// tolerance of its quote and the combined output clears `min_total`.
    /// On any error the originals are untouched.
    ///
    /// Returns the quote and the realized total output.
    ///
    /// # Errors
    ///
    /// - [`EngineError::SlippageTooHigh`] if an executed leg deviates from
    ///   its quote beyond tolerance.
    /// - [`EngineError::InsufficientOutput`] if the realized total is
    ///   below `min_total`.
    pub fn convert_with_split<V>(
        &self,
        pool: &mut StablePool,
        strategy: &mut YieldStrategy<V>,
        amount: Amount,
        min_total: Amount,
        now: u64,
    ) -> Result<(AllocationQuote, Amount)>
    where
        V: Vault + Clone,
    {
        let quote = self.optimize(
            amount,
            |x| {
                pool.quote_swap(AssetIndex::Base, AssetIndex::Quote, x, now)
                    .map(|q| q.amount_out())
            },
            |x| {
                x.mul_div(
                    &Amount::ONE,
                    &strategy.vault().price_per_share(),
                    Rounding::Down,
                )
                .ok_or(EngineError::DivisionByZero)
            },
        )?;

        let mut pool_next = pool.clone();
        let mut strategy_next = strategy.clone();
        let tolerance = self.config.execution_tolerance();

        let direct_realized = if quote.direct_amount().is_zero() {
            Amount::ZERO
        } else {
            let minted = strategy_next.vault_mut().deposit(quote.direct_amount())?;
            if minted < tolerance.apply_complement(quote.expected_direct_out())? {
                return Err(EngineError::SlippageTooHigh);
            }
            minted
        };

        let swap_realized = if quote.swap_amount().is_zero() {
            Amount::ZERO
        } else {
            let executed = pool_next.swap(
                AssetIndex::Base,
                AssetIndex::Quote,
                quote.swap_amount(),
                Amount::ZERO,
                &mut strategy_next,
                now,
            )?;
            if executed.amount_out() < tolerance.apply_complement(quote.expected_swap_out())? {
                return Err(EngineError::SlippageTooHigh);
            }
            executed.amount_out()
        };

        let realized = direct_realized
            .checked_add(&swap_realized)
            .ok_or(EngineError::Overflow("realized conversion total"))?;
        if realized < min_total {
            return Err(EngineError::InsufficientOutput);
        }

        *pool = pool_next;
        *strategy = strategy_next;
        info!(%amount, %realized, swap = %quote.swap_amount(), "split conversion executed");
        Ok((quote, realized))
    }
}

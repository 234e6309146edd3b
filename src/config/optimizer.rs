//! Configuration for the hybrid allocation optimizer.

use crate::domain::{Amount, BasisPoints};
use crate::error::EngineError;

/// Configuration for a [`HybridOptimizer`](crate::optimizer::HybridOptimizer).
///
/// The defaults mirror the tuned production values: 20 bisection steps, a
/// `10^15` forward-difference probe for the marginal swap rate, a `10^12`
/// interval width for early termination, and a 0.5% per-leg execution
/// tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct OptimizerConfig {
    max_iterations: u32,
    probe_step: Amount,
    convergence_width: Amount,
    execution_tolerance: BasisPoints,
}

impl OptimizerConfig {
    /// Creates a new `OptimizerConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the iteration budget or
    /// either step size is zero, or the tolerance exceeds 100%.
    pub fn new(
        max_iterations: u32,
        probe_step: Amount,
        convergence_width: Amount,
        execution_tolerance: BasisPoints,
    ) -> crate::error::Result<Self> {
        let config = Self {
            max_iterations,
            probe_step,
            convergence_width,
            execution_tolerance,
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
        if self.max_iterations == 0 {
            return Err(EngineError::InvalidParameter(
                "optimizer needs at least one iteration",
            ));
        }
        if self.probe_step.is_zero() {
            return Err(EngineError::InvalidParameter("probe step must be non-zero"));
        }
        if self.convergence_width.is_zero() {
            return Err(EngineError::InvalidParameter(
                "convergence width must be non-zero",
            ));
        }
        if !self.execution_tolerance.is_valid_percent() {
            return Err(EngineError::InvalidParameter(
                "execution tolerance above 100 percent",
            ));
        }
        Ok(())
    }

    /// Returns the bisection iteration cap.
    #[must_use]
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Returns the forward-difference probe step for marginal-rate
    /// estimation.
    pub const fn probe_step(&self) -> Amount {
        self.probe_step
    }

    /// Returns the interval width below which the search terminates early.
    pub const fn convergence_width(&self) -> Amount {
        self.convergence_width
    }

    /// Returns the tolerated deviation between a leg's quoted and executed
    /// output.
    #[must_use]
    pub const fn execution_tolerance(&self) -> BasisPoints {
        self.execution_tolerance
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            probe_step: Amount::new(1_000_000_000_000_000),
            convergence_width: Amount::new(1_000_000_000_000),
            execution_tolerance: BasisPoints::new(50),
        }
    }
}

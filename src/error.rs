//! Unified error type for the Tidal AMM engine.
//!
//! All fallible operations across the crate return [`EngineError`] so that
//! consumers handle one error surface for solver, pool, strategy, and
//! optimizer failures.
//!
//! # Propagation policy
//!
//! Numerical and invariant failures ([`EngineError::ConvergenceFailure`],
//! [`EngineError::InvariantViolation`], [`EngineError::Overflow`]) abort the
//! whole compound operation; no partial mutation survives.  The only case
//! where a function returns less than requested *without* failing is the
//! strategy recall in withdrawal paths, which degrades gracefully to the
//! amount actually available.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, EngineError>;

/// Every failure mode of the engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A Newton-Raphson solve exceeded its iteration cap.  Fatal: the
    /// balances have drifted outside the solver's stable domain.
    #[error("newton-raphson did not converge: {0}")]
    ConvergenceFailure(&'static str),

    /// The caller-specified minimum output was not met.  Safe to retry
    /// with adjusted parameters.
    #[error("output below caller-specified minimum")]
    InsufficientOutput,

    /// A leg of a compound execution deviated from its quote beyond the
    /// configured tolerance.  The compound operation is rolled back.
    #[error("executed output deviates from quote beyond tolerance")]
    SlippageTooHigh,

    /// Liquid reserves plus the strategy recall could not cover an exact
    /// amount (swap output path).
    #[error("insufficient liquidity to satisfy request")]
    InsufficientLiquidity,

    /// An accounting invariant that must never break in correct operation
    /// was violated (fee split exceeding total, loss exceeding debt, …).
    #[error("accounting invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// A parameter was rejected before any state was touched.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Checked arithmetic overflowed or underflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A divisor was zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A state-mutating entry point was re-entered while an operation was
    /// in flight.
    #[error("reentrant call rejected")]
    Reentrancy,

    /// The per-caller cooldown for liquidity-changing operations has not
    /// elapsed.
    #[error("liquidity cooldown active for caller")]
    CooldownActive,

    /// A profit/loss report arrived from an identity other than the
    /// registered strategy.
    #[error("report from unregistered strategy")]
    UnauthorizedReport,
}

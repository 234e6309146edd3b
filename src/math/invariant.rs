//! StableSwap invariant solver.
//!
//! Pure Newton-Raphson routines over the two-asset Curve invariant
//!
//! ```text
//! A·n^n·S + D = A·n^n·D + D^(n+1) / (n^n · x · y)      (n = 2)
//! ```
//!
//! where `A` is the amplification coefficient, `S = x + y`, and `D` is the
//! pool constant.  All routines are deterministic and side-effect free:
//! identical fixed-point inputs produce bit-identical fixed-point outputs.
//!
//! Intermediates are widened to 256 bits so that 18-decimal balances never
//! overflow mid-iteration; the stepwise evaluation order keeps every
//! intermediate well below the 256-bit ceiling.

use primitive_types::U256;

use crate::domain::{Amount, AssetIndex};
use crate::error::{EngineError, Result};

/// Number of assets in the pool.
const N: u64 = 2;

/// Maximum Newton-Raphson iterations before declaring non-convergence.
const MAX_ITERATIONS: u32 = 255;

/// Convergence threshold: absolute difference between consecutive
/// iterates, in raw fixed-point units.
const CONVERGENCE_THRESHOLD: u32 = 1;

fn abs_diff(a: U256, b: U256) -> U256 {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

fn to_amount(v: U256, context: &'static str) -> Result<Amount> {
    if v > U256::from(u128::MAX) {
        return Err(EngineError::Overflow(context));
    }
    Ok(Amount::new(v.as_u128()))
}

/// Computes the invariant `D` for the given balances via Newton-Raphson.
///
/// Initial guess `D₀ = S`; iterates
///
/// ```text
/// D_next = (A·n·S + n·D_P) · D / ((A·n − 1)·D + (n+1)·D_P)
/// ```
///
/// with `D_P = D³ / (n^n · x · y)`, stopping once consecutive iterates
/// differ by at most one raw unit.
///
/// # Errors
///
/// - [`EngineError::InvalidParameter`] if `amp` is zero.
/// - [`EngineError::DivisionByZero`] if exactly one balance is zero.
/// - [`EngineError::ConvergenceFailure`] if the iteration cap is reached.
pub fn compute_d(balances: &[Amount; 2], amp: u64) -> Result<Amount> {
    if amp == 0 {
        return Err(EngineError::InvalidParameter("amplification must be non-zero"));
    }

    let x = U256::from(balances[0].get());
    let y = U256::from(balances[1].get());
    let s = x + y;
    if s.is_zero() {
        return Ok(Amount::ZERO);
    }
    if x.is_zero() || y.is_zero() {
        return Err(EngineError::DivisionByZero);
    }

    let n = U256::from(N);
    let ann = U256::from(amp) * n;

    let mut d = s;
    for _ in 0..MAX_ITERATIONS {
        // D_P = D³ / (n^n · x · y), evaluated stepwise to bound growth.
        let mut d_p = d;
        d_p = d_p * d / (x * n);
        d_p = d_p * d / (y * n);

        let d_prev = d;
        let numerator = (ann * s + d_p * n) * d;
        let denominator = (ann - U256::one()) * d + (n + U256::one()) * d_p;
        if denominator.is_zero() {
            return Err(EngineError::DivisionByZero);
        }
        d = numerator / denominator;

        if abs_diff(d, d_prev) <= U256::from(CONVERGENCE_THRESHOLD) {
            return to_amount(d, "invariant D exceeds amount range");
        }
    }

    Err(EngineError::ConvergenceFailure("invariant D"))
}

/// Newton-Raphson solve of `y² + y·(b − D) = c` shared by [`compute_y`]
/// and [`compute_y_given_d`].
///
/// `other` is the (fixed) balance of the counter-asset.
fn solve_counter_balance(other: U256, d: U256, ann: U256) -> Result<Amount> {
    if other.is_zero() {
        return Err(EngineError::DivisionByZero);
    }

    let n = U256::from(N);
    // c = D³ / (n^n · other · A·n), stepwise.
    let c = d * d / (other * n) * d / (ann * n);
    // b = other + D / (A·n); the −D term is folded into the iteration.
    let b = other + d / ann;

    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_prev = y;
        let numerator = y * y + c;
        let denominator = y * U256::from(2u8) + b - d;
        if denominator.is_zero() {
            return Err(EngineError::DivisionByZero);
        }
        y = numerator / denominator;

        if abs_diff(y, y_prev) <= U256::from(CONVERGENCE_THRESHOLD) {
            return to_amount(y, "counter balance exceeds amount range");
        }
    }

    Err(EngineError::ConvergenceFailure("counter balance y"))
}

/// Given asset `i` moving to `new_balance_i`, computes the implied balance
/// of asset `j` that keeps the invariant of the *current* balances.
///
/// # Errors
///
/// - [`EngineError::InvalidParameter`] if `i == j` or `amp` is zero.
/// - [`EngineError::ConvergenceFailure`] if either solve fails to converge.
pub fn compute_y(
    i: AssetIndex,
    j: AssetIndex,
    new_balance_i: Amount,
    balances: &[Amount; 2],
    amp: u64,
) -> Result<Amount> {
    if i == j {
        return Err(EngineError::InvalidParameter("identical asset indices"));
    }
    let d = compute_d(balances, amp)?;
    let ann = U256::from(amp) * U256::from(N);
    solve_counter_balance(U256::from(new_balance_i.get()), U256::from(d.get()), ann)
}

/// Computes the reduced balance of asset `i` at the target invariant
/// `target_d`, holding the counter-asset balance fixed.
///
/// Used to size single-asset withdrawals: the pool picks the lower `D`
/// implied by the burned shares and solves for asset `i`'s new balance.
///
/// # Errors
///
/// Same convergence and parameter policy as [`compute_y`].
pub fn compute_y_given_d(
    i: AssetIndex,
    balances: &[Amount; 2],
    amp: u64,
    target_d: Amount,
) -> Result<Amount> {
    if amp == 0 {
        return Err(EngineError::InvalidParameter("amplification must be non-zero"));
    }
    let other = balances[i.other().as_usize()];
    let ann = U256::from(amp) * U256::from(N);
    solve_counter_balance(U256::from(other.get()), U256::from(target_d.get()), ann)
}

//! Explicit rounding direction for arithmetic operations.

/// Specifies the rounding direction for division operations on domain types.
///
/// All division in the engine requires an explicit `Rounding` parameter to
/// prevent silent precision loss.  The pool's accounting convention is to
/// round in the pool's favor: outputs to callers round down, fees charged
/// to callers round up.
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::{Amount, Rounding};
///
/// let ten = Amount::new(10);
/// let three = Amount::new(3);
/// assert_eq!(ten.checked_div(&three, Rounding::Down), Some(Amount::new(3)));
/// assert_eq!(ten.checked_div(&three, Rounding::Up), Some(Amount::new(4)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

//! Numerical routines for the StableSwap invariant.
//!
//! Everything here is pure: no state, no side effects, deterministic
//! fixed-point results.

mod invariant;

pub use invariant::{compute_d, compute_y, compute_y_given_d};

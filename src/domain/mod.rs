//! Fundamental domain value types used throughout the engine.
//!
//! This module contains the core value types that model the domain:
//! fixed-point amounts, basis points, asset indices, pool shares, caller
//! identities, and quote results.  All types use newtypes with validated
//! constructors to enforce invariants.

mod account;
mod allocation;
mod amount;
mod asset;
mod basis_points;
mod rounding;
mod shares;
mod swap_quote;

pub use account::AccountId;
pub use allocation::AllocationQuote;
pub use amount::Amount;
pub use asset::AssetIndex;
pub use basis_points::BasisPoints;
pub use rounding::Rounding;
pub use shares::Shares;
pub use swap_quote::SwapQuote;

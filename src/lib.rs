//! # Tidal AMM
//!
//! StableSwap liquidity engine for a pegged two-asset pair, with the base
//! asset put to work in an external yield vault and a split-allocation
//! optimizer on top.
//!
//! Three cooperating pieces:
//!
//! - **Pool** — a Curve-style StableSwap invariant over two assets, with
//!   swap and liquidity operations, an imbalance fee on unbalanced
//!   deposits/withdrawals, and locked-profit accounting that releases
//!   reported strategy gains linearly instead of all at once.
//! - **Strategy** — lends the pool's idle base asset into a [`Vault`],
//!   answers pool recalls when withdrawals need more liquid base than is
//!   on hand, and reconciles profit and loss through periodic harvests.
//! - **Optimizer** — given an amount to convert into the yield-bearing
//!   asset, searches for the output-maximizing split between the pool
//!   swap (concave) and the direct vault deposit (linear), then executes
//!   both legs atomically.
//!
//! [`Vault`]: traits::Vault
//!
//! # Quick Start
//!
//! ```rust
//! use tidal_amm::config::{PoolConfig, DEFAULT_DEGRADATION_RATE};
//! use tidal_amm::domain::{AccountId, Amount, AssetIndex, BasisPoints, Shares};
//! use tidal_amm::pool::StablePool;
//! use tidal_amm::traits::NoReserves;
//!
//! let config = PoolConfig::new(
//!     100,                       // amplification
//!     BasisPoints::new(4),       // swap fee, 0.04%
//!     BasisPoints::new(20),      // imbalance fee, 0.20%
//!     DEFAULT_DEGRADATION_RATE,
//!     0,                         // no liquidity cooldown
//! )
//! .expect("valid config");
//! let mut pool = StablePool::new(config).expect("pool");
//!
//! let lp = AccountId::from_bytes([1u8; 32]);
//! let unit = Amount::ONE.get();
//! pool.add_liquidity(
//!     lp,
//!     [Amount::new(1_000 * unit), Amount::new(1_000 * unit)],
//!     Shares::ZERO,
//!     0,
//! )
//! .expect("seed deposit");
//!
//! let quote = pool
//!     .quote_swap(AssetIndex::Base, AssetIndex::Quote, Amount::new(100 * unit), 0)
//!     .expect("quote");
//! assert!(quote.amount_out() < Amount::new(100 * unit));
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Shares`](domain::Shares), [`BasisPoints`](domain::BasisPoints), quote types |
//! | [`math`] | Newton-Raphson solvers for the StableSwap invariant |
//! | [`pool`] | [`StablePool`](pool::StablePool) and locked-profit accounting |
//! | [`strategy`] | [`YieldStrategy`](strategy::YieldStrategy) over a [`Vault`](traits::Vault), plus the in-memory [`SimVault`](strategy::SimVault) |
//! | [`optimizer`] | [`HybridOptimizer`](optimizer::HybridOptimizer) split-allocation search and atomic execution |
//! | [`config`] | Validated configuration for pool, strategy, and optimizer |
//! | [`traits`] | Seams: [`Vault`](traits::Vault), [`ReserveSource`](traits::ReserveSource) |
//! | [`error`] | [`EngineError`](error::EngineError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types |

pub mod config;
pub mod domain;
pub mod error;
pub mod math;
pub mod optimizer;
pub mod pool;
pub mod prelude;
pub mod strategy;
pub mod traits;

#[cfg(test)]
mod proptest_properties;

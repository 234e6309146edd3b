//! Yield strategy and the simulated vault that backs it in tests.

mod sim_vault;
mod yield_strategy;

pub use sim_vault::SimVault;
pub use yield_strategy::YieldStrategy;

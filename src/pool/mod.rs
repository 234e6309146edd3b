//! StableSwap pool state machine and its locked-profit accounting.

mod locked_profit;
mod stable_pool;

pub use locked_profit::LockedProfitTracker;
pub use stable_pool::StablePool;

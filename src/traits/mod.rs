//! Core abstractions at the collaborator seams.

mod reserve_source;
mod vault;

pub use reserve_source::{NoReserves, ReserveSource};
pub use vault::Vault;

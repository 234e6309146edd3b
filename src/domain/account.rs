//! Caller identity.

use core::fmt;

/// An opaque 32-byte account identifier.
///
/// Used for the per-caller cooldown on liquidity-changing operations and
/// as the typed identity a strategy presents when reporting.  The engine
/// never interprets the bytes.
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::AccountId;
///
/// let a = AccountId::from_bytes([1u8; 32]);
/// let b = AccountId::from_bytes([1u8; 32]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Creates an `AccountId` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First four bytes are enough to tell accounts apart in logs.
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}…",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

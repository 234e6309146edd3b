//! Fixed two-asset indexing.

use core::fmt;

/// Identifies one of the pool's two assets.
///
/// The pool is fixed at two assets.  [`AssetIndex::Base`] (index 0) is the
/// asset the yield strategy borrows against; [`AssetIndex::Quote`]
/// (index 1) is always fully liquid in the pool.
///
/// # Examples
///
/// ```
/// use tidal_amm::domain::AssetIndex;
///
/// assert_eq!(AssetIndex::Base.other(), AssetIndex::Quote);
/// assert_eq!(AssetIndex::Quote.as_usize(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AssetIndex {
    /// Asset 0 — partially lent to the yield strategy.
    Base = 0,
    /// Asset 1 — fully liquid.
    Quote = 1,
}

impl AssetIndex {
    /// Returns the counter-asset.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            Self::Base => Self::Quote,
            Self::Quote => Self::Base,
        }
    }

    /// Returns the array index for this asset.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        *self as usize
    }

}

impl fmt::Display for AssetIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Quote => write!(f, "quote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_flips() {
        assert_eq!(AssetIndex::Base.other(), AssetIndex::Quote);
        assert_eq!(AssetIndex::Quote.other(), AssetIndex::Base);
    }

    #[test]
    fn as_usize_matches_repr() {
        assert_eq!(AssetIndex::Base.as_usize(), 0);
        assert_eq!(AssetIndex::Quote.as_usize(), 1);
    }

}

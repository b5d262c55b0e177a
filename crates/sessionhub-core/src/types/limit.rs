//! Ceiling resolution types.

use serde::{Deserialize, Serialize};

/// A resolved ceiling on a live entity count.
///
/// One type models every ceiling in the system: the global connected-client
/// ceiling, the global session ceiling, and a session's member capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Limit {
    /// A fixed maximum count.
    Fixed(u32),
    /// No limit.
    Unlimited,
}

impl Limit {
    /// Check whether a given live count leaves no room for one more entity.
    pub fn is_exceeded_by(&self, count: u32) -> bool {
        match self {
            Self::Fixed(max) => count >= *max,
            Self::Unlimited => false,
        }
    }

    /// Return the numeric limit, or `None` for unlimited.
    pub fn as_max(&self) -> Option<u32> {
        match self {
            Self::Fixed(max) => Some(*max),
            Self::Unlimited => None,
        }
    }
}

impl From<u32> for Limit {
    /// Convert a `u32` to a `Limit`. `0` means unlimited.
    fn from(value: u32) -> Self {
        if value == 0 {
            Self::Unlimited
        } else {
            Self::Fixed(value)
        }
    }
}

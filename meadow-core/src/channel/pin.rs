//! Physical pin identity

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of one physical pin on a controller
///
/// Boards decide how raw values are assigned. Display names are not part
/// of the identity: two names that map to the same physical channel must
/// map to the same `PinId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PinId(u32);

impl PinId {
    /// Create a pin identity from its raw key
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw key
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for PinId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin#{}", self.0)
    }
}

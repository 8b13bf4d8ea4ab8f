//! Declarative reservation requests

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::channel::{ChannelKind, PinId};

/// One pin and the role a port wants it for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelAssignment {
    /// Pin to reserve
    pub pin: PinId,
    /// Role to reserve it for
    pub kind: ChannelKind,
}

impl ChannelAssignment {
    /// Create an assignment
    pub const fn new(pin: PinId, kind: ChannelKind) -> Self {
        Self { pin, kind }
    }
}

//! Registry configuration
//!
//! Plain data, constructible in `const` context so a registry configured
//! at the composition root can still live in a `static`.

pub mod assignment;

pub use assignment::ChannelAssignment;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What releasing a free pin does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReleasePolicy {
    /// Releasing a free pin succeeds and does nothing
    #[default]
    Idempotent,
    /// Releasing a free pin reports `NotReserved`
    Strict,
}

/// Registry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Behaviour of `release` on a pin that is not reserved
    pub release_policy: ReleasePolicy,
}

impl RegistryConfig {
    /// Idempotent release
    pub const DEFAULT: Self = Self {
        release_policy: ReleasePolicy::Idempotent,
    };
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

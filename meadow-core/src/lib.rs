//! Board-agnostic channel ownership for Meadow targets
//!
//! This crate holds the one piece of logic every target shares: which
//! physical pin is in use, for what, and who gives it back.
//!
//! - Channel registry: the reservation table and its typed errors
//! - Port lifecycle: claims that release exactly once, ports built on them
//! - Registry configuration
//!
//! A target creates one registry at its composition root and hands it by
//! shared reference to every port constructor:
//!
//! ```ignore
//! static REGISTRY: SharedRegistry = SharedRegistry::new();
//!
//! let led = Port::open(&REGISTRY, &[ChannelAssignment::new(PinId::new(4), ChannelKind::Digital)], |_| {
//!     Ok::<_, Infallible>(LedDriver::default())
//! })?;
//! ```

#![no_std]
#![deny(unsafe_code)]

// This must go first so the macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod channel;
pub mod config;
pub mod port;

pub use channel::{
    ChannelKind, ChannelRegistry, ChannelReservation, ChannelSet, ChannelTable, PinId,
    ReservationError, ReservationState, ShardedRegistry, SharedRegistry, DEFAULT_CAPACITY,
};
pub use config::{ChannelAssignment, RegistryConfig, ReleasePolicy};
pub use port::{ChannelClaim, ClaimGroup, Port, PortDriver, PortError, MAX_PORT_CHANNELS};

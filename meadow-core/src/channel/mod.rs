//! Channel registry
//!
//! Tracks which physical pin is reserved for which channel kind. The table
//! only holds active reservations: a pin with no entry is free.

pub mod error;
pub mod kind;
pub mod pin;
pub mod registry;
pub mod sharded;

pub use error::ReservationError;
pub use kind::{ChannelKind, ChannelReservation, ChannelSet, ReservationState};
pub use pin::PinId;
pub use registry::{ChannelRegistry, SharedRegistry, DEFAULT_CAPACITY};
pub use sharded::ShardedRegistry;

/// Reservation table as seen by port constructors
///
/// Ports only need these four operations, so they take the table as
/// `&dyn ChannelTable` and work with any registry layout.
pub trait ChannelTable: Sync {
    /// Reserve `pin` for `kind`
    ///
    /// Fails with [`ReservationError::ChannelInUse`] if the pin is already
    /// reserved. A failed reserve leaves the table unchanged.
    fn reserve(&self, pin: PinId, kind: ChannelKind) -> Result<(), ReservationError>;

    /// Return `pin` to the free pool
    fn release(&self, pin: PinId) -> Result<(), ReservationError>;

    /// Current state of `pin`
    fn query(&self, pin: PinId) -> ReservationState;

    /// Active reservation for `pin`, if any
    fn reservation(&self, pin: PinId) -> Option<ChannelReservation>;
}

//! Reservation errors

use core::fmt;

use super::kind::ChannelKind;
use super::pin::PinId;

/// Errors returned by reservation table operations
///
/// All of these are recoverable. Contention for a pin is an expected
/// runtime condition and is reported to the caller, never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReservationError {
    /// The pin is already reserved
    ChannelInUse {
        /// Requested pin
        pin: PinId,
        /// Kind the pin is currently reserved for
        existing_kind: ChannelKind,
    },
    /// Release of a pin that was not reserved (strict release policy only)
    NotReserved {
        /// Released pin
        pin: PinId,
    },
    /// `ChannelKind::None` passed to a reservation
    InvalidChannelKind {
        /// Requested pin
        pin: PinId,
    },
    /// No room left in the table
    TableFull {
        /// Requested pin
        pin: PinId,
    },
}

impl ReservationError {
    /// Pin the failed operation was about
    pub fn pin(&self) -> PinId {
        match *self {
            ReservationError::ChannelInUse { pin, .. }
            | ReservationError::NotReserved { pin }
            | ReservationError::InvalidChannelKind { pin }
            | ReservationError::TableFull { pin } => pin,
        }
    }
}

impl fmt::Display for ReservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationError::ChannelInUse { pin, existing_kind } => {
                write!(f, "{pin} is already reserved as {existing_kind}")
            }
            ReservationError::NotReserved { pin } => write!(f, "{pin} is not reserved"),
            ReservationError::InvalidChannelKind { pin } => {
                write!(f, "{pin} cannot be reserved without a channel kind")
            }
            ReservationError::TableFull { pin } => {
                write!(f, "no reservation slot left for {pin}")
            }
        }
    }
}

impl core::error::Error for ReservationError {}

//! Simulator errors

use core::convert::Infallible;
use std::fmt;

use meadow_core::{ChannelKind, PinId, PortError, ReservationError};

/// Errors from simulated ports and board operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// No pin of that name or alias on the board
    UnknownPin(String),
    /// The pin exists but cannot serve that channel kind
    UnsupportedChannel {
        /// Pin name as requested
        pin: String,
        /// Requested kind
        kind: ChannelKind,
    },
    /// The registry refused a reservation
    Reservation(ReservationError),
    /// Simulated hardware setup failed after the pin was reserved
    InitFailed(PinId),
    /// A value outside what the port accepts
    OutOfRange,
    /// The transport behind a bus port failed
    BusFault,
    /// The port has been closed
    Closed,
}

impl From<ReservationError> for SimError {
    fn from(e: ReservationError) -> Self {
        SimError::Reservation(e)
    }
}

impl From<PortError<SimError>> for SimError {
    fn from(e: PortError<SimError>) -> Self {
        match e {
            PortError::Reservation(e) => SimError::Reservation(e),
            PortError::NoChannels | PortError::TooManyChannels { .. } => SimError::OutOfRange,
            PortError::Init(e) => e,
            PortError::Closed => SimError::Closed,
        }
    }
}

impl From<PortError<Infallible>> for SimError {
    fn from(e: PortError<Infallible>) -> Self {
        match e {
            PortError::Reservation(e) => SimError::Reservation(e),
            PortError::NoChannels | PortError::TooManyChannels { .. } => SimError::OutOfRange,
            PortError::Init(never) => match never {},
            PortError::Closed => SimError::Closed,
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownPin(name) => write!(f, "no pin named {name}"),
            SimError::UnsupportedChannel { pin, kind } => {
                write!(f, "{pin} does not support {kind}")
            }
            SimError::Reservation(e) => write!(f, "{e}"),
            SimError::InitFailed(pin) => write!(f, "simulated hardware fault on {pin}"),
            SimError::OutOfRange => f.write_str("value out of range"),
            SimError::BusFault => f.write_str("bus transport failed"),
            SimError::Closed => f.write_str("port is closed"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Reservation(e) => Some(e),
            _ => None,
        }
    }
}

impl embedded_hal::digital::Error for SimError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

//! In-process simulator target for Meadow
//!
//! Runs the same reservation and port lifecycle as a hardware target, with
//! pins backed by an in-memory signal bank instead of registers. Useful for
//! driver tests and for exercising contention without a board attached.
//!
//! # Usage
//!
//! ```ignore
//! let description = BoardDescription::simulator()?;
//! let board = SimBoard::new(description, global_registry());
//!
//! let mut led = board.create_digital_output("D04", DigitalOutputConfig::default())?;
//! led.set_high()?;
//! ```

#![deny(unsafe_code)]

// This must go first so the macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod analog;
pub mod board;
pub mod bus;
pub mod description;
pub mod digital;
pub mod error;
pub mod pwm;
pub mod signal;
pub mod transport;

pub use analog::SimAnalogInput;
pub use board::SimBoard;
pub use bus::{SimI2cBus, SimSerialPort, SimSpiBus};
pub use description::{BoardDescription, BoardError, PinEntry};
pub use digital::{SimDigitalInput, SimDigitalOutput};
pub use error::SimError;
pub use pwm::SimPwm;
pub use signal::SignalBank;
pub use transport::LoopbackTransport;

use meadow_core::SharedRegistry;

/// Reservation table for the whole process
static REGISTRY: SharedRegistry = SharedRegistry::new();

/// The process-wide registry
///
/// Boards built on it share pin ownership with every other board in the
/// process. Tests that need isolation build their own registry instead.
pub fn global_registry() -> &'static SharedRegistry {
    &REGISTRY
}

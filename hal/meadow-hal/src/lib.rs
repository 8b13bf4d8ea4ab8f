//! Meadow Hardware Abstraction Layer
//!
//! This crate defines the port contracts that every Meadow target
//! implements. A port is the consumer-facing handle for one configured use
//! of one or more pins; how the pins were claimed is not visible here (see
//! `meadow-core`), only what a configured port can do.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers / application code             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  meadow-hal (this crate - contracts)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  meadow-sim   │       │ board targets │
//! │ (in-process)  │       │ (F7, Linux..) │
//! └───────────────┘       └───────────────┘
//!         │                       │
//!         └───────────┬───────────┘
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  meadow-core (channel registry)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::DigitalOutputPort`], [`gpio::DigitalInputPort`] - Digital I/O
//! - [`analog::AnalogInputPort`] - Analog sampling
//! - [`pwm::PwmPort`] - Pulse-width modulation
//! - [`spi::SpiBus`], [`i2c::I2cBus`] - Serial buses
//! - [`uart::SerialPort`] - UART serial ports
//! - [`transport::BusTransport`] - Raw byte exchange underneath bus ports

#![no_std]
#![deny(unsafe_code)]

pub mod analog;
pub mod gpio;
pub mod i2c;
pub mod pwm;
pub mod spi;
pub mod transport;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use analog::AnalogInputPort;
pub use gpio::{DigitalInputPort, DigitalOutputPort};
pub use i2c::I2cBus;
pub use pwm::PwmPort;
pub use spi::SpiBus;
pub use transport::BusTransport;
pub use uart::SerialPort;

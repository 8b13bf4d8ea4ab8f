//! Simulated board
//!
//! Every `create_*` constructor follows the same sequence a hardware
//! target does: resolve the name, check the pin can serve the channel,
//! reserve through the registry, then set up the (simulated) hardware. A
//! failure at any step leaves no reservation behind.

use meadow_core::{ChannelAssignment, ChannelKind, ChannelTable, PinId, Port};
use meadow_hal::gpio::{DigitalInputConfig, DigitalOutputConfig};
use meadow_hal::i2c::I2cSpeed;
use meadow_hal::pwm::{PwmConfig, DUTY_FULL};
use meadow_hal::spi::SpiConfig;
use meadow_hal::uart::SerialConfig;
use meadow_hal::BusTransport;

use crate::analog::{AnalogDriver, SimAnalogInput, REFERENCE_MILLIVOLTS};
use crate::bus::{I2cDriver, SerialDriver, SimI2cBus, SimSerialPort, SimSpiBus, SpiDriver};
use crate::description::{BoardDescription, PinEntry};
use crate::digital::{InputDriver, OutputDriver, SimDigitalInput, SimDigitalOutput};
use crate::error::SimError;
use crate::pwm::{PwmDriver, SimPwm};
use crate::signal::SignalBank;

/// An in-process board
pub struct SimBoard<'r> {
    description: BoardDescription,
    table: &'r dyn ChannelTable,
    signals: SignalBank,
}

impl<'r> SimBoard<'r> {
    /// Create a board whose ports reserve through `table`
    ///
    /// The description's `[registry]` settings are not applied to `table`,
    /// which may be shared with other boards. Build it with
    /// [`BoardDescription::build_registry`] to honour them.
    pub fn new(description: BoardDescription, table: &'r dyn ChannelTable) -> Self {
        info!("sim board {} up", description.name());
        Self {
            description,
            table,
            signals: SignalBank::new(),
        }
    }

    /// Board description
    pub fn description(&self) -> &BoardDescription {
        &self.description
    }

    /// Reservation table the board's ports use
    pub fn table(&self) -> &'r dyn ChannelTable {
        self.table
    }

    /// Simulated electrical state
    pub fn signals(&self) -> &SignalBank {
        &self.signals
    }

    /// Look a pin up by name or alias
    pub fn pin(&self, name: &str) -> Result<&PinEntry, SimError> {
        self.description
            .pin(name)
            .ok_or_else(|| SimError::UnknownPin(name.to_owned()))
    }

    /// Drive an external signal into `name`
    pub fn drive(&self, name: &str, high: bool) -> Result<(), SimError> {
        let id = self.pin(name)?.id;
        self.signals.set_level(id, high);
        Ok(())
    }

    /// Apply an external voltage to `name`
    pub fn apply_millivolts(&self, name: &str, millivolts: u32) -> Result<(), SimError> {
        let id = self.pin(name)?.id;
        self.signals.set_millivolts(id, millivolts);
        Ok(())
    }

    /// Make the next port setup on `name` fail after its pins are reserved
    pub fn inject_fault(&self, name: &str) -> Result<(), SimError> {
        let id = self.pin(name)?.id;
        self.signals.inject_fault(id);
        Ok(())
    }

    fn assignment(&self, name: &str, kind: ChannelKind) -> Result<ChannelAssignment, SimError> {
        let entry = self.pin(name)?;
        if !entry.channels.contains(kind) {
            return Err(SimError::UnsupportedChannel {
                pin: name.to_owned(),
                kind,
            });
        }
        Ok(ChannelAssignment::new(entry.id, kind))
    }

    // Hardware setup shared by every port: honour injected faults
    fn power_up(&self, pins: impl Iterator<Item = PinId>) -> Result<(), SimError> {
        for pin in pins {
            if self.signals.take_fault(pin) {
                warn!("injected fault on {}", pin);
                return Err(SimError::InitFailed(pin));
            }
        }
        Ok(())
    }

    /// Create a digital output on `name`
    pub fn create_digital_output(
        &self,
        name: &str,
        config: DigitalOutputConfig,
    ) -> Result<SimDigitalOutput<'_>, SimError> {
        let assignment = self.assignment(name, ChannelKind::Digital)?;
        let port = Port::open(self.table, &[assignment], |claims| {
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(OutputDriver::new(assignment.pin, &self.signals, config))
        })?;
        debug!("digital output on {}", assignment.pin);
        Ok(SimDigitalOutput::new(port))
    }

    /// Create a digital input on `name`
    pub fn create_digital_input(
        &self,
        name: &str,
        config: DigitalInputConfig,
    ) -> Result<SimDigitalInput<'_>, SimError> {
        let assignment = self.assignment(name, ChannelKind::Digital)?;
        let port = Port::open(self.table, &[assignment], |claims| {
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(InputDriver::new(assignment.pin, &self.signals, config))
        })?;
        debug!("digital input on {}", assignment.pin);
        Ok(SimDigitalInput::new(port))
    }

    /// Create an analog input on `name`
    pub fn create_analog_input(&self, name: &str) -> Result<SimAnalogInput<'_>, SimError> {
        let assignment = self.assignment(name, ChannelKind::Analog)?;
        let port = Port::open(self.table, &[assignment], |claims| {
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(AnalogDriver::new(
                assignment.pin,
                &self.signals,
                REFERENCE_MILLIVOLTS,
            ))
        })?;
        debug!("analog input on {}", assignment.pin);
        Ok(SimAnalogInput::new(port))
    }

    /// Create a PWM output on `name`
    pub fn create_pwm(&self, name: &str, config: PwmConfig) -> Result<SimPwm<'_>, SimError> {
        let assignment = self.assignment(name, ChannelKind::Pwm)?;
        let port = Port::open(self.table, &[assignment], |claims| {
            if config.frequency == 0 || config.duty_permille > DUTY_FULL {
                return Err(SimError::OutOfRange);
            }
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(PwmDriver::new(assignment.pin, &self.signals, config))
        })?;
        debug!("pwm on {}", assignment.pin);
        Ok(SimPwm::new(port))
    }

    /// Create an SPI bus on clock, data-out and data-in pins
    pub fn create_spi_bus<T: BusTransport>(
        &self,
        clk: &str,
        copi: &str,
        cipo: &str,
        config: SpiConfig,
        transport: T,
    ) -> Result<SimSpiBus<'_, T>, SimError> {
        let assignments = [
            self.assignment(clk, ChannelKind::Spi)?,
            self.assignment(copi, ChannelKind::Spi)?,
            self.assignment(cipo, ChannelKind::Spi)?,
        ];
        let port = Port::open(self.table, &assignments, |claims| {
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(SpiDriver::new(transport, config))
        })?;
        debug!("spi bus on {}", assignments[0].pin);
        Ok(SimSpiBus::new(port))
    }

    /// Create an I2C bus on clock and data pins
    pub fn create_i2c_bus<T: BusTransport>(
        &self,
        scl: &str,
        sda: &str,
        speed: I2cSpeed,
        transport: T,
    ) -> Result<SimI2cBus<'_, T>, SimError> {
        let assignments = [
            self.assignment(scl, ChannelKind::I2c)?,
            self.assignment(sda, ChannelKind::I2c)?,
        ];
        let port = Port::open(self.table, &assignments, |claims| {
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(I2cDriver::new(transport, speed))
        })?;
        debug!("i2c bus on {}", assignments[0].pin);
        Ok(SimI2cBus::new(port))
    }

    /// Create a serial port on transmit and receive pins
    pub fn create_serial_port<T: BusTransport>(
        &self,
        tx: &str,
        rx: &str,
        config: SerialConfig,
        transport: T,
    ) -> Result<SimSerialPort<'_, T>, SimError> {
        let assignments = [
            self.assignment(tx, ChannelKind::Uart)?,
            self.assignment(rx, ChannelKind::Uart)?,
        ];
        let port = Port::open(self.table, &assignments, |claims| {
            if config.baud_rate == 0 {
                return Err(SimError::OutOfRange);
            }
            self.power_up(claims.pins())?;
            Ok::<_, SimError>(SerialDriver::new(transport, config))
        })?;
        debug!("serial port on {}", assignments[0].pin);
        Ok(SimSerialPort::new(port))
    }
}

//! Simulated digital ports

use meadow_core::{PinId, Port, PortDriver};
use meadow_hal::gpio::{
    DigitalInputConfig, DigitalInputPort, DigitalOutputConfig, DigitalOutputPort, OutputType,
    ResistorMode,
};

use crate::error::SimError;
use crate::signal::SignalBank;

pub(crate) struct OutputDriver<'b> {
    pin: PinId,
    signals: &'b SignalBank,
    config: DigitalOutputConfig,
    state: bool,
}

impl<'b> OutputDriver<'b> {
    pub(crate) fn new(pin: PinId, signals: &'b SignalBank, config: DigitalOutputConfig) -> Self {
        let mut driver = Self {
            pin,
            signals,
            config,
            state: config.initial_state,
        };
        driver.write(config.initial_state);
        driver
    }

    fn write(&mut self, high: bool) {
        self.state = high;
        match (self.config.output_type, high) {
            // Open drain releases the line instead of driving it high
            (OutputType::OpenDrain, true) => self.signals.float(self.pin),
            _ => self.signals.set_level(self.pin, high),
        }
    }
}

impl PortDriver for OutputDriver<'_> {
    fn shutdown(&mut self) {
        self.signals.float(self.pin);
    }
}

/// Digital output on a simulated pin
pub struct SimDigitalOutput<'b> {
    port: Port<'b, OutputDriver<'b>>,
}

impl<'b> SimDigitalOutput<'b> {
    pub(crate) fn new(port: Port<'b, OutputDriver<'b>>) -> Self {
        Self { port }
    }

    /// Output pin
    pub fn pin(&self) -> Option<PinId> {
        self.port.pin()
    }

    /// Whether the port is still open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Release the pin, leaving it undriven
    pub fn close(&mut self) {
        self.port.close();
    }
}

impl DigitalOutputPort for SimDigitalOutput<'_> {
    type Error = SimError;

    fn set_state(&mut self, high: bool) -> Result<(), SimError> {
        self.port.driver_mut()?.write(high);
        Ok(())
    }

    fn state(&self) -> bool {
        self.port.driver().map(|driver| driver.state).unwrap_or(false)
    }
}

impl embedded_hal::digital::ErrorType for SimDigitalOutput<'_> {
    type Error = SimError;
}

impl embedded_hal::digital::OutputPin for SimDigitalOutput<'_> {
    fn set_low(&mut self) -> Result<(), SimError> {
        DigitalOutputPort::set_state(self, false)
    }

    fn set_high(&mut self) -> Result<(), SimError> {
        DigitalOutputPort::set_state(self, true)
    }
}

impl embedded_hal::digital::StatefulOutputPin for SimDigitalOutput<'_> {
    fn is_set_high(&mut self) -> Result<bool, SimError> {
        Ok(self.port.driver()?.state)
    }

    fn is_set_low(&mut self) -> Result<bool, SimError> {
        Ok(!self.port.driver()?.state)
    }
}

pub(crate) struct InputDriver<'b> {
    pin: PinId,
    signals: &'b SignalBank,
    config: DigitalInputConfig,
}

impl<'b> InputDriver<'b> {
    pub(crate) fn new(pin: PinId, signals: &'b SignalBank, config: DigitalInputConfig) -> Self {
        Self {
            pin,
            signals,
            config,
        }
    }

    fn sample(&self) -> bool {
        self.signals
            .level(self.pin)
            .unwrap_or(self.config.resistor == ResistorMode::PullUp)
    }
}

impl PortDriver for InputDriver<'_> {}

/// Digital input on a simulated pin
pub struct SimDigitalInput<'b> {
    port: Port<'b, InputDriver<'b>>,
}

impl<'b> SimDigitalInput<'b> {
    pub(crate) fn new(port: Port<'b, InputDriver<'b>>) -> Self {
        Self { port }
    }

    /// Input pin
    pub fn pin(&self) -> Option<PinId> {
        self.port.pin()
    }

    /// Whether the port is still open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Release the pin
    pub fn close(&mut self) {
        self.port.close();
    }
}

impl DigitalInputPort for SimDigitalInput<'_> {
    type Error = SimError;

    fn read(&self) -> Result<bool, SimError> {
        Ok(self.port.driver()?.sample())
    }
}

impl embedded_hal::digital::ErrorType for SimDigitalInput<'_> {
    type Error = SimError;
}

impl embedded_hal::digital::InputPin for SimDigitalInput<'_> {
    fn is_high(&mut self) -> Result<bool, SimError> {
        self.read()
    }

    fn is_low(&mut self) -> Result<bool, SimError> {
        self.read().map(|high| !high)
    }
}

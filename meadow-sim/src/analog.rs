//! Simulated analog input

use meadow_core::{PinId, Port, PortDriver};
use meadow_hal::analog::AnalogInputPort;

use crate::error::SimError;
use crate::signal::SignalBank;

/// Full-scale reading of the simulated converter
pub const REFERENCE_MILLIVOLTS: u32 = 3300;

pub(crate) struct AnalogDriver<'b> {
    pin: PinId,
    signals: &'b SignalBank,
    reference: u32,
}

impl<'b> AnalogDriver<'b> {
    pub(crate) fn new(pin: PinId, signals: &'b SignalBank, reference: u32) -> Self {
        Self {
            pin,
            signals,
            reference,
        }
    }

    fn sample(&self) -> u32 {
        // Clamp to the converter's range like a saturating ADC
        self.signals.millivolts(self.pin).min(self.reference)
    }
}

impl PortDriver for AnalogDriver<'_> {}

/// Analog input on a simulated pin
pub struct SimAnalogInput<'b> {
    port: Port<'b, AnalogDriver<'b>>,
}

impl<'b> SimAnalogInput<'b> {
    pub(crate) fn new(port: Port<'b, AnalogDriver<'b>>) -> Self {
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

impl AnalogInputPort for SimAnalogInput<'_> {
    type Error = SimError;

    fn read_millivolts(&mut self) -> Result<u32, SimError> {
        Ok(self.port.driver()?.sample())
    }

    fn reference_millivolts(&self) -> u32 {
        REFERENCE_MILLIVOLTS
    }
}

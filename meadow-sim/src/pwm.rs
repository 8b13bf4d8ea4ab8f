//! Simulated PWM output
//!
//! The waveform itself is not simulated. While running, the pin reads as
//! its active level whenever the duty cycle is non-zero; stopped, it sits
//! at the idle level.

use meadow_core::{PinId, Port, PortDriver};
use meadow_hal::pwm::{PwmConfig, PwmPort, DUTY_FULL};

use crate::error::SimError;
use crate::signal::SignalBank;

pub(crate) struct PwmDriver<'b> {
    pin: PinId,
    signals: &'b SignalBank,
    config: PwmConfig,
    running: bool,
}

impl<'b> PwmDriver<'b> {
    pub(crate) fn new(pin: PinId, signals: &'b SignalBank, config: PwmConfig) -> Self {
        let driver = Self {
            pin,
            signals,
            config,
            running: false,
        };
        driver.update_level();
        driver
    }

    fn update_level(&self) {
        let active = self.running && self.config.duty_permille > 0;
        self.signals
            .set_level(self.pin, active != self.config.inverted);
    }
}

impl PortDriver for PwmDriver<'_> {
    fn shutdown(&mut self) {
        self.running = false;
        self.signals.float(self.pin);
    }
}

/// PWM output on a simulated pin
pub struct SimPwm<'b> {
    port: Port<'b, PwmDriver<'b>>,
}

impl<'b> SimPwm<'b> {
    pub(crate) fn new(port: Port<'b, PwmDriver<'b>>) -> Self {
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

    /// Stop the output and release the pin
    pub fn close(&mut self) {
        self.port.close();
    }

    fn config(&self) -> Option<PwmConfig> {
        self.port.driver().ok().map(|driver| driver.config)
    }
}

impl PwmPort for SimPwm<'_> {
    type Error = SimError;

    fn set_frequency(&mut self, hz: u32) -> Result<(), SimError> {
        if hz == 0 {
            return Err(SimError::OutOfRange);
        }
        self.port.driver_mut()?.config.frequency = hz;
        Ok(())
    }

    fn frequency(&self) -> u32 {
        self.config().map_or(0, |config| config.frequency)
    }

    fn set_duty_permille(&mut self, duty: u16) -> Result<(), SimError> {
        if duty > DUTY_FULL {
            return Err(SimError::OutOfRange);
        }
        let driver = self.port.driver_mut()?;
        driver.config.duty_permille = duty;
        driver.update_level();
        Ok(())
    }

    fn duty_permille(&self) -> u16 {
        self.config().map_or(0, |config| config.duty_permille)
    }

    fn start(&mut self) -> Result<(), SimError> {
        let driver = self.port.driver_mut()?;
        driver.running = true;
        driver.update_level();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SimError> {
        let driver = self.port.driver_mut()?;
        driver.running = false;
        driver.update_level();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.port.driver().is_ok_and(|driver| driver.running)
    }
}

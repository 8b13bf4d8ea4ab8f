//! PWM contract

/// Maximum duty cycle, in permille
pub const DUTY_FULL: u16 = 1000;

/// PWM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// Output frequency in Hz
    pub frequency: u32,
    /// Duty cycle in permille (0-1000)
    pub duty_permille: u16,
    /// Output is active-low
    pub inverted: bool,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency: 100,
            duty_permille: 500,
            inverted: false,
        }
    }
}

/// PWM output port
pub trait PwmPort {
    /// Error type for PWM operations
    type Error;

    /// Change the output frequency
    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Current output frequency in Hz
    fn frequency(&self) -> u32;

    /// Change the duty cycle (0-1000 permille)
    fn set_duty_permille(&mut self, duty: u16) -> Result<(), Self::Error>;

    /// Current duty cycle in permille
    fn duty_permille(&self) -> u16;

    /// Start generating the waveform
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Stop generating the waveform, leaving the pin idle
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Whether the waveform is running
    fn is_running(&self) -> bool;
}

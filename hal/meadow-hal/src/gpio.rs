//! Digital port contracts
//!
//! Ports are fallible: a port that has been closed, or whose target lost
//! access to the pin, reports it through its `Error` type instead of
//! silently ignoring the call.

/// Output driver topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputType {
    /// Actively driven high and low
    #[default]
    PushPull,
    /// Driven low, floats high (needs an external pull-up)
    OpenDrain,
}

/// Internal resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResistorMode {
    /// No internal resistor, the input floats
    #[default]
    Disabled,
    /// Internal pull-up enabled
    PullUp,
    /// Internal pull-down enabled
    PullDown,
}

/// Digital output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitalOutputConfig {
    /// Level driven as soon as the port is created
    pub initial_state: bool,
    /// Driver topology
    pub output_type: OutputType,
}

/// Digital input configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitalInputConfig {
    /// Internal resistor
    pub resistor: ResistorMode,
}

/// Digital output port
pub trait DigitalOutputPort {
    /// Error type for output operations
    type Error;

    /// Drive the pin to the given logic level
    fn set_state(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Last level written to the pin
    fn state(&self) -> bool;

    /// Drive the pin high (logic 1)
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_state(true)
    }

    /// Drive the pin low (logic 0)
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_state(false)
    }

    /// Invert the current level
    fn toggle(&mut self) -> Result<(), Self::Error> {
        let next = !self.state();
        self.set_state(next)
    }
}

/// Digital input port
pub trait DigitalInputPort {
    /// Error type for input operations
    type Error;

    /// Sample the pin, `true` when it reads high
    fn read(&self) -> Result<bool, Self::Error>;

    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> Result<bool, Self::Error> {
        self.read()
    }

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> Result<bool, Self::Error> {
        self.read().map(|high| !high)
    }
}

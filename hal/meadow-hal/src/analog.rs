//! Analog input contract

/// Analog input port
///
/// Values are reported in millivolts so callers do not need to know the
/// converter resolution of the target.
pub trait AnalogInputPort {
    /// Error type for sampling
    type Error;

    /// Take one sample, in millivolts
    fn read_millivolts(&mut self) -> Result<u32, Self::Error>;

    /// Full-scale reference voltage in millivolts
    fn reference_millivolts(&self) -> u32;
}

//! I2C bus contract

/// I2C bus controller
pub trait I2cBus {
    /// Error type for I2C operations
    type Error;

    /// Write bytes to the device at a 7-bit address
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read bytes from the device at a 7-bit address
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read with a repeated start
    ///
    /// Typically a register address followed by the register contents.
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Configured bus speed
    fn speed(&self) -> I2cSpeed;
}

/// I2C bus speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cSpeed {
    /// 100 kHz
    #[default]
    Standard,
    /// 400 kHz
    Fast,
    /// 1 MHz
    FastPlus,
}

impl I2cSpeed {
    /// Clock frequency in Hz
    pub fn hz(self) -> u32 {
        match self {
            I2cSpeed::Standard => 100_000,
            I2cSpeed::Fast => 400_000,
            I2cSpeed::FastPlus => 1_000_000,
        }
    }
}

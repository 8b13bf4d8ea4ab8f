//! SPI bus contract
//!
//! A bus port owns its clock and data pins. Chip-select lines are ordinary
//! digital outputs claimed separately by the peripheral driver.

/// SPI bus controller
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Full-duplex exchange
    ///
    /// Clocks out `tx` while filling `rx`. When the buffers differ in
    /// length the shorter one is padded (zeros out) or truncated (bytes in
    /// discarded).
    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), Self::Error>;

    /// Write without keeping the bytes clocked in
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.exchange(data, &mut [])
    }

    /// Read while clocking out zeros
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.exchange(&[], buf)
    }

    /// Active bus configuration
    fn config(&self) -> SpiConfig;
}

/// SPI clock mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Clock idles high
    pub fn polarity_high(self) -> bool {
        matches!(self, SpiMode::Mode2 | SpiMode::Mode3)
    }

    /// Data captured on the second clock edge
    pub fn second_edge(self) -> bool {
        matches!(self, SpiMode::Mode1 | SpiMode::Mode3)
    }
}

/// SPI bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock speed in kHz
    pub speed_khz: u32,
    /// Clock mode
    pub mode: SpiMode,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            speed_khz: 1_000,
            mode: SpiMode::Mode0,
        }
    }
}

//! UART serial port contract

/// Serial port
pub trait SerialPort {
    /// Error type for serial operations
    type Error;

    /// Queue bytes for transmission, returning how many were accepted
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Copy received bytes into `buf`, returning how many were copied
    ///
    /// Never waits: returns `Ok(0)` when nothing has been received.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Number of received bytes waiting to be read
    fn bytes_to_read(&self) -> usize;

    /// Wait until queued bytes have left the transmitter
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Active line configuration
    fn config(&self) -> SerialConfig;
}

/// Serial line configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Data bits per frame
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Stop bits per frame
    pub stop_bits: StopBits,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

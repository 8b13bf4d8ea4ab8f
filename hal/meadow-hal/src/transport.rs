//! Raw bus transport capability
//!
//! Bus ports (SPI, I2C, UART) do not frame bytes themselves on every
//! target. Where the framing lives in a coprocessor, a kernel driver or a
//! simulator, the port forwards through a [`BusTransport`].

/// Byte exchange with whatever sits on the other end of a bus
pub trait BusTransport {
    /// Error type for the transport
    type Error;

    /// Send `tx` and collect the reply into `rx`
    ///
    /// Returns the number of reply bytes written to `rx`.
    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Self::Error>;
}

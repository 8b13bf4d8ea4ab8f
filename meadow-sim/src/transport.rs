//! Bus transports for the simulator

use core::convert::Infallible;

use meadow_hal::BusTransport;

/// Echoes every transmitted byte back as the reply
///
/// Behaves like a jumper between data-out and data-in: an SPI exchange
/// reads back what it wrote, a serial port receives its own output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackTransport {
    exchanges: usize,
}

impl LoopbackTransport {
    /// Create a loopback
    pub const fn new() -> Self {
        Self { exchanges: 0 }
    }

    /// Number of exchanges performed so far
    pub fn exchanges(&self) -> usize {
        self.exchanges
    }
}

impl BusTransport for LoopbackTransport {
    type Error = Infallible;

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Infallible> {
        self.exchanges += 1;
        let n = tx.len().min(rx.len());
        rx[..n].copy_from_slice(&tx[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_truncates_to_shorter_buffer() {
        let mut loopback = LoopbackTransport::new();
        let mut rx = [0u8; 2];
        assert_eq!(loopback.exchange(&[1, 2, 3], &mut rx), Ok(2));
        assert_eq!(rx, [1, 2]);

        let mut rx = [0u8; 4];
        assert_eq!(loopback.exchange(&[9], &mut rx), Ok(1));
        assert_eq!(rx, [9, 0, 0, 0]);
        assert_eq!(loopback.exchanges(), 2);
    }
}

//! Simulated bus ports
//!
//! None of these move bits on a wire. Each forwards whole transactions to
//! a [`BusTransport`], which plays the part of the device (or the other end
//! of the cable).
//!
//! I2C frames are `[address << 1 | rw, payload...]`. A write-read is a
//! single frame with the read bit set that carries the write bytes as
//! payload; the transport's reply fills the read buffer.

use heapless::{Deque, Vec};
use meadow_core::{PinId, Port, PortDriver};
use meadow_hal::i2c::{I2cBus, I2cSpeed};
use meadow_hal::spi::{SpiBus, SpiConfig};
use meadow_hal::uart::{SerialConfig, SerialPort};
use meadow_hal::BusTransport;

use crate::error::SimError;

/// Largest I2C frame, address byte included
pub const I2C_FRAME_MAX: usize = 64;

/// Receive buffer size of a simulated serial port
pub const SERIAL_RX_CAPACITY: usize = 256;

const I2C_READ: u8 = 0x01;

pub(crate) struct SpiDriver<T> {
    transport: T,
    config: SpiConfig,
}

impl<T: BusTransport> SpiDriver<T> {
    pub(crate) fn new(transport: T, config: SpiConfig) -> Self {
        Self { transport, config }
    }
}

impl<T: BusTransport> PortDriver for SpiDriver<T> {}

/// SPI bus on simulated clock and data pins
pub struct SimSpiBus<'b, T: BusTransport> {
    port: Port<'b, SpiDriver<T>>,
}

impl<'b, T: BusTransport> SimSpiBus<'b, T> {
    pub(crate) fn new(port: Port<'b, SpiDriver<T>>) -> Self {
        Self { port }
    }

    /// Clock, data-out and data-in pins, in that order
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.port.pins()
    }

    /// Whether the port is still open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Release all three pins
    pub fn close(&mut self) {
        self.port.close();
    }
}

impl<T: BusTransport> SpiBus for SimSpiBus<'_, T> {
    type Error = SimError;

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), SimError> {
        let driver = self.port.driver_mut()?;
        let n = driver
            .transport
            .exchange(tx, rx)
            .map_err(|_| SimError::BusFault)?
            .min(rx.len());
        rx[n..].fill(0);
        Ok(())
    }

    fn config(&self) -> SpiConfig {
        self.port
            .driver()
            .map(|driver| driver.config)
            .unwrap_or_default()
    }
}

pub(crate) struct I2cDriver<T> {
    transport: T,
    speed: I2cSpeed,
}

impl<T: BusTransport> I2cDriver<T> {
    pub(crate) fn new(transport: T, speed: I2cSpeed) -> Self {
        Self { transport, speed }
    }

    fn transaction(
        &mut self,
        address: u8,
        read: bool,
        payload: &[u8],
        reply: &mut [u8],
    ) -> Result<(), SimError> {
        if address > 0x7F {
            return Err(SimError::OutOfRange);
        }
        let mut frame: Vec<u8, I2C_FRAME_MAX> = Vec::new();
        let header = (address << 1) | if read { I2C_READ } else { 0 };
        frame.push(header).map_err(|_| SimError::OutOfRange)?;
        frame
            .extend_from_slice(payload)
            .map_err(|_| SimError::OutOfRange)?;

        let n = self
            .transport
            .exchange(&frame, reply)
            .map_err(|_| SimError::BusFault)?;
        if n < reply.len() {
            // Device stopped acknowledging before the buffer was full
            debug!("i2c device {} replied short", address);
            return Err(SimError::BusFault);
        }
        Ok(())
    }
}

impl<T: BusTransport> PortDriver for I2cDriver<T> {}

/// I2C bus on simulated clock and data pins
pub struct SimI2cBus<'b, T: BusTransport> {
    port: Port<'b, I2cDriver<T>>,
}

impl<'b, T: BusTransport> SimI2cBus<'b, T> {
    pub(crate) fn new(port: Port<'b, I2cDriver<T>>) -> Self {
        Self { port }
    }

    /// Clock and data pins, in that order
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.port.pins()
    }

    /// Whether the port is still open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Release both pins
    pub fn close(&mut self) {
        self.port.close();
    }
}

impl<T: BusTransport> I2cBus for SimI2cBus<'_, T> {
    type Error = SimError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), SimError> {
        self.port
            .driver_mut()?
            .transaction(address, false, data, &mut [])
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), SimError> {
        self.port.driver_mut()?.transaction(address, true, &[], buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), SimError> {
        self.port
            .driver_mut()?
            .transaction(address, true, write_data, read_buf)
    }

    fn speed(&self) -> I2cSpeed {
        self.port
            .driver()
            .map(|driver| driver.speed)
            .unwrap_or_default()
    }
}

pub(crate) struct SerialDriver<T> {
    transport: T,
    config: SerialConfig,
    rx: Deque<u8, SERIAL_RX_CAPACITY>,
}

impl<T: BusTransport> SerialDriver<T> {
    pub(crate) fn new(transport: T, config: SerialConfig) -> Self {
        Self {
            transport,
            config,
            rx: Deque::new(),
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<usize, SimError> {
        let mut reply = [0u8; SERIAL_RX_CAPACITY];
        let n = self
            .transport
            .exchange(data, &mut reply)
            .map_err(|_| SimError::BusFault)?
            .min(reply.len());

        let mut dropped = 0usize;
        for &byte in &reply[..n] {
            if self.rx.push_back(byte).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("serial receive overrun, {} bytes lost", dropped);
        }
        Ok(data.len())
    }

    fn drain(&mut self, buf: &mut [u8]) -> usize {
        let mut copied = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop_front() {
                Some(byte) => *slot = byte,
                None => break,
            }
            copied += 1;
        }
        copied
    }
}

impl<T: BusTransport> PortDriver for SerialDriver<T> {
    fn shutdown(&mut self) {
        self.rx.clear();
    }
}

/// Serial port on simulated transmit and receive pins
///
/// Whatever the transport replies to a write lands in the receive buffer,
/// so a [`LoopbackTransport`](crate::LoopbackTransport) reads back its own
/// output.
pub struct SimSerialPort<'b, T: BusTransport> {
    port: Port<'b, SerialDriver<T>>,
}

impl<'b, T: BusTransport> SimSerialPort<'b, T> {
    pub(crate) fn new(port: Port<'b, SerialDriver<T>>) -> Self {
        Self { port }
    }

    /// Transmit and receive pins, in that order
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.port.pins()
    }

    /// Whether the port is still open
    pub fn is_open(&self) -> bool {
        self.port.is_open()
    }

    /// Discard pending input and release both pins
    pub fn close(&mut self) {
        self.port.close();
    }
}

impl<T: BusTransport> SerialPort for SimSerialPort<'_, T> {
    type Error = SimError;

    fn write(&mut self, data: &[u8]) -> Result<usize, SimError> {
        self.port.driver_mut()?.send(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SimError> {
        Ok(self.port.driver_mut()?.drain(buf))
    }

    fn bytes_to_read(&self) -> usize {
        self.port.driver().map_or(0, |driver| driver.rx.len())
    }

    fn flush(&mut self) -> Result<(), SimError> {
        self.port.driver()?;
        Ok(())
    }

    fn config(&self) -> SerialConfig {
        self.port
            .driver()
            .map(|driver| driver.config)
            .unwrap_or_default()
    }
}

//! Simulated electrical state
//!
//! Stands in for the pad registers of a real controller: outputs write
//! levels here, inputs read them back, and tests drive external signals
//! into it.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use meadow_core::PinId;

#[derive(Debug, Default)]
struct Signals {
    levels: HashMap<PinId, bool>,
    millivolts: HashMap<PinId, u32>,
    // Pins whose next hardware setup fails
    faults: HashSet<PinId>,
}

/// Levels, voltages and injected faults for every pin of a board
pub struct SignalBank {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Signals>>,
}

impl Default for SignalBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBank {
    /// Create an empty bank: nothing driven, 0 mV everywhere, no faults
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Signals::default())),
        }
    }

    /// Logic level on `pin`, if anything has driven it
    pub fn level(&self, pin: PinId) -> Option<bool> {
        self.inner
            .lock(|cell| cell.borrow().levels.get(&pin).copied())
    }

    /// Drive `pin` to a logic level
    pub fn set_level(&self, pin: PinId, high: bool) {
        self.inner.lock(|cell| {
            cell.borrow_mut().levels.insert(pin, high);
        });
    }

    /// Stop driving `pin`
    pub fn float(&self, pin: PinId) {
        self.inner.lock(|cell| {
            cell.borrow_mut().levels.remove(&pin);
        });
    }

    /// Voltage on `pin` in millivolts
    pub fn millivolts(&self, pin: PinId) -> u32 {
        self.inner
            .lock(|cell| cell.borrow().millivolts.get(&pin).copied().unwrap_or(0))
    }

    /// Apply a voltage to `pin`
    pub fn set_millivolts(&self, pin: PinId, millivolts: u32) {
        self.inner.lock(|cell| {
            cell.borrow_mut().millivolts.insert(pin, millivolts);
        });
    }

    /// Make the next hardware setup on `pin` fail
    pub fn inject_fault(&self, pin: PinId) {
        self.inner.lock(|cell| {
            cell.borrow_mut().faults.insert(pin);
        });
    }

    /// Consume a pending fault on `pin`, returning whether there was one
    pub fn take_fault(&self, pin: PinId) -> bool {
        self.inner
            .lock(|cell| cell.borrow_mut().faults.remove(&pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_fires_once() {
        let bank = SignalBank::new();
        let pin = PinId::new(3);
        bank.inject_fault(pin);
        assert!(bank.take_fault(pin));
        assert!(!bank.take_fault(pin));
    }

    #[test]
    fn test_levels() {
        let bank = SignalBank::new();
        let pin = PinId::new(1);
        assert_eq!(bank.level(pin), None);
        bank.set_level(pin, true);
        assert_eq!(bank.level(pin), Some(true));
        bank.float(pin);
        assert_eq!(bank.level(pin), None);
        assert_eq!(bank.millivolts(pin), 0);
    }
}

//! Reservation table
//!
//! One blocking mutex guards the whole table. Every operation takes the
//! lock once, does its check-then-mutate inside a single closure, and
//! returns; nothing calls out of the registry while the lock is held,
//! logging included.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use heapless::{LinearMap, Vec};

use super::error::ReservationError;
use super::kind::{ChannelKind, ChannelReservation, ReservationState};
use super::pin::PinId;
use super::ChannelTable;
use crate::config::{RegistryConfig, ReleasePolicy};

/// Table capacity of [`SharedRegistry`]
pub const DEFAULT_CAPACITY: usize = 64;

/// Registry shareable across threads and interrupt contexts
pub type SharedRegistry = ChannelRegistry<CriticalSectionRawMutex, DEFAULT_CAPACITY>;

type Table<const N: usize> = LinearMap<PinId, ChannelReservation, N>;

/// Table entry that breaks the registry's own invariants
#[derive(Debug, Clone, Copy)]
struct Corruption {
    key: PinId,
    entry: ChannelReservation,
}

type Checked<T> = Result<T, Corruption>;

/// Process-wide pin reservation table
///
/// `M` selects the lock (see `embassy_sync::blocking_mutex::raw`), `N` the
/// maximum number of simultaneous reservations.
pub struct ChannelRegistry<M: RawMutex, const N: usize> {
    config: RegistryConfig,
    table: Mutex<M, RefCell<Table<N>>>,
}

impl<M: RawMutex, const N: usize> Default for ChannelRegistry<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> ChannelRegistry<M, N> {
    /// Create an empty registry with the default configuration
    pub const fn new() -> Self {
        Self::with_config(RegistryConfig::DEFAULT)
    }

    /// Create an empty registry
    pub const fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            table: Mutex::new(RefCell::new(LinearMap::new())),
        }
    }

    /// Active configuration
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Reserve `pin` for `kind`
    ///
    /// The lookup and the insertion happen under one lock acquisition, so
    /// of any number of concurrent reserves on the same pin exactly one
    /// succeeds. On failure the table is left untouched.
    ///
    /// # Panics
    ///
    /// If the table holds an entry that contradicts its key or a reserved
    /// entry without a kind. Either means the registry itself is broken
    /// and continuing could hand one pin to two ports.
    pub fn reserve(&self, pin: PinId, kind: ChannelKind) -> Result<(), ReservationError> {
        if !kind.is_defined() {
            debug!("reserve {} refused: no channel kind", pin);
            return Err(ReservationError::InvalidChannelKind { pin });
        }

        let outcome = self.table.lock(|cell| -> Checked<Result<(), ReservationError>> {
            let mut table = cell.borrow_mut();

            if let Some(entry) = table.get(&pin).copied() {
                check_entry(pin, entry)?;
                match entry.state {
                    ReservationState::Reserved => {
                        return Ok(Err(ReservationError::ChannelInUse {
                            pin,
                            existing_kind: entry.kind,
                        }));
                    }
                    // Stale remnant: entries are removed on release
                    ReservationState::Free => {
                        table.remove(&pin);
                    }
                }
            }

            Ok(table
                .insert(pin, ChannelReservation::reserved(pin, kind))
                .map(|_| ())
                .map_err(|_| ReservationError::TableFull { pin }))
        });

        let result = unwrap_or_corrupt(outcome);
        match result {
            Ok(()) => trace!("reserved {} as {}", pin, kind),
            Err(e) => debug!("reserve {} as {} refused: {}", pin, kind, e),
        }
        result
    }

    /// Return `pin` to the free pool
    ///
    /// With [`ReleasePolicy::Idempotent`] releasing a free pin succeeds and
    /// changes nothing. With [`ReleasePolicy::Strict`] it reports
    /// [`ReservationError::NotReserved`].
    pub fn release(&self, pin: PinId) -> Result<(), ReservationError> {
        let outcome = self.table.lock(|cell| -> Checked<Option<ChannelReservation>> {
            let removed = cell.borrow_mut().remove(&pin);
            if let Some(entry) = removed {
                check_entry(pin, entry)?;
            }
            Ok(removed.filter(|entry| entry.state == ReservationState::Reserved))
        });

        match unwrap_or_corrupt(outcome) {
            Some(entry) => {
                trace!("released {} ({})", pin, entry.kind);
                Ok(())
            }
            None => match self.config.release_policy {
                ReleasePolicy::Idempotent => {
                    trace!("release of free {} ignored", pin);
                    Ok(())
                }
                ReleasePolicy::Strict => {
                    debug!("release of free {} rejected", pin);
                    Err(ReservationError::NotReserved { pin })
                }
            },
        }
    }

    /// Current state of `pin`
    pub fn query(&self, pin: PinId) -> ReservationState {
        self.reservation(pin)
            .map_or(ReservationState::Free, |entry| entry.state)
    }

    /// Active reservation for `pin`, if any
    pub fn reservation(&self, pin: PinId) -> Option<ChannelReservation> {
        self.table.lock(|cell| {
            cell.borrow()
                .get(&pin)
                .copied()
                .filter(|entry| entry.state == ReservationState::Reserved)
        })
    }

    /// Snapshot of all active reservations
    pub fn reservations(&self) -> Vec<ChannelReservation, N> {
        self.table.lock(|cell| {
            cell.borrow()
                .values()
                .filter(|entry| entry.state == ReservationState::Reserved)
                .copied()
                .collect()
        })
    }

    /// Number of active reservations
    pub fn len(&self) -> usize {
        self.table.lock(|cell| {
            cell.borrow()
                .values()
                .filter(|entry| entry.state == ReservationState::Reserved)
                .count()
        })
    }

    /// Whether no pin is reserved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of simultaneous reservations
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex + Sync, const N: usize> ChannelTable for ChannelRegistry<M, N> {
    fn reserve(&self, pin: PinId, kind: ChannelKind) -> Result<(), ReservationError> {
        ChannelRegistry::reserve(self, pin, kind)
    }

    fn release(&self, pin: PinId) -> Result<(), ReservationError> {
        ChannelRegistry::release(self, pin)
    }

    fn query(&self, pin: PinId) -> ReservationState {
        ChannelRegistry::query(self, pin)
    }

    fn reservation(&self, pin: PinId) -> Option<ChannelReservation> {
        ChannelRegistry::reservation(self, pin)
    }
}

fn check_entry(key: PinId, entry: ChannelReservation) -> Checked<()> {
    let mismatched = entry.pin != key;
    let kindless = entry.state == ReservationState::Reserved && !entry.kind.is_defined();
    if mismatched || kindless {
        return Err(Corruption { key, entry });
    }
    Ok(())
}

// Raised after the lock is released so the panic never unwinds through it
fn unwrap_or_corrupt<T>(outcome: Checked<T>) -> T {
    match outcome {
        Ok(value) => value,
        Err(Corruption { key, entry }) => {
            error!("reservation table corrupt at {}", key);
            panic!(
                "reservation table corrupt: entry under {} is {:?}",
                key, entry
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::ToString;

    type TestRegistry = ChannelRegistry<CriticalSectionRawMutex, 8>;

    const PIN_D04: PinId = PinId::new(4);
    const PIN_D05: PinId = PinId::new(5);
    const PIN_D07: PinId = PinId::new(7);
    const PIN_A01: PinId = PinId::new(101);

    fn strict() -> TestRegistry {
        TestRegistry::with_config(RegistryConfig {
            release_policy: ReleasePolicy::Strict,
        })
    }

    fn plant(registry: &TestRegistry, key: PinId, entry: ChannelReservation) {
        registry.table.lock(|cell| {
            let _ = cell.borrow_mut().insert(key, entry);
        });
    }

    #[test]
    fn test_second_reserve_reports_existing_kind() {
        let registry = TestRegistry::new();
        assert_eq!(registry.reserve(PIN_D04, ChannelKind::Digital), Ok(()));
        assert_eq!(
            registry.reserve(PIN_D04, ChannelKind::Pwm),
            Err(ReservationError::ChannelInUse {
                pin: PIN_D04,
                existing_kind: ChannelKind::Digital,
            })
        );
        // Failed reserve is a no-op
        assert_eq!(
            registry.reservation(PIN_D04).map(|r| r.kind),
            Some(ChannelKind::Digital)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_frees_pin() {
        let registry = TestRegistry::new();
        registry.reserve(PIN_A01, ChannelKind::Analog).unwrap();
        assert_eq!(registry.query(PIN_A01), ReservationState::Reserved);
        assert_eq!(registry.release(PIN_A01), Ok(()));
        assert_eq!(registry.query(PIN_A01), ReservationState::Free);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_double_release_is_noop() {
        let registry = TestRegistry::new();
        registry.reserve(PIN_D04, ChannelKind::Digital).unwrap();
        assert_eq!(registry.release(PIN_D07), Ok(()));
        assert_eq!(registry.release(PIN_D07), Ok(()));
        // Other pins untouched
        assert_eq!(registry.query(PIN_D04), ReservationState::Reserved);
    }

    #[test]
    fn test_rereserve_with_other_kind() {
        let registry = TestRegistry::new();
        registry.reserve(PIN_D05, ChannelKind::Digital).unwrap();
        registry.release(PIN_D05).unwrap();
        assert_eq!(registry.reserve(PIN_D05, ChannelKind::Pwm), Ok(()));
        assert_eq!(
            registry.reservation(PIN_D05),
            Some(ChannelReservation::reserved(PIN_D05, ChannelKind::Pwm))
        );
    }

    #[test]
    fn test_none_kind_rejected() {
        let registry = TestRegistry::new();
        assert_eq!(
            registry.reserve(PIN_D04, ChannelKind::None),
            Err(ReservationError::InvalidChannelKind { pin: PIN_D04 })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_full_table() {
        let registry = ChannelRegistry::<CriticalSectionRawMutex, 2>::new();
        registry.reserve(PIN_D04, ChannelKind::Digital).unwrap();
        registry.reserve(PIN_D05, ChannelKind::Digital).unwrap();
        assert_eq!(
            registry.reserve(PIN_D07, ChannelKind::Digital),
            Err(ReservationError::TableFull { pin: PIN_D07 })
        );
        assert_eq!(registry.len(), 2);

        // Releasing makes room again
        registry.release(PIN_D04).unwrap();
        assert_eq!(registry.reserve(PIN_D07, ChannelKind::Digital), Ok(()));
    }

    #[test]
    fn test_strict_release() {
        let registry = strict();
        assert_eq!(
            registry.release(PIN_D07),
            Err(ReservationError::NotReserved { pin: PIN_D07 })
        );
        registry.reserve(PIN_D07, ChannelKind::Uart).unwrap();
        assert_eq!(registry.release(PIN_D07), Ok(()));
        assert_eq!(
            registry.release(PIN_D07),
            Err(ReservationError::NotReserved { pin: PIN_D07 })
        );
    }

    #[test]
    fn test_stale_free_entry_is_replaced() {
        let registry = TestRegistry::new();
        plant(
            &registry,
            PIN_D04,
            ChannelReservation {
                pin: PIN_D04,
                kind: ChannelKind::Spi,
                state: ReservationState::Free,
            },
        );
        assert_eq!(registry.query(PIN_D04), ReservationState::Free);
        assert_eq!(registry.reserve(PIN_D04, ChannelKind::I2c), Ok(()));
        assert_eq!(
            registry.reservation(PIN_D04).map(|r| r.kind),
            Some(ChannelKind::I2c)
        );
    }

    #[test]
    fn test_strict_release_of_stale_entry() {
        let registry = strict();
        plant(
            &registry,
            PIN_D04,
            ChannelReservation {
                pin: PIN_D04,
                kind: ChannelKind::Spi,
                state: ReservationState::Free,
            },
        );
        assert_eq!(
            registry.release(PIN_D04),
            Err(ReservationError::NotReserved { pin: PIN_D04 })
        );
    }

    #[test]
    #[should_panic(expected = "reservation table corrupt")]
    fn test_mismatched_entry_panics() {
        let registry = TestRegistry::new();
        plant(
            &registry,
            PIN_D04,
            ChannelReservation::reserved(PIN_D05, ChannelKind::Digital),
        );
        let _ = registry.reserve(PIN_D04, ChannelKind::Digital);
    }

    #[test]
    #[should_panic(expected = "reservation table corrupt")]
    fn test_kindless_reservation_panics() {
        let registry = TestRegistry::new();
        plant(
            &registry,
            PIN_D07,
            ChannelReservation::reserved(PIN_D07, ChannelKind::None),
        );
        let _ = registry.release(PIN_D07);
    }

    #[test]
    fn test_snapshot_lists_active_reservations() {
        let registry = TestRegistry::new();
        registry.reserve(PIN_D04, ChannelKind::Digital).unwrap();
        registry.reserve(PIN_A01, ChannelKind::Analog).unwrap();
        registry.reserve(PIN_D07, ChannelKind::Pwm).unwrap();
        registry.release(PIN_D07).unwrap();

        let snapshot = registry.reservations();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().any(|r| r.pin == PIN_D04));
        assert!(snapshot.iter().any(|r| r.pin == PIN_A01));
        assert_eq!(registry.capacity(), 8);
    }

    #[test]
    fn test_error_message_names_pin_and_kind() {
        let err = ReservationError::ChannelInUse {
            pin: PIN_D04,
            existing_kind: ChannelKind::Digital,
        };
        assert_eq!(err.to_string(), "pin#4 is already reserved as digital");
        assert_eq!(err.pin(), PIN_D04);
    }
}

//! Sharded reservation table
//!
//! Splits the table into independent registries so that reservations on
//! different pins rarely contend for the same lock. A pin always hashes to
//! the same shard, which keeps every per-pin operation atomic.

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::Vec;

use super::error::ReservationError;
use super::kind::{ChannelKind, ChannelReservation, ReservationState};
use super::pin::PinId;
use super::registry::ChannelRegistry;
use super::ChannelTable;
use crate::config::RegistryConfig;

/// Reservation table split over `SHARDS` locks of `N` entries each
pub struct ShardedRegistry<M: RawMutex, const SHARDS: usize, const N: usize> {
    shards: [ChannelRegistry<M, N>; SHARDS],
}

impl<M: RawMutex, const SHARDS: usize, const N: usize> ShardedRegistry<M, SHARDS, N> {
    /// Create an empty sharded registry
    ///
    /// # Panics
    ///
    /// If `SHARDS` is zero.
    pub fn new(config: RegistryConfig) -> Self {
        assert!(SHARDS > 0, "sharded registry needs at least one shard");
        Self {
            shards: core::array::from_fn(|_| ChannelRegistry::with_config(config)),
        }
    }

    fn shard(&self, pin: PinId) -> &ChannelRegistry<M, N> {
        &self.shards[pin.raw() as usize % SHARDS]
    }

    /// Reserve `pin` for `kind`, see [`ChannelRegistry::reserve`]
    pub fn reserve(&self, pin: PinId, kind: ChannelKind) -> Result<(), ReservationError> {
        self.shard(pin).reserve(pin, kind)
    }

    /// Release `pin`, see [`ChannelRegistry::release`]
    pub fn release(&self, pin: PinId) -> Result<(), ReservationError> {
        self.shard(pin).release(pin)
    }

    /// Current state of `pin`
    pub fn query(&self, pin: PinId) -> ReservationState {
        self.shard(pin).query(pin)
    }

    /// Active reservation for `pin`, if any
    pub fn reservation(&self, pin: PinId) -> Option<ChannelReservation> {
        self.shard(pin).reservation(pin)
    }

    /// Snapshot of all active reservations, shard by shard
    ///
    /// Shards are locked one after another, so the result is not a single
    /// atomic view of the whole table. At most `TOTAL` entries are
    /// returned; use `TOTAL = SHARDS * N` to always get every reservation.
    pub fn reservations<const TOTAL: usize>(&self) -> Vec<ChannelReservation, TOTAL> {
        let mut all = Vec::new();
        for shard in &self.shards {
            for entry in shard.reservations() {
                if all.push(entry).is_err() {
                    return all;
                }
            }
        }
        all
    }

    /// Number of active reservations
    pub fn len(&self) -> usize {
        self.shards.iter().map(ChannelRegistry::len).sum()
    }

    /// Whether no pin is reserved
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(ChannelRegistry::is_empty)
    }
}

impl<M: RawMutex + Sync, const SHARDS: usize, const N: usize> ChannelTable
    for ShardedRegistry<M, SHARDS, N>
{
    fn reserve(&self, pin: PinId, kind: ChannelKind) -> Result<(), ReservationError> {
        ShardedRegistry::reserve(self, pin, kind)
    }

    fn release(&self, pin: PinId) -> Result<(), ReservationError> {
        ShardedRegistry::release(self, pin)
    }

    fn query(&self, pin: PinId) -> ReservationState {
        ShardedRegistry::query(self, pin)
    }

    fn reservation(&self, pin: PinId) -> Option<ChannelReservation> {
        ShardedRegistry::reservation(self, pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    type TestRegistry = ShardedRegistry<CriticalSectionRawMutex, 4, 4>;

    #[test]
    fn test_pins_spread_over_shards() {
        let registry = TestRegistry::new(RegistryConfig::DEFAULT);
        // Five pins on the same shard would overflow it
        for raw in 0..8 {
            registry.reserve(PinId::new(raw), ChannelKind::Digital).unwrap();
        }
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.reservations::<16>().len(), 8);
    }

    #[test]
    fn test_snapshot_stops_at_capacity() {
        let registry = TestRegistry::new(RegistryConfig::DEFAULT);
        for raw in 0..6 {
            registry.reserve(PinId::new(raw), ChannelKind::Digital).unwrap();
        }
        assert_eq!(registry.reservations::<3>().len(), 3);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_shard_is_stable_per_pin() {
        let registry = TestRegistry::new(RegistryConfig::DEFAULT);
        let pin = PinId::new(13);
        registry.reserve(pin, ChannelKind::Can).unwrap();
        assert_eq!(
            registry.reserve(pin, ChannelKind::Digital),
            Err(ReservationError::ChannelInUse {
                pin,
                existing_kind: ChannelKind::Can,
            })
        );
        registry.release(pin).unwrap();
        assert_eq!(registry.query(pin), ReservationState::Free);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_full_shard_does_not_block_others() {
        let registry = TestRegistry::new(RegistryConfig::DEFAULT);
        // 0, 4, 8, 12 all land on shard 0
        for raw in [0, 4, 8, 12] {
            registry.reserve(PinId::new(raw), ChannelKind::Digital).unwrap();
        }
        assert_eq!(
            registry.reserve(PinId::new(16), ChannelKind::Digital),
            Err(ReservationError::TableFull {
                pin: PinId::new(16)
            })
        );
        assert_eq!(registry.reserve(PinId::new(1), ChannelKind::Digital), Ok(()));
    }
}

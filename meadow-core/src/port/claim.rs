//! Single-pin claims

use core::fmt;

use crate::channel::{ChannelKind, ChannelTable, PinId, ReservationError};

/// A held reservation on one pin
///
/// The registry owns the table entry; the claim is the obligation to give
/// it back. [`release`](Self::release) gives it back and can be called any
/// number of times. Dropping a claim that was never released releases it.
pub struct ChannelClaim<'r> {
    table: &'r dyn ChannelTable,
    pin: PinId,
    kind: ChannelKind,
    held: bool,
}

impl<'r> ChannelClaim<'r> {
    /// Reserve `pin` for `kind` and hold the reservation
    pub fn acquire(
        table: &'r dyn ChannelTable,
        pin: PinId,
        kind: ChannelKind,
    ) -> Result<Self, ReservationError> {
        table.reserve(pin, kind)?;
        Ok(Self {
            table,
            pin,
            kind,
            held: true,
        })
    }

    /// Claimed pin
    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Role the pin was claimed for
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Whether the claim still holds its reservation
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Give the reservation back
    ///
    /// Only the first call reaches the registry. Never fails: a pin that
    /// was released behind the claim's back is logged and ignored.
    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;

        if let Err(e) = self.table.release(self.pin) {
            warn!("claim on {} found it already released: {}", self.pin, e);
        }
    }
}

impl Drop for ChannelClaim<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ChannelClaim<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelClaim")
            .field("pin", &self.pin)
            .field("kind", &self.kind)
            .field("held", &self.held)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ReservationState, SharedRegistry};
    use crate::config::{RegistryConfig, ReleasePolicy};

    const PIN: PinId = PinId::new(12);

    #[test]
    fn test_drop_releases() {
        let registry = SharedRegistry::new();
        {
            let claim = ChannelClaim::acquire(&registry, PIN, ChannelKind::Pwm).unwrap();
            assert!(claim.is_held());
            assert_eq!(registry.query(PIN), ReservationState::Reserved);
        }
        assert_eq!(registry.query(PIN), ReservationState::Free);
    }

    #[test]
    fn test_release_only_once() {
        let registry = SharedRegistry::new();
        let mut claim = ChannelClaim::acquire(&registry, PIN, ChannelKind::Digital).unwrap();
        claim.release();
        assert!(!claim.is_held());

        // Someone else takes the pin; a second release must not free it
        registry.reserve(PIN, ChannelKind::Analog).unwrap();
        claim.release();
        drop(claim);
        assert_eq!(
            registry.reservation(PIN).map(|r| r.kind),
            Some(ChannelKind::Analog)
        );
    }

    #[test]
    fn test_failed_acquire_leaves_owner_alone() {
        let registry = SharedRegistry::new();
        let _owner = ChannelClaim::acquire(&registry, PIN, ChannelKind::Digital).unwrap();
        let err = ChannelClaim::acquire(&registry, PIN, ChannelKind::Pwm).unwrap_err();
        assert_eq!(
            err,
            ReservationError::ChannelInUse {
                pin: PIN,
                existing_kind: ChannelKind::Digital,
            }
        );
        assert_eq!(registry.query(PIN), ReservationState::Reserved);
    }

    #[test]
    fn test_release_behind_back_under_strict_policy() {
        let registry = SharedRegistry::with_config(RegistryConfig {
            release_policy: ReleasePolicy::Strict,
        });
        let claim = ChannelClaim::acquire(&registry, PIN, ChannelKind::Uart).unwrap();
        registry.release(PIN).unwrap();
        // Strict registry rejects the second release; the claim swallows it
        drop(claim);
        assert!(registry.is_empty());
    }
}

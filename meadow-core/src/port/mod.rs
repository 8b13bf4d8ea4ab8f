//! Port lifecycle
//!
//! A port exists only while it holds claims on its pins. Construction is
//! reserve-then-initialise; if initialisation fails the claims are
//! released before the error reaches the caller. Teardown is
//! shutdown-then-release and runs exactly once, whether the port is closed
//! explicitly, dropped, or unwound past.

pub mod claim;
pub mod group;

pub use claim::ChannelClaim;
pub use group::{ClaimGroup, MAX_PORT_CHANNELS};

use core::convert::Infallible;
use core::fmt;

use crate::channel::{ChannelKind, ChannelTable, PinId, ReservationError};
use crate::config::ChannelAssignment;

/// Target-specific half of a port
pub trait PortDriver {
    /// Put the hardware back in a safe idle state
    ///
    /// Called once, before the port's pins are released.
    fn shutdown(&mut self) {}
}

impl PortDriver for () {}

/// Errors from opening or using a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError<E = Infallible> {
    /// A pin could not be reserved
    Reservation(ReservationError),
    /// The request named no pins
    NoChannels,
    /// The request named more pins than one port can hold
    TooManyChannels {
        /// Number of pins requested
        requested: usize,
    },
    /// The pins were reserved but the hardware could not be set up
    Init(E),
    /// The port has been closed
    Closed,
}

impl<E> From<ReservationError> for PortError<E> {
    fn from(e: ReservationError) -> Self {
        PortError::Reservation(e)
    }
}

impl<E: fmt::Display> fmt::Display for PortError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortError::Reservation(e) => write!(f, "reservation failed: {e}"),
            PortError::NoChannels => f.write_str("port requested no pins"),
            PortError::TooManyChannels { requested } => write!(
                f,
                "port requested {requested} pins, at most {MAX_PORT_CHANNELS} allowed"
            ),
            PortError::Init(e) => write!(f, "initialisation failed: {e}"),
            PortError::Closed => f.write_str("port is closed"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for PortError<E> {}

impl PortError {
    // Claim errors carry no init error, so they fit any `PortError<E>`
    fn widen<E>(self) -> PortError<E> {
        match self {
            PortError::Reservation(e) => PortError::Reservation(e),
            PortError::NoChannels => PortError::NoChannels,
            PortError::TooManyChannels { requested } => PortError::TooManyChannels { requested },
            PortError::Init(never) => match never {},
            PortError::Closed => PortError::Closed,
        }
    }
}

/// An open port: its pin claims plus the driver using them
pub struct Port<'r, D: PortDriver> {
    claims: ClaimGroup<'r>,
    driver: D,
    open: bool,
}

impl<'r, D: PortDriver> Port<'r, D> {
    /// Reserve `assignments` and initialise the driver
    ///
    /// `init` runs only once every pin is reserved. If it fails, the pins
    /// are released and its error is returned as [`PortError::Init`]. A
    /// request with no pins, or more than [`MAX_PORT_CHANNELS`], is refused
    /// before anything is reserved.
    pub fn open<E, F>(
        table: &'r dyn ChannelTable,
        assignments: &[ChannelAssignment],
        init: F,
    ) -> Result<Self, PortError<E>>
    where
        F: FnOnce(&ClaimGroup<'r>) -> Result<D, E>,
    {
        let claims =
            ClaimGroup::acquire(table, assignments).map_err(PortError::<Infallible>::widen)?;

        match init(&claims) {
            Ok(driver) => Ok(Self {
                claims,
                driver,
                open: true,
            }),
            Err(e) => {
                if let Some(pin) = claims.pins().next() {
                    warn!("port init on {} failed, releasing its pins", pin);
                }
                drop(claims);
                Err(PortError::Init(e))
            }
        }
    }

    /// [`open`](Self::open) for a port on a single pin
    pub fn open_single<E, F>(
        table: &'r dyn ChannelTable,
        pin: PinId,
        kind: ChannelKind,
        init: F,
    ) -> Result<Self, PortError<E>>
    where
        F: FnOnce(PinId) -> Result<D, E>,
    {
        Self::open(table, &[ChannelAssignment::new(pin, kind)], |_| init(pin))
    }

    /// Shut the driver down and release the pins
    ///
    /// Safe to call repeatedly; only the first call does anything.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.driver.shutdown();
        self.claims.release();
    }

    /// Whether the port is still open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Pins the port holds (or held, once closed)
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.claims.pins()
    }

    /// Primary pin of the port
    pub fn pin(&self) -> Option<PinId> {
        self.claims.pins().next()
    }

    /// Kind the primary pin was claimed for
    pub fn kind(&self) -> Option<ChannelKind> {
        self.claims.claims().first().map(ChannelClaim::kind)
    }

    /// The driver, while the port is open
    pub fn driver(&self) -> Result<&D, PortError> {
        if self.open {
            Ok(&self.driver)
        } else {
            Err(PortError::Closed)
        }
    }

    /// The driver, mutably, while the port is open
    pub fn driver_mut(&mut self) -> Result<&mut D, PortError> {
        if self.open {
            Ok(&mut self.driver)
        } else {
            Err(PortError::Closed)
        }
    }
}

impl<D: PortDriver> Drop for Port<'_, D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: PortDriver + fmt::Debug> fmt::Debug for Port<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("claims", &self.claims)
            .field("driver", &self.driver)
            .field("open", &self.open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ReservationState, SharedRegistry};

    extern crate std;
    use std::cell::Cell;
    use std::rc::Rc;

    const PIN_D04: PinId = PinId::new(4);
    const PIN_D05: PinId = PinId::new(5);

    /// Counts shutdowns so tests can assert it runs exactly once
    #[derive(Debug)]
    struct Recorder {
        shutdowns: Rc<Cell<u32>>,
    }

    impl PortDriver for Recorder {
        fn shutdown(&mut self) {
            self.shutdowns.set(self.shutdowns.get() + 1);
        }
    }

    #[derive(Debug, PartialEq)]
    struct DirectionFault;

    #[test]
    fn test_open_and_close() {
        let registry = SharedRegistry::new();
        let shutdowns = Rc::new(Cell::new(0));
        let recorder = Recorder {
            shutdowns: shutdowns.clone(),
        };

        let mut port =
            Port::open_single(&registry, PIN_D04, ChannelKind::Digital, |_| {
                Ok::<_, Infallible>(recorder)
            })
            .unwrap();
        assert!(port.is_open());
        assert_eq!(port.pin(), Some(PIN_D04));
        assert_eq!(port.kind(), Some(ChannelKind::Digital));
        assert_eq!(registry.query(PIN_D04), ReservationState::Reserved);

        port.close();
        port.close();
        assert_eq!(shutdowns.get(), 1);
        assert_eq!(registry.query(PIN_D04), ReservationState::Free);
        assert_eq!(port.driver().err(), Some(PortError::Closed));

        drop(port);
        assert_eq!(shutdowns.get(), 1);
    }

    #[test]
    fn test_drop_closes() {
        let registry = SharedRegistry::new();
        let shutdowns = Rc::new(Cell::new(0));
        {
            let recorder = Recorder {
                shutdowns: shutdowns.clone(),
            };
            let _port = Port::open_single(&registry, PIN_D05, ChannelKind::Pwm, |_| {
                Ok::<_, Infallible>(recorder)
            })
            .unwrap();
        }
        assert_eq!(shutdowns.get(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_init_releases_pins() {
        let registry = SharedRegistry::new();
        let assignments = [
            ChannelAssignment::new(PIN_D04, ChannelKind::I2c),
            ChannelAssignment::new(PIN_D05, ChannelKind::I2c),
        ];

        let result = Port::<()>::open(&registry, &assignments, |claims| {
            // Both pins are held while init runs
            assert_eq!(claims.len(), 2);
            Err(DirectionFault)
        });

        assert!(matches!(result, Err(PortError::Init(DirectionFault))));
        assert_eq!(registry.query(PIN_D04), ReservationState::Free);
        assert_eq!(registry.query(PIN_D05), ReservationState::Free);
    }

    #[test]
    fn test_init_not_run_on_conflict() {
        let registry = SharedRegistry::new();
        registry.reserve(PIN_D04, ChannelKind::Analog).unwrap();

        let mut ran = false;
        let result = Port::<()>::open_single(&registry, PIN_D04, ChannelKind::Digital, |_| {
            ran = true;
            Ok::<_, Infallible>(())
        });

        assert!(!ran);
        assert!(matches!(
            result,
            Err(PortError::Reservation(ReservationError::ChannelInUse {
                existing_kind: ChannelKind::Analog,
                ..
            }))
        ));
    }

    #[test]
    fn test_driver_access_while_open() {
        let registry = SharedRegistry::new();
        let mut port = Port::open_single(&registry, PIN_D04, ChannelKind::Digital, |_| {
            Ok::<_, Infallible>(())
        })
        .unwrap();
        assert!(port.driver_mut().is_ok());
        port.close();
        assert!(matches!(port.driver_mut(), Err(PortError::Closed)));
    }

    #[test]
    fn test_empty_request_never_opens() {
        let registry = SharedRegistry::new();
        let mut ran = false;
        let result = Port::<()>::open(&registry, &[], |_| {
            ran = true;
            Ok::<_, Infallible>(())
        });

        assert!(!ran);
        assert!(matches!(result, Err(PortError::NoChannels)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_oversized_request_is_an_error() {
        let registry = SharedRegistry::new();
        let assignments: [ChannelAssignment; 5] = core::array::from_fn(|i| {
            ChannelAssignment::new(PinId::new(i as u32 + 30), ChannelKind::Digital)
        });

        let result = Port::<()>::open(&registry, &assignments, |_| Ok::<_, DirectionFault>(()));
        assert!(matches!(
            result,
            Err(PortError::TooManyChannels { requested: 5 })
        ));
        assert!(registry.is_empty());
    }
}

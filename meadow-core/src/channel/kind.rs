//! Channel kinds and reservation records

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::pin::PinId;

/// Functional role a pin is reserved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum ChannelKind {
    /// No role; never accepted by a reservation
    #[default]
    None = 0,
    /// Digital input or output
    Digital = 1,
    /// Analog input
    Analog = 2,
    /// SPI clock or data line
    Spi = 3,
    /// I2C clock or data line
    I2c = 4,
    /// CAN transmit or receive line
    Can = 5,
    /// UART transmit or receive line
    Uart = 6,
    /// PWM output
    Pwm = 7,
}

impl ChannelKind {
    /// Every kind a pin can be reserved for
    pub const DEFINED: [ChannelKind; 7] = [
        ChannelKind::Digital,
        ChannelKind::Analog,
        ChannelKind::Spi,
        ChannelKind::I2c,
        ChannelKind::Can,
        ChannelKind::Uart,
        ChannelKind::Pwm,
    ];

    /// Get the kind as a byte value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a kind from a byte value
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ChannelKind::None),
            1 => Some(ChannelKind::Digital),
            2 => Some(ChannelKind::Analog),
            3 => Some(ChannelKind::Spi),
            4 => Some(ChannelKind::I2c),
            5 => Some(ChannelKind::Can),
            6 => Some(ChannelKind::Uart),
            7 => Some(ChannelKind::Pwm),
            _ => None,
        }
    }

    /// Whether a pin can be reserved for this kind
    pub const fn is_defined(self) -> bool {
        !matches!(self, ChannelKind::None)
    }

    /// Lowercase name, as used in board descriptions
    pub const fn as_str(self) -> &'static str {
        match self {
            ChannelKind::None => "none",
            ChannelKind::Digital => "digital",
            ChannelKind::Analog => "analog",
            ChannelKind::Spi => "spi",
            ChannelKind::I2c => "i2c",
            ChannelKind::Can => "can",
            ChannelKind::Uart => "uart",
            ChannelKind::Pwm => "pwm",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of channel kinds a pin supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSet(u8);

impl ChannelSet {
    /// No supported kinds
    pub const EMPTY: Self = Self(0);

    /// Add a kind. `ChannelKind::None` is ignored.
    pub const fn with(self, kind: ChannelKind) -> Self {
        if kind.is_defined() {
            Self(self.0 | (1 << kind.as_u8()))
        } else {
            self
        }
    }

    /// Whether `kind` is in the set
    pub const fn contains(self, kind: ChannelKind) -> bool {
        kind.is_defined() && self.0 & (1 << kind.as_u8()) != 0
    }

    /// Number of kinds in the set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the kinds in declaration order
    pub fn iter(self) -> impl Iterator<Item = ChannelKind> {
        ChannelKind::DEFINED
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<ChannelKind> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = ChannelKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, ChannelSet::with)
    }
}

/// Reservation state of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReservationState {
    /// Not reserved (also the state of any pin without a table entry)
    #[default]
    Free,
    /// Reserved by a port
    Reserved,
}

/// One entry of the reservation table
///
/// `kind` never changes for the lifetime of the entry; changing what a pin
/// is used for means releasing it and reserving it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelReservation {
    /// Reserved pin
    pub pin: PinId,
    /// Role the pin is reserved for
    pub kind: ChannelKind,
    /// Entry state
    pub state: ReservationState,
}

impl ChannelReservation {
    pub(crate) const fn reserved(pin: PinId, kind: ChannelKind) -> Self {
        Self {
            pin,
            kind,
            state: ReservationState::Reserved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_byte_round_trip() {
        for kind in ChannelKind::DEFINED {
            assert_eq!(ChannelKind::from_u8(kind.as_u8()), Some(kind));
        }
        assert_eq!(ChannelKind::from_u8(0), Some(ChannelKind::None));
        assert_eq!(ChannelKind::from_u8(8), None);
    }

    #[test]
    fn test_none_is_not_defined() {
        assert!(!ChannelKind::None.is_defined());
        assert!(ChannelKind::DEFINED.iter().all(|k| k.is_defined()));
    }

    #[test]
    fn test_channel_set_ignores_none() {
        let set = ChannelSet::EMPTY
            .with(ChannelKind::None)
            .with(ChannelKind::Digital);
        assert_eq!(set.len(), 1);
        assert!(!set.contains(ChannelKind::None));
        assert!(set.contains(ChannelKind::Digital));
    }

    #[test]
    fn test_channel_set_iter_order() {
        let set: ChannelSet = [ChannelKind::Pwm, ChannelKind::Digital, ChannelKind::Pwm]
            .into_iter()
            .collect();
        let mut kinds = set.iter();
        assert_eq!(kinds.next(), Some(ChannelKind::Digital));
        assert_eq!(kinds.next(), Some(ChannelKind::Pwm));
        assert_eq!(kinds.next(), None);
    }
}

//! Board descriptions
//!
//! A board is described in TOML: its name, registry settings, and a pin
//! table mapping names (and aliases) to physical channel ids.
//!
//! ```toml
//! name = "bench"
//!
//! [registry]
//! release_policy = "strict"
//!
//! [[pins]]
//! name = "D04"
//! id = 4
//! channels = ["digital", "pwm"]
//! aliases = ["PB12"]
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use meadow_core::{ChannelKind, ChannelSet, PinId, RegistryConfig, SharedRegistry};
use serde::Deserialize;

/// Pin table of the bundled simulator board
const SIMULATOR_BOARD: &str = include_str!("../boards/simulator.toml");

#[derive(Debug, Deserialize)]
struct RawBoard {
    name: String,
    #[serde(default)]
    registry: RegistryConfig,
    #[serde(default)]
    pins: Vec<RawPin>,
}

#[derive(Debug, Deserialize)]
struct RawPin {
    name: String,
    id: u32,
    channels: Vec<ChannelKind>,
    #[serde(default)]
    aliases: Vec<String>,
}

/// One physical pin of a board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEntry {
    /// Primary name
    pub name: String,
    /// Physical channel
    pub id: PinId,
    /// Kinds the pin can be reserved for
    pub channels: ChannelSet,
    /// Other names for the same channel
    pub aliases: Vec<String>,
}

/// Errors from loading a board description
#[derive(Debug)]
pub enum BoardError {
    /// Not valid TOML, or not the expected shape
    Parse(toml::de::Error),
    /// A name or alias is used twice
    DuplicateName(String),
    /// Two entries declare the same physical channel
    DuplicateId {
        /// The shared channel
        id: PinId,
        /// Entry declared first
        first: String,
        /// Entry declared second
        second: String,
    },
    /// A pin lists no channel kinds
    NoChannels(String),
}

impl From<toml::de::Error> for BoardError {
    fn from(e: toml::de::Error) -> Self {
        BoardError::Parse(e)
    }
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Parse(e) => write!(f, "invalid board description: {e}"),
            BoardError::DuplicateName(name) => write!(f, "pin name {name} is used twice"),
            BoardError::DuplicateId { id, first, second } => {
                write!(f, "{first} and {second} both declare {id}; use an alias instead")
            }
            BoardError::NoChannels(name) => write!(f, "pin {name} supports no channels"),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Validated board description
#[derive(Debug, Clone)]
pub struct BoardDescription {
    name: String,
    registry: RegistryConfig,
    pins: Vec<PinEntry>,
    // name or alias -> index into `pins`
    names: HashMap<String, usize>,
}

impl BoardDescription {
    /// Parse and validate a TOML description
    pub fn from_toml(text: &str) -> Result<Self, BoardError> {
        let raw: RawBoard = toml::from_str(text)?;

        let mut pins = Vec::with_capacity(raw.pins.len());
        let mut names = HashMap::new();
        let mut ids: HashMap<PinId, String> = HashMap::new();

        for raw_pin in raw.pins {
            let id = PinId::new(raw_pin.id);
            let channels: ChannelSet = raw_pin.channels.iter().copied().collect();
            if channels.is_empty() {
                return Err(BoardError::NoChannels(raw_pin.name));
            }
            if let Some(first) = ids.get(&id) {
                return Err(BoardError::DuplicateId {
                    id,
                    first: first.clone(),
                    second: raw_pin.name,
                });
            }
            ids.insert(id, raw_pin.name.clone());

            let index = pins.len();
            for name in std::iter::once(&raw_pin.name).chain(&raw_pin.aliases) {
                if names.insert(name.clone(), index).is_some() {
                    return Err(BoardError::DuplicateName(name.clone()));
                }
            }

            pins.push(PinEntry {
                name: raw_pin.name,
                id,
                channels,
                aliases: raw_pin.aliases,
            });
        }

        Ok(Self {
            name: raw.name,
            registry: raw.registry,
            pins,
            names,
        })
    }

    /// The bundled simulator board
    pub fn simulator() -> Result<Self, BoardError> {
        Self::from_toml(SIMULATOR_BOARD)
    }

    /// Board name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry settings the board asks for
    pub fn registry_config(&self) -> RegistryConfig {
        self.registry
    }

    /// Empty registry configured with the board's `[registry]` settings
    pub fn build_registry(&self) -> SharedRegistry {
        SharedRegistry::with_config(self.registry)
    }

    /// All pins, in declaration order
    pub fn pins(&self) -> &[PinEntry] {
        &self.pins
    }

    /// Look a pin up by name or alias
    pub fn pin(&self, name: &str) -> Option<&PinEntry> {
        self.names.get(name).map(|&index| &self.pins[index])
    }

    /// Look a pin up by physical channel
    pub fn pin_by_id(&self, id: PinId) -> Option<&PinEntry> {
        self.pins.iter().find(|entry| entry.id == id)
    }
}

impl FromStr for BoardDescription {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_toml(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meadow_core::ReleasePolicy;

    #[test]
    fn test_bundled_board_loads() {
        let board = BoardDescription::simulator().unwrap();
        assert_eq!(board.name(), "meadow-sim");
        assert_eq!(board.pins().len(), 20);
        assert_eq!(board.registry_config().release_policy, ReleasePolicy::Idempotent);
    }

    #[test]
    fn test_alias_maps_to_same_id() {
        let board = BoardDescription::simulator().unwrap();
        let d13 = board.pin("D13").unwrap();
        let sck = board.pin("SCK").unwrap();
        assert_eq!(d13.id, sck.id);
        assert_eq!(d13.name, "D13");
        assert!(sck.channels.contains(ChannelKind::Spi));
    }

    #[test]
    fn test_lookup_by_channel_id() {
        let board = BoardDescription::simulator().unwrap();
        let a03 = board.pin_by_id(PinId::new(103)).unwrap();
        assert_eq!(a03.name, "A03");
        assert!(a03.channels.contains(ChannelKind::Analog));
        assert!(!a03.channels.contains(ChannelKind::Digital));

        let d04 = board.pin_by_id(PinId::new(4)).unwrap();
        assert_eq!(d04.aliases, ["PB12"]);
        assert!(board.pin_by_id(PinId::new(99)).is_none());
    }

    #[test]
    fn test_registry_section_is_optional() {
        let board = BoardDescription::from_toml(
            r#"
            name = "bare"

            [[pins]]
            name = "P0"
            id = 0
            channels = ["digital"]
            "#,
        )
        .unwrap();
        assert_eq!(board.registry_config(), RegistryConfig::DEFAULT);
        assert!(board.pin("P0").is_some());
        assert!(board.pin("P1").is_none());
    }

    #[test]
    fn test_strict_registry() {
        let board: BoardDescription = r#"
            name = "strict"

            [registry]
            release_policy = "strict"
            "#
        .parse()
        .unwrap();
        assert_eq!(board.registry_config().release_policy, ReleasePolicy::Strict);
        assert_eq!(board.build_registry().config().release_policy, ReleasePolicy::Strict);
        assert!(board.pins().is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = BoardDescription::from_toml(
            r#"
            name = "bad"

            [[pins]]
            name = "D04"
            id = 4
            channels = ["digital"]

            [[pins]]
            name = "PB12"
            id = 4
            channels = ["digital"]
            "#,
        );
        assert!(matches!(
            result,
            Err(BoardError::DuplicateId { id, .. }) if id == PinId::new(4)
        ));
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let result = BoardDescription::from_toml(
            r#"
            name = "bad"

            [[pins]]
            name = "D04"
            id = 4
            channels = ["digital"]

            [[pins]]
            name = "D05"
            id = 5
            channels = ["digital"]
            aliases = ["D04"]
            "#,
        );
        assert!(matches!(result, Err(BoardError::DuplicateName(name)) if name == "D04"));
    }

    #[test]
    fn test_pin_without_channels_rejected() {
        let result = BoardDescription::from_toml(
            r#"
            name = "bad"

            [[pins]]
            name = "NC"
            id = 9
            channels = ["none"]
            "#,
        );
        assert!(matches!(result, Err(BoardError::NoChannels(name)) if name == "NC"));
    }

    #[test]
    fn test_unknown_channel_is_a_parse_error() {
        let result = BoardDescription::from_toml(
            r#"
            name = "bad"

            [[pins]]
            name = "D00"
            id = 0
            channels = ["lvds"]
            "#,
        );
        assert!(matches!(result, Err(BoardError::Parse(_))));
    }
}

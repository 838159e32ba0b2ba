//! Zone — a fixed physical sub-area of the greenhouse.
//!
//! The set of zones is closed ([`Zone::ALL`]); the [`ZoneRegistry`] decides
//! which of them are installed and where they sit on the floor plan.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GreenhouseError;

/// Identifier of one greenhouse zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    A,
    B,
    C,
    D,
}

impl Zone {
    /// Every zone known to the simulator, in display order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Single-letter name (`"A"`, `"B"`, …).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = GreenhouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(GreenhouseError::InvalidZone(other.to_string())),
        }
    }
}

/// Position of a zone on the greenhouse floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Immutable mapping of installed zones to their coordinates.
///
/// Built once at start-up; lookups for zones outside the registry fail with
/// [`GreenhouseError::InvalidZone`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRegistry {
    zones: BTreeMap<Zone, Coordinates>,
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new([
            (Zone::A, Coordinates::new(10, 10)),
            (Zone::B, Coordinates::new(10, 30)),
            (Zone::C, Coordinates::new(30, 10)),
            (Zone::D, Coordinates::new(30, 30)),
        ])
    }
}

impl ZoneRegistry {
    /// Build a registry from `(zone, coordinates)` pairs.
    ///
    /// Later duplicates overwrite earlier ones.
    pub fn new(zones: impl IntoIterator<Item = (Zone, Coordinates)>) -> Self {
        Self {
            zones: zones.into_iter().collect(),
        }
    }

    /// Coordinates of `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] when `zone` is not installed.
    pub fn coordinates(&self, zone: Zone) -> Result<Coordinates, GreenhouseError> {
        self.zones
            .get(&zone)
            .copied()
            .ok_or_else(|| GreenhouseError::InvalidZone(zone.to_string()))
    }

    #[must_use]
    pub fn contains(&self, zone: Zone) -> bool {
        self.zones.contains_key(&zone)
    }

    /// Installed zones in display order.
    pub fn zones(&self) -> impl Iterator<Item = Zone> + '_ {
        self.zones.keys().copied()
    }

    /// Resolve a zone by name and check it is installed.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] for unknown or uninstalled names.
    pub fn resolve(&self, name: &str) -> Result<Zone, GreenhouseError> {
        let zone: Zone = name.parse()?;
        if self.contains(zone) {
            Ok(zone)
        } else {
            Err(GreenhouseError::InvalidZone(name.to_string()))
        }
    }
}

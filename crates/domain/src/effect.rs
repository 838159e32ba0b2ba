//! Effects — decaying treatment intensities attached to a zone.
//!
//! An intensity is an integer in `0..=MAX_INTENSITY`. Zero means the
//! treatment has fully worn off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GreenhouseError;

/// Upper bound of every effect intensity.
pub const MAX_INTENSITY: u8 = 100;

/// The kind of treatment whose residual effect is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Watering,
    Manure,
    Fertilizer,
}

impl EffectKind {
    pub const ALL: [Self; 3] = [Self::Watering, Self::Manure, Self::Fertilizer];

    /// Intensity added by one successful treatment of this kind.
    #[must_use]
    pub fn increment(self) -> u8 {
        match self {
            Self::Watering => 20,
            Self::Manure => 15,
            Self::Fertilizer => 25,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watering => "watering",
            Self::Manure => "manure",
            Self::Fertilizer => "fertilizer",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = GreenhouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watering" | "water" => Ok(Self::Watering),
            "manure" => Ok(Self::Manure),
            "fertilizer" | "fertilize" => Ok(Self::Fertilizer),
            other => Err(GreenhouseError::InvalidTreatment(other.to_string())),
        }
    }
}

/// Intensities of every effect kind for one zone, as of one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectLevels {
    pub watering: u8,
    pub manure: u8,
    pub fertilizer: u8,
}

impl EffectLevels {
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> u8 {
        match kind {
            EffectKind::Watering => self.watering,
            EffectKind::Manure => self.manure,
            EffectKind::Fertilizer => self.fertilizer,
        }
    }

    fn slot_mut(&mut self, kind: EffectKind) -> &mut u8 {
        match kind {
            EffectKind::Watering => &mut self.watering,
            EffectKind::Manure => &mut self.manure,
            EffectKind::Fertilizer => &mut self.fertilizer,
        }
    }

    /// Add `delta` (possibly negative) to one intensity, clamping to
    /// `0..=MAX_INTENSITY`, and return the new value.
    pub fn adjust(&mut self, kind: EffectKind, delta: i32) -> u8 {
        let slot = self.slot_mut(kind);
        let next = (i32::from(*slot) + delta).clamp(0, i32::from(MAX_INTENSITY));
        // clamped above, always fits
        *slot = u8::try_from(next).unwrap_or(MAX_INTENSITY);
        *slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_treatment_specific_increments() {
        assert_eq!(EffectKind::Watering.increment(), 20);
        assert_eq!(EffectKind::Manure.increment(), 15);
        assert_eq!(EffectKind::Fertilizer.increment(), 25);
    }

    #[test]
    fn should_clamp_at_max_intensity() {
        let mut levels = EffectLevels {
            watering: 95,
            ..EffectLevels::default()
        };
        assert_eq!(levels.adjust(EffectKind::Watering, 20), MAX_INTENSITY);
    }

    #[test]
    fn should_clamp_at_zero() {
        let mut levels = EffectLevels {
            manure: 3,
            ..EffectLevels::default()
        };
        assert_eq!(levels.adjust(EffectKind::Manure, -5), 0);
    }

    #[test]
    fn should_only_touch_requested_kind() {
        let mut levels = EffectLevels::default();
        levels.adjust(EffectKind::Fertilizer, 25);
        assert_eq!(levels.fertilizer, 25);
        assert_eq!(levels.watering, 0);
        assert_eq!(levels.manure, 0);
    }

    #[test]
    fn should_serialize_levels_keyed_by_kind() {
        let levels = EffectLevels {
            watering: 20,
            manure: 0,
            fertilizer: 5,
        };
        let json = serde_json::to_value(levels).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"watering": 20, "manure": 0, "fertilizer": 5})
        );
    }

    #[test]
    fn should_parse_kind_names() {
        assert_eq!("water".parse::<EffectKind>().unwrap(), EffectKind::Watering);
        assert_eq!("manure".parse::<EffectKind>().unwrap(), EffectKind::Manure);
        assert!("compost".parse::<EffectKind>().is_err());
    }
}

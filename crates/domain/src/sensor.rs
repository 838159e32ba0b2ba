//! Sensor readings and how active effects bias them.
//!
//! The raw values come from an external formula provider; [`blend`] folds a
//! zone's [`EffectLevels`] into them without touching either source.

use serde::{Deserialize, Serialize};

use crate::effect::EffectLevels;

/// Optimal soil-moisture band (percent) that watering pulls readings into.
pub const MOISTURE_BAND: (f64, f64) = (40.0, 60.0);
/// Optimal pH band that manure pulls readings into.
pub const PH_BAND: (f64, f64) = (6.0, 6.8);
/// Ceiling for boosted nutrient levels (percent).
pub const NUTRIENT_CAP: f64 = 95.0;

/// Coarse light category derived from lux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightLevel {
    Low,
    Medium,
    High,
}

impl LightLevel {
    #[must_use]
    pub fn from_lux(lux: f64) -> Self {
        if lux < 10_000.0 {
            Self::Low
        } else if lux <= 40_000.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// One reading of every greenhouse sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Soil moisture, percent.
    pub soil_moisture: f64,
    pub light_lux: f64,
    pub light_intensity: LightLevel,
    /// CO2 concentration, ppm.
    pub co2_level: f64,
    pub ph_level: f64,
    /// Nutrient saturation, percent.
    pub nutrient_level: f64,
}

/// Bias `readings` by the zone's active effects.
///
/// - watering keeps soil moisture inside [`MOISTURE_BAND`], boosted by up to 20 points
/// - fertilizer and manure boost nutrients (up to 20 and 15 points), capped at [`NUTRIENT_CAP`]
/// - manure raises pH by up to 0.8, kept inside [`PH_BAND`]
///
/// Inactive effects leave the matching readings untouched.
#[must_use]
pub fn blend(readings: SensorReadings, effects: EffectLevels) -> SensorReadings {
    let mut blended = readings;
    let watering = fraction(effects.watering);
    let manure = fraction(effects.manure);
    let fertilizer = fraction(effects.fertilizer);

    if effects.watering > 0 {
        let boosted = readings.soil_moisture + watering * 20.0;
        blended.soil_moisture = boosted.clamp(MOISTURE_BAND.0, MOISTURE_BAND.1);
    }

    if effects.fertilizer > 0 || effects.manure > 0 {
        let boost = fertilizer * 20.0 + manure * 15.0;
        blended.nutrient_level = (readings.nutrient_level + boost).min(NUTRIENT_CAP);
    }

    if effects.manure > 0 {
        let boosted = readings.ph_level + manure * 0.8;
        blended.ph_level = boosted.clamp(PH_BAND.0, PH_BAND.1);
    }

    blended
}

fn fraction(intensity: u8) -> f64 {
    f64::from(intensity) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SensorReadings {
        SensorReadings {
            temperature: 24.0,
            humidity: 55.0,
            soil_moisture: 30.0,
            light_lux: 30_000.0,
            light_intensity: LightLevel::Medium,
            co2_level: 420.0,
            ph_level: 5.8,
            nutrient_level: 60.0,
        }
    }

    #[test]
    fn should_leave_readings_untouched_without_effects() {
        assert_eq!(blend(base(), EffectLevels::default()), base());
    }

    #[test]
    fn should_pull_moisture_into_band_when_watered() {
        let effects = EffectLevels {
            watering: 20,
            ..EffectLevels::default()
        };
        // 30 + 4 = 34, lifted to the lower bound
        assert!((blend(base(), effects).soil_moisture - 40.0).abs() < f64::EPSILON);

        let wet = SensorReadings {
            soil_moisture: 58.0,
            ..base()
        };
        let full = EffectLevels {
            watering: 100,
            ..EffectLevels::default()
        };
        assert!((blend(wet, full).soil_moisture - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_boost_nutrients_from_fertilizer_and_manure() {
        let effects = EffectLevels {
            watering: 0,
            manure: 20,
            fertilizer: 50,
        };
        // 60 + 10 + 3
        assert!((blend(base(), effects).nutrient_level - 73.0).abs() < 1e-9);
    }

    #[test]
    fn should_cap_nutrients() {
        let rich = SensorReadings {
            nutrient_level: 90.0,
            ..base()
        };
        let effects = EffectLevels {
            watering: 0,
            manure: 100,
            fertilizer: 100,
        };
        assert!((blend(rich, effects).nutrient_level - NUTRIENT_CAP).abs() < f64::EPSILON);
    }

    #[test]
    fn should_keep_ph_in_band_under_manure() {
        let effects = EffectLevels {
            manure: 15,
            ..EffectLevels::default()
        };
        let blended = blend(base(), effects);
        // 5.8 + 0.12 is still below the band
        assert!((blended.ph_level - 6.0).abs() < f64::EPSILON);
        assert!((blended.soil_moisture - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_categorise_lux() {
        assert_eq!(LightLevel::from_lux(50.0), LightLevel::Low);
        assert_eq!(LightLevel::from_lux(10_000.0), LightLevel::Medium);
        assert_eq!(LightLevel::from_lux(40_000.0), LightLevel::Medium);
        assert_eq!(LightLevel::from_lux(45_000.0), LightLevel::High);
    }
}

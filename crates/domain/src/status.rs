//! Aggregated greenhouse status, as handed to dashboards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effect::EffectLevels;
use crate::environment::Environment;
use crate::robot::RobotStatus;
use crate::sensor::SensorReadings;
use crate::zone::Zone;

/// Everything observable about the greenhouse at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenhouseStatus {
    /// Blended readings for the zone the robot currently occupies.
    pub sensors: SensorReadings,
    pub robot: RobotStatus,
    pub environment: Environment,
    pub zone_effects: BTreeMap<Zone, EffectLevels>,
    pub zone_sensors: BTreeMap<Zone, SensorReadings>,
}

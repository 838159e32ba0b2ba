//! Environment — the day/night flag and actuator switches sensors react to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GreenhouseError;

/// One of the greenhouse's switchable actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    Heater,
    CoolingFan,
    Humidifier,
    Dehumidifier,
    Irrigation,
    Lights,
    Co2Injector,
    NutrientPump,
}

impl ActuatorKind {
    pub const ALL: [Self; 8] = [
        Self::Heater,
        Self::CoolingFan,
        Self::Humidifier,
        Self::Dehumidifier,
        Self::Irrigation,
        Self::Lights,
        Self::Co2Injector,
        Self::NutrientPump,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heater => "heater",
            Self::CoolingFan => "cooling_fan",
            Self::Humidifier => "humidifier",
            Self::Dehumidifier => "dehumidifier",
            Self::Irrigation => "irrigation",
            Self::Lights => "lights",
            Self::Co2Injector => "co2_injector",
            Self::NutrientPump => "nutrient_pump",
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActuatorKind {
    type Err = GreenhouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GreenhouseError::InvalidActuator(s.to_string()))
    }
}

/// On/off flag for every actuator. All off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ActuatorFlags {
    pub heater: bool,
    pub cooling_fan: bool,
    pub humidifier: bool,
    pub dehumidifier: bool,
    pub irrigation: bool,
    pub lights: bool,
    pub co2_injector: bool,
    pub nutrient_pump: bool,
}

impl ActuatorFlags {
    #[must_use]
    pub fn is_on(&self, kind: ActuatorKind) -> bool {
        match kind {
            ActuatorKind::Heater => self.heater,
            ActuatorKind::CoolingFan => self.cooling_fan,
            ActuatorKind::Humidifier => self.humidifier,
            ActuatorKind::Dehumidifier => self.dehumidifier,
            ActuatorKind::Irrigation => self.irrigation,
            ActuatorKind::Lights => self.lights,
            ActuatorKind::Co2Injector => self.co2_injector,
            ActuatorKind::NutrientPump => self.nutrient_pump,
        }
    }

    pub fn set(&mut self, kind: ActuatorKind, on: bool) {
        let flag = match kind {
            ActuatorKind::Heater => &mut self.heater,
            ActuatorKind::CoolingFan => &mut self.cooling_fan,
            ActuatorKind::Humidifier => &mut self.humidifier,
            ActuatorKind::Dehumidifier => &mut self.dehumidifier,
            ActuatorKind::Irrigation => &mut self.irrigation,
            ActuatorKind::Lights => &mut self.lights,
            ActuatorKind::Co2Injector => &mut self.co2_injector,
            ActuatorKind::NutrientPump => &mut self.nutrient_pump,
        };
        *flag = on;
    }
}

/// Snapshot of everything the sensor formulas depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub is_day: bool,
    pub actuators: ActuatorFlags,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            is_day: true,
            actuators: ActuatorFlags::default(),
        }
    }
}

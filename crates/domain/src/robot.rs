//! Robot vocabulary — operating states, operations and status views.
//!
//! The state machine itself lives in the `app` crate; this module only
//! defines the closed set of states and operations it moves between.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effect::EffectKind;
use crate::id::OperationId;
use crate::time::Timestamp;
use crate::zone::{Coordinates, Zone};

/// Operating state of the robot.
///
/// Every working state returns to [`Idle`](Self::Idle) when its operation
/// completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotState {
    #[default]
    Idle,
    Moving,
    Watering,
    ApplyingManure,
    ApplyingFertilizer,
    Charging,
}

impl RobotState {
    #[must_use]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Moving => "moving",
            Self::Watering => "watering",
            Self::ApplyingManure => "applying_manure",
            Self::ApplyingFertilizer => "applying_fertilizer",
            Self::Charging => "charging",
        })
    }
}

/// Kind of a recorded operation, without its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Move,
    Watering,
    Manure,
    Fertilizer,
    Charge,
}

impl OperationKind {
    /// The state the robot holds while performing this kind of operation.
    #[must_use]
    pub fn working_state(self) -> RobotState {
        match self {
            Self::Move => RobotState::Moving,
            Self::Watering => RobotState::Watering,
            Self::Manure => RobotState::ApplyingManure,
            Self::Fertilizer => RobotState::ApplyingFertilizer,
            Self::Charge => RobotState::Charging,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Move => "move",
            Self::Watering => "watering",
            Self::Manure => "manure",
            Self::Fertilizer => "fertilizer",
            Self::Charge => "charge",
        })
    }
}

/// A physical operation targeting one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "zone", rename_all = "snake_case")]
pub enum RobotOperation {
    Move(Zone),
    Water(Zone),
    ApplyManure(Zone),
    ApplyFertilizer(Zone),
}

impl RobotOperation {
    /// The robot operation that delivers a treatment of `kind`.
    #[must_use]
    pub fn treatment(kind: EffectKind, zone: Zone) -> Self {
        match kind {
            EffectKind::Watering => Self::Water(zone),
            EffectKind::Manure => Self::ApplyManure(zone),
            EffectKind::Fertilizer => Self::ApplyFertilizer(zone),
        }
    }

    #[must_use]
    pub fn zone(self) -> Zone {
        match self {
            Self::Move(zone)
            | Self::Water(zone)
            | Self::ApplyManure(zone)
            | Self::ApplyFertilizer(zone) => zone,
        }
    }

    #[must_use]
    pub fn kind(self) -> OperationKind {
        match self {
            Self::Move(_) => OperationKind::Move,
            Self::Water(_) => OperationKind::Watering,
            Self::ApplyManure(_) => OperationKind::Manure,
            Self::ApplyFertilizer(_) => OperationKind::Fertilizer,
        }
    }

    /// Effect left behind by this operation, if any.
    #[must_use]
    pub fn effect(self) -> Option<EffectKind> {
        match self {
            Self::Move(_) => None,
            Self::Water(_) => Some(EffectKind::Watering),
            Self::ApplyManure(_) => Some(EffectKind::Manure),
            Self::ApplyFertilizer(_) => Some(EffectKind::Fertilizer),
        }
    }

    /// Human-readable confirmation once the operation succeeded.
    #[must_use]
    pub fn success_message(self) -> String {
        match self {
            Self::Move(zone) => format!("Robot moved to zone {zone}"),
            Self::Water(zone) => format!("Watered zone {zone}"),
            Self::ApplyManure(zone) => format!("Applied manure to zone {zone}"),
            Self::ApplyFertilizer(zone) => format!("Applied fertilizer to zone {zone}"),
        }
    }
}

/// Record of the most recent completed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastOperation {
    pub operation: OperationKind,
    pub zone: Zone,
    pub timestamp: Timestamp,
}

/// Outcome of a successful robot operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub id: OperationId,
    pub operation: OperationKind,
    pub zone: Zone,
    pub message: String,
    pub completed_at: Timestamp,
}

/// Consistent, read-only view of the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotStatus {
    pub robot_id: String,
    pub current_position: Zone,
    pub coordinates: Coordinates,
    pub state: RobotState,
    /// Battery percentage rounded to one decimal.
    pub battery_level: f64,
    pub last_operation: Option<LastOperation>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_treatments_to_operations() {
        assert_eq!(
            RobotOperation::treatment(EffectKind::Watering, Zone::B),
            RobotOperation::Water(Zone::B)
        );
        assert_eq!(
            RobotOperation::treatment(EffectKind::Manure, Zone::C),
            RobotOperation::ApplyManure(Zone::C)
        );
        assert_eq!(
            RobotOperation::treatment(EffectKind::Fertilizer, Zone::D).effect(),
            Some(EffectKind::Fertilizer)
        );
    }

    #[test]
    fn should_leave_no_effect_after_move() {
        assert_eq!(RobotOperation::Move(Zone::A).effect(), None);
    }

    #[test]
    fn should_pair_operation_kinds_with_working_states() {
        assert_eq!(
            RobotOperation::Move(Zone::A).kind().working_state(),
            RobotState::Moving
        );
        assert_eq!(
            RobotOperation::ApplyManure(Zone::A).kind().working_state(),
            RobotState::ApplyingManure
        );
        assert_eq!(
            OperationKind::Charge.working_state(),
            RobotState::Charging
        );
    }

    #[test]
    fn should_word_success_messages_per_operation() {
        assert_eq!(
            RobotOperation::Move(Zone::B).success_message(),
            "Robot moved to zone B"
        );
        assert_eq!(
            RobotOperation::Water(Zone::B).success_message(),
            "Watered zone B"
        );
        assert_eq!(
            RobotOperation::ApplyFertilizer(Zone::D).success_message(),
            "Applied fertilizer to zone D"
        );
    }

    #[test]
    fn should_serialize_states_in_snake_case() {
        let json = serde_json::to_string(&RobotState::ApplyingManure).unwrap();
        assert_eq!(json, "\"applying_manure\"");
        assert_eq!(RobotState::ApplyingManure.to_string(), "applying_manure");
    }

    #[test]
    fn should_default_to_idle() {
        assert!(RobotState::default().is_idle());
    }
}

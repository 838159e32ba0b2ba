//! Event — an immutable record of something the simulation did.
//!
//! Events are produced when the robot completes an operation, when a
//! treatment lands on a zone, and as effect decay runs progress.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::time::{Timestamp, now};
use crate::zone::Zone;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RobotOperationCompleted,
    RobotActivated,
    RobotDeactivated,
    TreatmentApplied,
    DecayStarted,
    GraceRefreshed,
    EffectDecayed,
    DecayFinished,
}

/// A timestamped occurrence, optionally tied to a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub zone: Option<Zone>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, zone: Option<Zone>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            zone,
            data,
            timestamp: now(),
        }
    }
}

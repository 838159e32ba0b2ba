//! Error taxonomy shared by every layer of the simulator.
//!
//! Errors are returned as values across the core boundary; nothing in the
//! core panics or retries on behalf of the caller.

/// Everything that can go wrong when driving the simulation core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GreenhouseError {
    /// The zone identifier is not part of the registry.
    #[error("invalid zone: {0}")]
    InvalidZone(String),

    /// The robot has been deactivated and rejects every operation.
    #[error("robot is inactive")]
    Inactive,

    /// Another robot operation is already in flight.
    #[error("robot is busy with another operation")]
    OperationInProgress,

    /// A lock was poisoned or a state transition was observed out of order.
    #[error("internal synchronization failure in {0}")]
    InternalSyncFailure(&'static str),

    /// The actuator name does not match any known actuator.
    #[error("invalid actuator: {0}")]
    InvalidActuator(String),

    /// The treatment name does not match any effect kind.
    #[error("invalid treatment: {0}")]
    InvalidTreatment(String),
}

impl GreenhouseError {
    /// Whether the caller may reasonably retry or correct the request.
    ///
    /// Only [`InternalSyncFailure`](Self::InternalSyncFailure) is fatal.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InternalSyncFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_invalid_zone_with_name() {
        let err = GreenhouseError::InvalidZone("Z".to_string());
        assert_eq!(err.to_string(), "invalid zone: Z");
    }

    #[test]
    fn should_display_inactive() {
        assert_eq!(GreenhouseError::Inactive.to_string(), "robot is inactive");
    }

    #[test]
    fn should_display_sync_failure_with_location() {
        let err = GreenhouseError::InternalSyncFailure("effect store");
        assert_eq!(
            err.to_string(),
            "internal synchronization failure in effect store"
        );
    }

    #[test]
    fn should_treat_only_sync_failures_as_fatal() {
        assert!(GreenhouseError::InvalidZone("Z".to_string()).is_recoverable());
        assert!(GreenhouseError::Inactive.is_recoverable());
        assert!(GreenhouseError::OperationInProgress.is_recoverable());
        assert!(GreenhouseError::InvalidActuator("fan".to_string()).is_recoverable());
        assert!(!GreenhouseError::InternalSyncFailure("robot").is_recoverable());
    }
}

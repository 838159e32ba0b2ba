//! Lock-poisoning helpers.

use greenhouse_domain::error::GreenhouseError;

/// Log and build the error returned when a lock guarding `location` is poisoned.
pub(crate) fn poisoned(location: &'static str) -> GreenhouseError {
    tracing::error!(location, "lock poisoned, state can no longer be trusted");
    GreenhouseError::InternalSyncFailure(location)
}

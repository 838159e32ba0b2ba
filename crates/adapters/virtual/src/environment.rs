//! Virtual environment — actuator switches and the day/night flag.

use std::sync::{Mutex, MutexGuard, PoisonError};

use greenhouse_app::ports::EnvironmentProvider;
use greenhouse_domain::environment::{ActuatorFlags, ActuatorKind, Environment};
use greenhouse_domain::error::GreenhouseError;

/// Result of switching an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorChange {
    pub actuator: ActuatorKind,
    pub is_on: bool,
}

impl ActuatorChange {
    #[must_use]
    pub fn message(&self) -> String {
        let verb = if self.is_on { "turned on" } else { "turned off" };
        format!("{} {verb}", self.actuator)
    }
}

/// Result of flipping between day and night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNightChange {
    pub is_day: bool,
}

impl DayNightChange {
    #[must_use]
    pub fn message(&self) -> String {
        let mode = if self.is_day { "day" } else { "night" };
        format!("Switched to {mode} mode")
    }
}

/// Simulated greenhouse environment. Starts in day mode with every actuator off.
#[derive(Default)]
pub struct VirtualEnvironment {
    state: Mutex<Environment>,
}

impl VirtualEnvironment {
    /// Flip the named actuator.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidActuator`] for unknown names.
    pub fn toggle_actuator(&self, name: &str) -> Result<ActuatorChange, GreenhouseError> {
        let actuator: ActuatorKind = name.parse()?;
        let mut state = self.lock_state_mut();
        let is_on = !state.actuators.is_on(actuator);
        state.actuators.set(actuator, is_on);
        drop(state);

        tracing::info!(%actuator, is_on, "actuator toggled");
        Ok(ActuatorChange { actuator, is_on })
    }

    /// Force the named actuator on or off.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidActuator`] for unknown names.
    pub fn set_actuator(&self, name: &str, on: bool) -> Result<ActuatorChange, GreenhouseError> {
        let actuator: ActuatorKind = name.parse()?;
        self.lock_state_mut().actuators.set(actuator, on);

        tracing::info!(%actuator, is_on = on, "actuator set");
        Ok(ActuatorChange {
            actuator,
            is_on: on,
        })
    }

    #[must_use]
    pub fn actuator_status(&self) -> ActuatorFlags {
        self.lock_state_mut().actuators
    }

    pub fn toggle_day_night(&self) -> DayNightChange {
        let mut state = self.lock_state_mut();
        state.is_day = !state.is_day;
        let change = DayNightChange {
            is_day: state.is_day,
        };
        drop(state);

        tracing::info!(is_day = change.is_day, "day/night toggled");
        change
    }

    fn lock_state_mut(&self) -> MutexGuard<'_, Environment> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EnvironmentProvider for VirtualEnvironment {
    fn environment(&self) -> Environment {
        *self.lock_state_mut()
    }
}

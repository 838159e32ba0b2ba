//! Greenhouse engine — the orchestrator the outside world talks to.
//!
//! Maps robot successes onto effect applications and folds active effects
//! into sensor readings. Holds no state of its own beyond the components it
//! wires together.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use greenhouse_domain::effect::{EffectKind, EffectLevels};
use greenhouse_domain::error::GreenhouseError;
use greenhouse_domain::event::{Event, EventType};
use greenhouse_domain::robot::{OperationReport, RobotOperation, RobotStatus};
use greenhouse_domain::sensor::{SensorReadings, blend};
use greenhouse_domain::status::GreenhouseStatus;
use greenhouse_domain::zone::{Zone, ZoneRegistry};

use crate::decay_scheduler::{DecayScheduler, DecaySettings};
use crate::effect_store::EffectStore;
use crate::event_bus::InProcessEventBus;
use crate::ports::{EnvironmentProvider, SensorProvider};
use crate::robot::{Robot, RobotSettings};

/// Everything needed to assemble an engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub registry: ZoneRegistry,
    pub robot: RobotSettings,
    pub decay: DecaySettings,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            registry: ZoneRegistry::default(),
            robot: RobotSettings::default(),
            decay: DecaySettings::default(),
            event_capacity: 256,
        }
    }
}

pub struct GreenhouseEngine<S, E> {
    registry: Arc<ZoneRegistry>,
    store: Arc<EffectStore>,
    decay: DecayScheduler,
    robot: Robot,
    sensors: S,
    environment: E,
    events: InProcessEventBus,
}

impl<S: SensorProvider, E: EnvironmentProvider> GreenhouseEngine<S, E> {
    /// Wire the store, scheduler and robot together. Must be called from
    /// within a Tokio runtime since the robot starts its drain task here.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if the robot's start zone is
    /// not part of the registry.
    pub fn new(
        settings: EngineSettings,
        sensors: S,
        environment: E,
    ) -> Result<Self, GreenhouseError> {
        let registry = Arc::new(settings.registry);
        let events = InProcessEventBus::new(settings.event_capacity.max(1));
        let store = Arc::new(EffectStore::new(&registry));
        let decay = DecayScheduler::new(
            Arc::clone(&store),
            &registry,
            settings.decay,
            events.clone(),
        );
        let robot = Robot::new(settings.robot, Arc::clone(&registry), events.clone())?;

        tracing::info!(zones = registry.zones().count(), "greenhouse engine ready");
        Ok(Self {
            registry,
            store,
            decay,
            robot,
            sensors,
            environment,
            events,
        })
    }

    /// Have the robot deliver `kind` to `zone`, then record the effect.
    ///
    /// On any robot failure the effect store is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates the robot's [`GreenhouseError::InvalidZone`],
    /// [`GreenhouseError::Inactive`] or [`GreenhouseError::OperationInProgress`].
    pub async fn apply_treatment(
        &self,
        zone: Zone,
        kind: EffectKind,
    ) -> Result<OperationReport, GreenhouseError> {
        let report = self
            .robot
            .perform(RobotOperation::treatment(kind, zone))
            .await?;
        let intensity = self.decay.apply(zone, kind, kind.increment())?;

        tracing::info!(%zone, %kind, intensity, "treatment applied");
        self.events.publish(Event::new(
            EventType::TreatmentApplied,
            Some(zone),
            serde_json::json!({ "kind": kind, "intensity": intensity }),
        ));
        Ok(report)
    }

    /// # Errors
    ///
    /// See [`Robot::perform`].
    pub async fn move_robot(&self, zone: Zone) -> Result<OperationReport, GreenhouseError> {
        self.robot.move_to(zone).await
    }

    /// # Errors
    ///
    /// See [`Robot::charge_battery`].
    pub async fn charge_robot(&self) -> Result<OperationReport, GreenhouseError> {
        self.robot.charge_battery().await
    }

    /// # Errors
    ///
    /// See [`Robot::activate`].
    pub fn activate_robot(&self) -> Result<(), GreenhouseError> {
        self.robot.activate()
    }

    /// # Errors
    ///
    /// See [`Robot::deactivate`].
    pub fn deactivate_robot(&self) -> Result<(), GreenhouseError> {
        self.robot.deactivate()
    }

    /// # Errors
    ///
    /// See [`Robot::status`].
    pub fn robot_status(&self) -> Result<RobotStatus, GreenhouseError> {
        self.robot.status()
    }

    /// Look up an installed zone by name.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] for unknown or uninstalled names.
    pub fn resolve_zone(&self, name: &str) -> Result<Zone, GreenhouseError> {
        self.registry.resolve(name)
    }

    /// Current intensities of every effect in `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed.
    pub fn zone_effects(&self, zone: Zone) -> Result<EffectLevels, GreenhouseError> {
        self.store.snapshot(zone)
    }

    /// Raw sensor readings with no effects folded in.
    #[must_use]
    pub fn read_sensors(&self) -> SensorReadings {
        self.sensors.read(&self.environment.environment())
    }

    /// Sensor readings for `zone` biased by its active effects.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed.
    pub fn read_zone(&self, zone: Zone) -> Result<SensorReadings, GreenhouseError> {
        let effects = self.store.snapshot(zone)?;
        Ok(blend(self.read_sensors(), effects))
    }

    /// Sensors, robot, environment and every zone's effects in one view.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InternalSyncFailure`] if a lock is poisoned.
    pub fn status(&self) -> Result<GreenhouseStatus, GreenhouseError> {
        let environment = self.environment.environment();
        let raw = self.sensors.read(&environment);
        let robot = self.robot.status()?;
        let zone_effects = self.store.snapshot_all()?;
        let zone_sensors: BTreeMap<Zone, SensorReadings> = zone_effects
            .iter()
            .map(|(zone, effects)| (*zone, blend(raw, *effects)))
            .collect();
        let sensors = zone_sensors
            .get(&robot.current_position)
            .copied()
            .unwrap_or(raw);

        Ok(GreenhouseStatus {
            sensors,
            robot,
            environment,
            zone_effects,
            zone_sensors,
        })
    }

    #[must_use]
    pub fn decay(&self) -> &DecayScheduler {
        &self.decay
    }

    /// Subscribe to engine events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Stop every decay run and deactivate the robot.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InternalSyncFailure`] if a lock is poisoned.
    pub fn shutdown(&self) -> Result<(), GreenhouseError> {
        self.decay.shutdown();
        self.robot.deactivate()?;
        tracing::info!("greenhouse engine shut down");
        Ok(())
    }
}

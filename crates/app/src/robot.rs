//! Robot state machine — mutually exclusive physical operations plus an
//! independent battery-drain task.
//!
//! Operations are admitted through a single execution lock: a request that
//! arrives while another operation is in flight is rejected with
//! [`GreenhouseError::OperationInProgress`]. Position, state, battery and the
//! last-operation record live together behind one `RwLock`, which is the
//! only path [`Robot::status`] reads through.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use greenhouse_domain::error::GreenhouseError;
use greenhouse_domain::event::{Event, EventType};
use greenhouse_domain::id::OperationId;
use greenhouse_domain::robot::{
    LastOperation, OperationKind, OperationReport, RobotOperation, RobotState, RobotStatus,
};
use greenhouse_domain::time::now;
use greenhouse_domain::zone::{Zone, ZoneRegistry};

use crate::event_bus::InProcessEventBus;
use crate::sync::poisoned;

pub const FULL_BATTERY: f64 = 100.0;
/// Battery drained per tick while the robot is working.
pub const WORKING_DRAIN: f64 = 0.1;
/// Battery drained per tick while the robot is idle.
pub const IDLE_DRAIN: f64 = 0.05;

/// Identity and simulated timings of the robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotSettings {
    pub id: String,
    pub start_zone: Zone,
    pub move_duration: Duration,
    pub water_duration: Duration,
    pub manure_duration: Duration,
    pub fertilizer_duration: Duration,
    pub charge_duration: Duration,
    pub battery_tick: Duration,
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self {
            id: "rx200_001".to_string(),
            start_zone: Zone::A,
            move_duration: Duration::from_millis(200),
            water_duration: Duration::from_millis(300),
            manure_duration: Duration::from_millis(400),
            fertilizer_duration: Duration::from_millis(300),
            charge_duration: Duration::from_millis(500),
            battery_tick: Duration::from_secs(10),
        }
    }
}

impl RobotSettings {
    fn duration(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Move => self.move_duration,
            OperationKind::Watering => self.water_duration,
            OperationKind::Manure => self.manure_duration,
            OperationKind::Fertilizer => self.fertilizer_duration,
            OperationKind::Charge => self.charge_duration,
        }
    }
}

struct RobotCore {
    position: Zone,
    state: RobotState,
    battery: f64,
    last_operation: Option<LastOperation>,
    active: bool,
    /// Bumped on every deactivation; an operation started under an older
    /// epoch is discarded at completion.
    epoch: u64,
}

/// Puts the robot back to idle if an operation future is dropped mid-flight.
struct WorkingGuard<'a> {
    core: &'a RwLock<RobotCore>,
    armed: bool,
}

impl Drop for WorkingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut core) = self.core.write() {
            core.state = RobotState::Idle;
        }
    }
}

/// The greenhouse's single mobile robot.
pub struct Robot {
    core: Arc<RwLock<RobotCore>>,
    executor: tokio::sync::Mutex<()>,
    drain: Mutex<Option<JoinHandle<()>>>,
    registry: Arc<ZoneRegistry>,
    settings: RobotSettings,
    events: InProcessEventBus,
}

impl Robot {
    /// Create an active, idle robot at `settings.start_zone` with a full
    /// battery and start its drain task. Must be called from within a Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if the start zone is not
    /// installed in `registry`.
    pub fn new(
        settings: RobotSettings,
        registry: Arc<ZoneRegistry>,
        events: InProcessEventBus,
    ) -> Result<Self, GreenhouseError> {
        registry.coordinates(settings.start_zone)?;

        let core = Arc::new(RwLock::new(RobotCore {
            position: settings.start_zone,
            state: RobotState::Idle,
            battery: FULL_BATTERY,
            last_operation: None,
            active: true,
            epoch: 0,
        }));
        let drain = spawn_drain(Arc::clone(&core), settings.battery_tick);
        tracing::info!(robot_id = %settings.id, zone = %settings.start_zone, "robot ready");

        Ok(Self {
            core,
            executor: tokio::sync::Mutex::new(()),
            drain: Mutex::new(Some(drain)),
            registry,
            settings,
            events,
        })
    }

    /// Drive to `zone`.
    ///
    /// # Errors
    ///
    /// See [`perform`](Self::perform).
    pub async fn move_to(&self, zone: Zone) -> Result<OperationReport, GreenhouseError> {
        self.perform(RobotOperation::Move(zone)).await
    }

    /// Water `zone`, moving there first if needed.
    ///
    /// # Errors
    ///
    /// See [`perform`](Self::perform).
    pub async fn water(&self, zone: Zone) -> Result<OperationReport, GreenhouseError> {
        self.perform(RobotOperation::Water(zone)).await
    }

    /// Spread manure on `zone`, moving there first if needed.
    ///
    /// # Errors
    ///
    /// See [`perform`](Self::perform).
    pub async fn apply_manure(&self, zone: Zone) -> Result<OperationReport, GreenhouseError> {
        self.perform(RobotOperation::ApplyManure(zone)).await
    }

    /// Fertilize `zone`, moving there first if needed.
    ///
    /// # Errors
    ///
    /// See [`perform`](Self::perform).
    pub async fn apply_fertilizer(&self, zone: Zone) -> Result<OperationReport, GreenhouseError> {
        self.perform(RobotOperation::ApplyFertilizer(zone)).await
    }

    /// Run `operation` to completion while holding the execution lock.
    ///
    /// Treatments move to their target zone first when the robot is
    /// elsewhere; the move happens under the same lock, so nothing can slip
    /// in between.
    ///
    /// # Errors
    ///
    /// - [`GreenhouseError::InvalidZone`] if the target is not installed
    /// - [`GreenhouseError::Inactive`] if the robot is (or becomes) deactivated
    /// - [`GreenhouseError::OperationInProgress`] if another operation is in flight
    pub async fn perform(
        &self,
        operation: RobotOperation,
    ) -> Result<OperationReport, GreenhouseError> {
        let zone = operation.zone();
        let _execution = self.admit(Some(zone), operation.kind())?;

        let position = self.read_core()?.position;
        if operation.effect().is_some() && position != zone {
            self.run_step(
                OperationKind::Move,
                zone,
                RobotOperation::Move(zone).success_message(),
            )
            .await?;
        }
        self.run_step(operation.kind(), zone, operation.success_message())
            .await
    }

    /// Recharge the battery to 100 at the current position.
    ///
    /// # Errors
    ///
    /// [`GreenhouseError::Inactive`] or [`GreenhouseError::OperationInProgress`],
    /// as for [`perform`](Self::perform).
    pub async fn charge_battery(&self) -> Result<OperationReport, GreenhouseError> {
        let _execution = self.admit(None, OperationKind::Charge)?;
        let zone = self.read_core()?.position;
        self.run_step(
            OperationKind::Charge,
            zone,
            format!("Battery charged to {FULL_BATTERY:.0}%"),
        )
        .await
    }

    /// Consistent snapshot of the robot.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InternalSyncFailure`] if the state lock is poisoned.
    pub fn status(&self) -> Result<RobotStatus, GreenhouseError> {
        let core = self.read_core()?;
        Ok(RobotStatus {
            robot_id: self.settings.id.clone(),
            current_position: core.position,
            coordinates: self.registry.coordinates(core.position)?,
            state: core.state,
            battery_level: (core.battery * 10.0).round() / 10.0,
            last_operation: core.last_operation.clone(),
            is_active: core.active,
        })
    }

    /// Resume accepting operations and restart the battery drain.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InternalSyncFailure`] if a lock is poisoned.
    pub fn activate(&self) -> Result<(), GreenhouseError> {
        let mut drain = self.drain.lock().map_err(|_| poisoned("robot drain"))?;
        {
            let mut core = self.write_core()?;
            if core.active {
                return Ok(());
            }
            core.active = true;
        }
        if drain.is_none() {
            *drain = Some(spawn_drain(Arc::clone(&self.core), self.settings.battery_tick));
        }
        drop(drain);

        tracing::info!(robot_id = %self.settings.id, "robot activated");
        self.publish(EventType::RobotActivated, None, serde_json::json!({}));
        Ok(())
    }

    /// Stop accepting operations, force the state back to idle and stop the
    /// battery drain.
    ///
    /// An operation in flight finishes its simulated duration and then
    /// reports [`GreenhouseError::Inactive`] without recording anything,
    /// even if the robot is reactivated before it completes.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InternalSyncFailure`] if a lock is poisoned.
    pub fn deactivate(&self) -> Result<(), GreenhouseError> {
        let mut drain = self.drain.lock().map_err(|_| poisoned("robot drain"))?;
        let battery = {
            let mut core = self.write_core()?;
            if !core.active {
                return Ok(());
            }
            core.active = false;
            core.epoch += 1;
            core.state = RobotState::Idle;
            core.battery
        };
        if let Some(handle) = drain.take() {
            handle.abort();
        }
        drop(drain);

        tracing::info!(robot_id = %self.settings.id, battery, "robot deactivated");
        self.publish(EventType::RobotDeactivated, None, serde_json::json!({}));
        Ok(())
    }

    fn admit(
        &self,
        zone: Option<Zone>,
        kind: OperationKind,
    ) -> Result<tokio::sync::MutexGuard<'_, ()>, GreenhouseError> {
        if let Some(zone) = zone {
            self.registry.coordinates(zone)?;
        }
        if !self.read_core()?.active {
            tracing::warn!(%kind, "robot is inactive, operation rejected");
            return Err(GreenhouseError::Inactive);
        }
        self.executor.try_lock().map_err(|_| {
            tracing::warn!(%kind, "robot is busy, operation rejected");
            GreenhouseError::OperationInProgress
        })
    }

    /// One state transition `Idle → working → Idle`, holding the working
    /// state for the operation's simulated duration.
    async fn run_step(
        &self,
        kind: OperationKind,
        zone: Zone,
        message: String,
    ) -> Result<OperationReport, GreenhouseError> {
        let (mut working, epoch) = {
            let mut core = self.write_core()?;
            if !core.active {
                return Err(GreenhouseError::Inactive);
            }
            if !core.state.is_idle() {
                tracing::error!(
                    state = %core.state,
                    %kind,
                    "robot not idle under execution lock"
                );
                return Err(GreenhouseError::InternalSyncFailure("robot state machine"));
            }
            core.state = kind.working_state();
            let guard = WorkingGuard {
                core: &self.core,
                armed: true,
            };
            (guard, core.epoch)
        };
        tracing::debug!(%kind, %zone, "robot operation started");

        tokio::time::sleep(self.settings.duration(kind)).await;

        let completed_at = now();
        {
            let mut core = self.write_core()?;
            working.armed = false;
            if !core.active || core.epoch != epoch {
                tracing::warn!(
                    %kind,
                    %zone,
                    "robot deactivated during operation, result discarded"
                );
                return Err(GreenhouseError::Inactive);
            }
            core.state = RobotState::Idle;
            match kind {
                OperationKind::Move => core.position = zone,
                OperationKind::Charge => core.battery = FULL_BATTERY,
                OperationKind::Watering | OperationKind::Manure | OperationKind::Fertilizer => {}
            }
            core.last_operation = Some(LastOperation {
                operation: kind,
                zone,
                timestamp: completed_at,
            });
        }

        let report = OperationReport {
            id: OperationId::new(),
            operation: kind,
            zone,
            message,
            completed_at,
        };
        tracing::info!(%kind, %zone, message = %report.message, "robot operation completed");
        self.publish(
            EventType::RobotOperationCompleted,
            Some(zone),
            serde_json::json!({
                "operation_id": report.id.to_string(),
                "operation": kind,
                "message": report.message,
            }),
        );
        Ok(report)
    }

    fn publish(&self, event_type: EventType, zone: Option<Zone>, data: serde_json::Value) {
        self.events.publish(Event::new(event_type, zone, data));
    }

    fn read_core(&self) -> Result<RwLockReadGuard<'_, RobotCore>, GreenhouseError> {
        self.core.read().map_err(|_| poisoned("robot state"))
    }

    fn write_core(&self) -> Result<RwLockWriteGuard<'_, RobotCore>, GreenhouseError> {
        self.core.write().map_err(|_| poisoned("robot state"))
    }
}

impl Drop for Robot {
    fn drop(&mut self) {
        if let Ok(mut drain) = self.drain.lock()
            && let Some(handle) = drain.take()
        {
            handle.abort();
        }
    }
}

/// Drain the battery on a fixed tick until the robot is deactivated.
///
/// The `active` flag is checked under the same write lock that applies the
/// drain, so a tick racing with [`Robot::deactivate`] never drains a
/// deactivated robot.
fn spawn_drain(core: Arc<RwLock<RobotCore>>, tick: Duration) -> JoinHandle<()> {
    let tick = tick.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
        loop {
            ticker.tick().await;
            let Ok(mut state) = core.write() else {
                tracing::error!("robot state poisoned, battery drain stopped");
                return;
            };
            if !state.active {
                return;
            }
            let rate = if state.state.is_idle() {
                IDLE_DRAIN
            } else {
                WORKING_DRAIN
            };
            state.battery = (state.battery - rate).max(0.0);
            tracing::trace!(battery = state.battery, "battery drained");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenhouse_domain::zone::Coordinates;

    fn robot() -> Robot {
        robot_with(ZoneRegistry::default())
    }

    fn robot_with(registry: ZoneRegistry) -> Robot {
        Robot::new(
            RobotSettings::default(),
            Arc::new(registry),
            InProcessEventBus::new(64),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn should_start_idle_at_start_zone_with_full_battery() {
        let status = robot().status().unwrap();

        assert_eq!(status.robot_id, "rx200_001");
        assert_eq!(status.current_position, Zone::A);
        assert_eq!(status.coordinates, Coordinates::new(10, 10));
        assert_eq!(status.state, RobotState::Idle);
        assert!((status.battery_level - 100.0).abs() < f64::EPSILON);
        assert!(status.last_operation.is_none());
        assert!(status.is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_start_zone_missing_from_registry() {
        let registry = ZoneRegistry::new([(Zone::B, Coordinates::new(0, 0))]);
        let result = Robot::new(
            RobotSettings::default(),
            Arc::new(registry),
            InProcessEventBus::new(8),
        );
        assert!(matches!(result, Err(GreenhouseError::InvalidZone(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn should_move_and_record_operation() {
        let robot = robot();

        let report = robot.move_to(Zone::C).await.unwrap();

        assert_eq!(report.operation, OperationKind::Move);
        assert_eq!(report.message, "Robot moved to zone C");
        let status = robot.status().unwrap();
        assert_eq!(status.current_position, Zone::C);
        assert_eq!(status.coordinates, Coordinates::new(30, 10));
        assert_eq!(status.state, RobotState::Idle);
        let last = status.last_operation.unwrap();
        assert_eq!(last.operation, OperationKind::Move);
        assert_eq!(last.zone, Zone::C);
    }

    #[tokio::test(start_paused = true)]
    async fn should_move_before_treating_another_zone() {
        let robot = robot();
        let started = Instant::now();

        let report = robot.water(Zone::B).await.unwrap();

        assert_eq!(report.message, "Watered zone B");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(500) && elapsed < Duration::from_millis(550));
        let status = robot.status().unwrap();
        assert_eq!(status.current_position, Zone::B);
        assert_eq!(status.last_operation.unwrap().operation, OperationKind::Watering);
    }

    #[tokio::test(start_paused = true)]
    async fn should_treat_current_zone_without_moving() {
        let robot = robot();
        let started = Instant::now();

        robot.apply_manure(Zone::A).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(400) && elapsed < Duration::from_millis(450));
    }

    #[tokio::test(start_paused = true)]
    async fn should_expose_working_state_while_in_flight() {
        let robot = Arc::new(robot());
        let worker = Arc::clone(&robot);
        let handle = tokio::spawn(async move { worker.apply_fertilizer(Zone::A).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(robot.status().unwrap().state, RobotState::ApplyingFertilizer);

        handle.await.unwrap().unwrap();
        assert_eq!(robot.status().unwrap().state, RobotState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_concurrent_operation() {
        let robot = robot();

        let (first, second) = tokio::join!(robot.water(Zone::B), robot.apply_manure(Zone::B));

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), GreenhouseError::OperationInProgress);
        let last = robot.status().unwrap().last_operation.unwrap();
        assert_eq!(last.operation, OperationKind::Watering);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_uninstalled_zone_without_mutation() {
        let registry = ZoneRegistry::new([
            (Zone::A, Coordinates::new(10, 10)),
            (Zone::B, Coordinates::new(10, 30)),
        ]);
        let robot = robot_with(registry);

        let err = robot.water(Zone::D).await.unwrap_err();

        assert_eq!(err, GreenhouseError::InvalidZone("D".to_string()));
        let status = robot.status().unwrap();
        assert_eq!(status.current_position, Zone::A);
        assert!(status.last_operation.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_reject_operations_while_inactive() {
        let robot = robot();
        robot.deactivate().unwrap();

        assert_eq!(robot.move_to(Zone::B).await.unwrap_err(), GreenhouseError::Inactive);
        assert_eq!(robot.charge_battery().await.unwrap_err(), GreenhouseError::Inactive);
        let status = robot.status().unwrap();
        assert!(!status.is_active);
        assert_eq!(status.current_position, Zone::A);
        assert!(status.last_operation.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_discard_operation_when_deactivated_mid_flight() {
        let robot = Arc::new(robot());
        let worker = Arc::clone(&robot);
        let handle = tokio::spawn(async move { worker.move_to(Zone::D).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        robot.deactivate().unwrap();
        assert_eq!(robot.status().unwrap().state, RobotState::Idle);

        assert_eq!(handle.await.unwrap().unwrap_err(), GreenhouseError::Inactive);
        let status = robot.status().unwrap();
        assert_eq!(status.current_position, Zone::A);
        assert!(status.last_operation.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_operation_cancelled_when_reactivated_mid_flight() {
        let robot = Arc::new(robot());
        let worker = Arc::clone(&robot);
        let handle = tokio::spawn(async move { worker.move_to(Zone::D).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        robot.deactivate().unwrap();
        robot.activate().unwrap();
        let status = robot.status().unwrap();
        assert!(status.is_active);
        assert_eq!(status.state, RobotState::Idle);

        assert_eq!(handle.await.unwrap().unwrap_err(), GreenhouseError::Inactive);
        let status = robot.status().unwrap();
        assert_eq!(status.current_position, Zone::A);
        assert_eq!(status.state, RobotState::Idle);
        assert!(status.last_operation.is_none());

        robot.move_to(Zone::B).await.unwrap();
        assert_eq!(robot.status().unwrap().current_position, Zone::B);
    }

    #[tokio::test(start_paused = true)]
    async fn should_drain_battery_while_idle() {
        let robot = robot();

        tokio::time::sleep(Duration::from_secs(100) + Duration::from_millis(1)).await;

        // 10 idle ticks at 0.05
        assert!((robot.status().unwrap().battery_level - 99.5).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn should_drain_faster_while_working() {
        let mut settings = RobotSettings::default();
        settings.battery_tick = Duration::from_millis(150);
        let robot = Robot::new(
            settings,
            Arc::new(ZoneRegistry::default()),
            InProcessEventBus::new(8),
        )
        .unwrap();

        // manure on the current zone keeps the robot busy for 400ms: ticks at 150 and 300
        robot.apply_manure(Zone::A).await.unwrap();
        assert!((robot.status().unwrap().battery_level - 99.8).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_draining_once_deactivated() {
        let robot = robot();
        tokio::time::sleep(Duration::from_secs(20) + Duration::from_millis(1)).await;
        robot.deactivate().unwrap();
        let battery = robot.status().unwrap().battery_level;

        tokio::time::sleep(Duration::from_secs(100)).await;

        assert!((robot.status().unwrap().battery_level - battery).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn should_resume_draining_after_reactivation() {
        let robot = robot();
        robot.deactivate().unwrap();
        robot.activate().unwrap();

        tokio::time::sleep(Duration::from_secs(20) + Duration::from_millis(1)).await;

        let status = robot.status().unwrap();
        assert!(status.is_active);
        assert!((status.battery_level - 99.9).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn should_recharge_battery_to_full() {
        let robot = robot();
        tokio::time::sleep(Duration::from_secs(200) + Duration::from_millis(1)).await;
        assert!(robot.status().unwrap().battery_level < 100.0);

        let report = robot.charge_battery().await.unwrap();

        assert_eq!(report.operation, OperationKind::Charge);
        assert_eq!(report.zone, Zone::A);
        assert_eq!(report.message, "Battery charged to 100%");
        assert!((robot.status().unwrap().battery_level - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn should_publish_completion_and_activation_events() {
        let events = InProcessEventBus::new(16);
        let mut rx = events.subscribe();
        let robot = Robot::new(RobotSettings::default(), Arc::new(ZoneRegistry::default()), events)
            .unwrap();

        robot.move_to(Zone::B).await.unwrap();
        robot.deactivate().unwrap();

        let completed = rx.recv().await.unwrap();
        assert_eq!(completed.event_type, EventType::RobotOperationCompleted);
        assert_eq!(completed.zone, Some(Zone::B));
        assert_eq!(completed.data["message"], "Robot moved to zone B");
        assert_eq!(rx.recv().await.unwrap().event_type, EventType::RobotDeactivated);
    }
}

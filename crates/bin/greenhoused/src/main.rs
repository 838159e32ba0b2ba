//! # greenhoused — greenhouse simulation daemon
//!
//! Composition root that wires the simulation core to the virtual adapters.
//!
//! ## Responsibilities
//! - Load configuration (`greenhouse.toml` plus environment overrides)
//! - Initialise `tracing` logging
//! - Construct the virtual environment and sensors (adapters)
//! - Construct the [`GreenhouseEngine`], injecting adapters via port traits
//! - Run the scripted demo, log events and periodic status
//! - Shut down cleanly on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use greenhouse_adapter_virtual::{FormulaSensors, VirtualEnvironment};
use greenhouse_app::engine::GreenhouseEngine;
use greenhouse_domain::effect::EffectKind;
use greenhouse_domain::error::GreenhouseError;
use greenhouse_domain::event::Event;
use greenhouse_domain::robot::OperationReport;
use greenhouse_domain::zone::Zone;

type Engine = GreenhouseEngine<FormulaSensors, Arc<VirtualEnvironment>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter {:?}", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Adapters
    let environment = Arc::new(VirtualEnvironment::default());

    // Engine
    let settings = config.engine_settings()?;
    let engine = Arc::new(
        GreenhouseEngine::new(settings, FormulaSensors, Arc::clone(&environment))
            .context("failed to build greenhouse engine")?,
    );
    tracing::info!(
        robot_id = %config.robot.id,
        time_scale = config.time_scale,
        "greenhoused started"
    );

    let mut tasks: Vec<JoinHandle<()>> = vec![tokio::spawn(log_events(engine.subscribe()))];
    if config.demo.enabled {
        tasks.push(tokio::spawn(run_demo(Arc::clone(&engine), Arc::clone(&environment))));
        tasks.push(tokio::spawn(log_status(
            Arc::clone(&engine),
            config.status_interval()?,
        )));
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested");

    for task in &tasks {
        task.abort();
    }
    engine.shutdown()?;

    Ok(())
}

/// Scripted walk through the greenhouse's features.
async fn run_demo(engine: Arc<Engine>, environment: Arc<VirtualEnvironment>) {
    match environment.toggle_actuator("heater") {
        Ok(change) => tracing::info!(message = %change.message(), "demo step succeeded"),
        Err(err) => tracing::warn!(error = %err, "demo step failed"),
    }

    report("move", engine.move_robot(Zone::B).await);
    report(
        "water",
        engine.apply_treatment(Zone::B, EffectKind::Watering).await,
    );
    report(
        "manure",
        engine.apply_treatment(Zone::B, EffectKind::Manure).await,
    );
    report(
        "fertilize",
        engine.apply_treatment(Zone::C, EffectKind::Fertilizer).await,
    );

    match engine.read_zone(Zone::B) {
        Ok(readings) => tracing::info!(
            soil_moisture = readings.soil_moisture,
            ph = readings.ph_level,
            nutrients = readings.nutrient_level,
            "zone B readings"
        ),
        Err(err) => tracing::warn!(error = %err, "failed to read zone B"),
    }

    let change = environment.toggle_day_night();
    tracing::info!(message = %change.message(), "demo step succeeded");

    report("charge", engine.charge_robot().await);
}

fn report(step: &'static str, result: Result<OperationReport, GreenhouseError>) {
    match result {
        Ok(report) => tracing::info!(step, message = %report.message, "demo step succeeded"),
        Err(err) => tracing::warn!(step, error = %err, "demo step failed"),
    }
}

async fn log_status(engine: Arc<Engine>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let status = match engine.status() {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(error = %err, "failed to read greenhouse status");
                return;
            }
        };

        tracing::info!(
            zone = %status.robot.current_position,
            state = %status.robot.state,
            battery = status.robot.battery_level,
            is_day = status.environment.is_day,
            decay_runs = engine.decay().active_runs(),
            "greenhouse status"
        );
        match serde_json::to_string(&status.zone_effects) {
            Ok(effects) => tracing::debug!(%effects, "zone effects"),
            Err(err) => tracing::warn!(error = %err, "failed to serialize zone effects"),
        }
    }
}

async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::debug!(
                event_type = ?event.event_type,
                zone = ?event.zone,
                data = %event.data,
                "event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagging behind");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

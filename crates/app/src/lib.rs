//! # greenhouse-app
//!
//! Simulation core — the parts of the greenhouse with real temporal and
//! concurrency behaviour.
//!
//! ## Responsibilities
//! - [`effect_store::EffectStore`] — per-zone treatment intensities behind
//!   per-zone locks
//! - [`decay_scheduler::DecayScheduler`] — one debounced, cancellable decay
//!   task per `(zone, kind)` pair
//! - [`robot::Robot`] — mutually exclusive robot operations plus an
//!   independent battery-drain task
//! - [`engine::GreenhouseEngine`] — maps robot successes to effect
//!   applications and blends effects into sensor readings
//! - **Port traits** for the collaborators that live outside the core
//!   (sensor formulas, environment flags)
//! - In-process event bus
//!
//! ## Dependency rule
//! Depends on `greenhouse-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates.

pub mod decay_scheduler;
pub mod effect_store;
pub mod engine;
pub mod event_bus;
pub mod ports;
pub mod robot;

mod sync;

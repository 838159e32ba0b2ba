//! # greenhouse-adapter-virtual
//!
//! In-process stand-ins for the greenhouse hardware the simulation core
//! treats as external collaborators.
//!
//! ## Provided pieces
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualEnvironment`] | `EnvironmentProvider` | Day/night flag plus eight actuator switches |
//! | [`FormulaSensors`] | `SensorProvider` | Readings as pure formulas of the environment |
//!
//! ## Dependency rule
//!
//! Depends on `greenhouse-app` (port traits) and `greenhouse-domain` only.

mod environment;
mod sensors;

pub use environment::{ActuatorChange, DayNightChange, VirtualEnvironment};
pub use sensors::FormulaSensors;

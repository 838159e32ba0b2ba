//! Port definitions — traits for collaborators that live outside the core.
//!
//! Sensor formulas and the environment (day/night flag, actuator switches)
//! are owned by adapters. The engine only consumes them through these traits.

pub mod environment;
pub mod sensors;

pub use environment::EnvironmentProvider;
pub use sensors::SensorProvider;

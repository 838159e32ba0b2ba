//! # greenhouse-domain
//!
//! Pure domain model for the greenhouse simulator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, the error taxonomy, timestamps
//! - Define **Zones** (fixed sub-areas of the greenhouse) and their registry
//! - Define **Effects** (decaying treatment intensities per zone)
//! - Define the **Robot** vocabulary: states, operations, status views
//! - Define **Sensor readings** and the pure blending of effects into them
//! - Define the **Environment** (day/night flag and actuator switches)
//! - Define **Events** emitted by the simulation core
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or async runtimes.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod effect;
pub mod environment;
pub mod event;
pub mod robot;
pub mod sensor;
pub mod status;
pub mod zone;

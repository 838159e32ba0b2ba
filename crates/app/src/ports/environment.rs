//! Environment port — current day/night flag and actuator switches.

use greenhouse_domain::environment::Environment;

/// Supplies the environment snapshot sensor formulas are evaluated against.
pub trait EnvironmentProvider: Send + Sync {
    /// Snapshot of the environment as of this call.
    fn environment(&self) -> Environment;
}

impl<T: EnvironmentProvider + ?Sized> EnvironmentProvider for std::sync::Arc<T> {
    fn environment(&self) -> Environment {
        (**self).environment()
    }
}

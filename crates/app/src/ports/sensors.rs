//! Sensor port — raw readings as a pure function of the environment.

use greenhouse_domain::environment::Environment;
use greenhouse_domain::sensor::SensorReadings;

/// Produces raw (un-blended) sensor readings.
///
/// Implementations must be side-effect free with respect to the core: the
/// engine may call [`read`](Self::read) from any task at any time.
pub trait SensorProvider: Send + Sync {
    /// Read every sensor under the given environment.
    fn read(&self, environment: &Environment) -> SensorReadings;
}

impl<T: SensorProvider + ?Sized> SensorProvider for std::sync::Arc<T> {
    fn read(&self, environment: &Environment) -> SensorReadings {
        (**self).read(environment)
    }
}

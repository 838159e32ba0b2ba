//! Formula-driven sensors.
//!
//! Every reading is a pure function of the day/night flag and the actuator
//! switches, so the same environment always yields the same readings.

use greenhouse_app::ports::SensorProvider;
use greenhouse_domain::environment::Environment;
use greenhouse_domain::sensor::{LightLevel, SensorReadings};

/// Deterministic sensor bank for the simulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaSensors;

impl SensorProvider for FormulaSensors {
    fn read(&self, environment: &Environment) -> SensorReadings {
        let day = environment.is_day;
        let on = environment.actuators;

        let mut temperature = if day { 24.0 } else { 18.0 };
        if on.heater {
            temperature += 3.0;
        }
        if on.cooling_fan {
            temperature -= 3.0;
        }

        let mut humidity = if day { 55.0 } else { 65.0 };
        if on.humidifier {
            humidity += 10.0;
        }
        if on.dehumidifier {
            humidity -= 10.0;
        }

        let soil_moisture = if on.irrigation { 55.0 } else { 35.0 };

        let mut light_lux = if day { 30_000.0 } else { 50.0 };
        if on.lights {
            light_lux += 15_000.0;
        }

        let mut co2_level = if day { 380.0 } else { 450.0 };
        if on.lights {
            co2_level -= 20.0;
        }
        if on.co2_injector {
            co2_level += 400.0;
        }

        let nutrient_level = if on.nutrient_pump { 75.0 } else { 60.0 };

        SensorReadings {
            temperature,
            humidity,
            soil_moisture,
            light_lux,
            light_intensity: LightLevel::from_lux(light_lux),
            co2_level,
            ph_level: 5.8,
            nutrient_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenhouse_domain::environment::ActuatorFlags;

    fn night() -> Environment {
        Environment {
            is_day: false,
            actuators: ActuatorFlags::default(),
        }
    }

    #[test]
    fn should_read_daytime_baseline() {
        let readings = FormulaSensors.read(&Environment::default());

        assert!((readings.temperature - 24.0).abs() < f64::EPSILON);
        assert!((readings.humidity - 55.0).abs() < f64::EPSILON);
        assert!((readings.soil_moisture - 35.0).abs() < f64::EPSILON);
        assert_eq!(readings.light_intensity, LightLevel::Medium);
        assert!((readings.co2_level - 380.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_read_night_as_dark_and_cool() {
        let readings = FormulaSensors.read(&night());

        assert!((readings.temperature - 18.0).abs() < f64::EPSILON);
        assert_eq!(readings.light_intensity, LightLevel::Low);
        assert!((readings.co2_level - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_react_to_actuators() {
        let mut env = Environment::default();
        env.actuators.heater = true;
        env.actuators.irrigation = true;
        env.actuators.lights = true;
        env.actuators.co2_injector = true;
        env.actuators.nutrient_pump = true;

        let readings = FormulaSensors.read(&env);

        assert!((readings.temperature - 27.0).abs() < f64::EPSILON);
        assert!((readings.soil_moisture - 55.0).abs() < f64::EPSILON);
        assert_eq!(readings.light_intensity, LightLevel::High);
        assert!((readings.co2_level - 760.0).abs() < f64::EPSILON);
        assert!((readings.nutrient_level - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_cancel_opposing_climate_actuators() {
        let mut env = night();
        env.actuators.humidifier = true;
        env.actuators.dehumidifier = true;
        env.actuators.heater = true;
        env.actuators.cooling_fan = true;

        let readings = FormulaSensors.read(&env);

        assert!((readings.temperature - 18.0).abs() < f64::EPSILON);
        assert!((readings.humidity - 65.0).abs() < f64::EPSILON);
    }
}

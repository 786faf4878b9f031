//! International Standard Atmosphere, divided into seven layers each with
//! its own lapse rate.
//!
//! Height is geopotential altitude above mean sea level, positive up. All
//! quantities are SI (Kelvin, Pascal, meter, m/s^2).

use crate::constants::{
    GAS_CONSTANT_AIR, ISA_LAYER_BASE_ALTITUDES, ISA_LAYER_LAPSE_RATES, MAXIMUM_ALTITUDE,
    MINIMUM_PRESSURE, SEA_LEVEL_PRESSURE, SEA_LEVEL_TEMPERATURE,
};
use crate::errors::CoordinateError;

const GRAVITATIONAL_ACCELERATION: f64 = -9.80665;
const NUMBER_OF_LAYERS: usize = ISA_LAYER_BASE_ALTITUDES.len();

#[derive(Debug, Clone)]
pub struct Atmosphere {
    base_pressure: [f64; NUMBER_OF_LAYERS],
    base_temperature: [f64; NUMBER_OF_LAYERS],
}

impl Default for Atmosphere {
    fn default() -> Self {
        Atmosphere::new(SEA_LEVEL_TEMPERATURE, SEA_LEVEL_PRESSURE)
    }
}

impl Atmosphere {
    /// Rebuild the per-layer base pressure/temperature table from a ground
    /// calibration measurement, propagating upward layer by layer.
    pub fn new(ground_temperature: f64, ground_pressure: f64) -> Self {
        let mut base_temperature = [0.0; NUMBER_OF_LAYERS];
        let mut base_pressure = [0.0; NUMBER_OF_LAYERS];
        base_temperature[0] = ground_temperature;
        base_pressure[0] = ground_pressure;

        for layer in 0..NUMBER_OF_LAYERS - 1 {
            let delta_z = ISA_LAYER_BASE_ALTITUDES[layer + 1] - ISA_LAYER_BASE_ALTITUDES[layer];
            let lapse = ISA_LAYER_LAPSE_RATES[layer];
            base_pressure[layer + 1] = if lapse == 0.0 {
                let exponent = GRAVITATIONAL_ACCELERATION * delta_z
                    / GAS_CONSTANT_AIR
                    / base_temperature[layer];
                base_pressure[layer] * exponent.exp()
            } else {
                let base = (lapse * delta_z / base_temperature[layer]) + 1.0;
                let exponent = GRAVITATIONAL_ACCELERATION / (GAS_CONSTANT_AIR * lapse);
                base_pressure[layer] * base.powf(exponent)
            };
            base_temperature[layer + 1] = base_temperature[layer] + delta_z * lapse;
        }

        Atmosphere { base_pressure, base_temperature }
    }

    fn layer_for_altitude(&self, altitude: f64) -> usize {
        let mut layer = 0;
        while layer < NUMBER_OF_LAYERS - 1 && altitude > ISA_LAYER_BASE_ALTITUDES[layer + 1] {
            layer += 1;
        }
        layer
    }

    pub fn altitude_to_temperature(&self, altitude: f64) -> f64 {
        let layer = self.layer_for_altitude(altitude);
        let delta_z = altitude - ISA_LAYER_BASE_ALTITUDES[layer];
        self.base_temperature[layer] + delta_z * ISA_LAYER_LAPSE_RATES[layer]
    }

    pub fn altitude_to_air_density(&self, altitude: f64) -> f64 {
        self.altitude_to_pressure(altitude) / (GAS_CONSTANT_AIR * self.altitude_to_temperature(altitude))
    }

    pub fn altitude_to_pressure(&self, altitude: f64) -> f64 {
        if altitude > MAXIMUM_ALTITUDE {
            return 0.0;
        }

        let layer = self.layer_for_altitude(altitude);
        let delta_z = altitude - ISA_LAYER_BASE_ALTITUDES[layer];
        let lapse = ISA_LAYER_LAPSE_RATES[layer];
        if lapse == 0.0 {
            let exponent =
                GRAVITATIONAL_ACCELERATION * delta_z / GAS_CONSTANT_AIR / self.base_temperature[layer];
            self.base_pressure[layer] * exponent.exp()
        } else {
            let base = (lapse * delta_z / self.base_temperature[layer]) + 1.0;
            let exponent = GRAVITATIONAL_ACCELERATION / (GAS_CONSTANT_AIR * lapse);
            self.base_pressure[layer] * base.powf(exponent)
        }
    }

    pub fn pressure_to_altitude(&self, pressure: f64) -> Result<f64, CoordinateError> {
        if pressure < 0.0 {
            return Err(CoordinateError::IllegalPressure(pressure));
        }
        if pressure > self.base_pressure[0] {
            return Ok(ISA_LAYER_BASE_ALTITUDES[0]);
        }
        if pressure < MINIMUM_PRESSURE {
            return Ok(MAXIMUM_ALTITUDE);
        }

        let mut next_base_temperature = self.base_temperature[0];
        let mut next_base_pressure = self.base_pressure[0];
        let mut layer = 0usize;
        let mut base_pressure;
        let mut base_temperature;
        loop {
            base_pressure = next_base_pressure;
            base_temperature = next_base_temperature;
            let delta_z = ISA_LAYER_BASE_ALTITUDES[layer + 1] - ISA_LAYER_BASE_ALTITUDES[layer];
            let lapse = ISA_LAYER_LAPSE_RATES[layer];
            if lapse == 0.0 {
                let exponent =
                    GRAVITATIONAL_ACCELERATION * delta_z / GAS_CONSTANT_AIR / base_temperature;
                next_base_pressure *= exponent.exp();
            } else {
                let base = (lapse * delta_z / base_temperature) + 1.0;
                let exponent = GRAVITATIONAL_ACCELERATION / (GAS_CONSTANT_AIR * lapse);
                next_base_pressure *= base.powf(exponent);
            }
            next_base_temperature += delta_z * lapse;

            if layer >= NUMBER_OF_LAYERS - 2 || pressure >= next_base_pressure {
                break;
            }
            layer += 1;
        }

        let lapse = ISA_LAYER_LAPSE_RATES[layer];
        let altitude = if lapse == 0.0 {
            let coefficient = (GAS_CONSTANT_AIR / GRAVITATIONAL_ACCELERATION) * base_temperature;
            ISA_LAYER_BASE_ALTITUDES[layer] + coefficient * (pressure / base_pressure).ln()
        } else {
            let base = pressure / base_pressure;
            let exponent = GAS_CONSTANT_AIR * lapse / GRAVITATIONAL_ACCELERATION;
            let coefficient = base_temperature / lapse;
            ISA_LAYER_BASE_ALTITUDES[layer] + coefficient * (base.powf(exponent) - 1.0)
        };
        Ok(altitude)
    }
}

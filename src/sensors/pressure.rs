//! Barometric pressure sensor, reading the atmosphere at the rocket's
//! current WGS-84 altitude.

use super::likelihood::quantized_log_likelihood;
use crate::atmosphere::Atmosphere;
use crate::constants::ADC_MASK;
use crate::coordinates::geodetic::ecef_to_geodetic;
use crate::models::RocketState;

const BIAS: f64 = -470.734;
const GAIN: f64 = 44.549779924087175 / 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureReading {
    pub counts: u16,
}

fn quantize(value: f64) -> u16 {
    value.round().clamp(0.0, ADC_MASK as f64) as u16
}

fn forward_model(state: &RocketState, atmosphere: &Atmosphere) -> f64 {
    let altitude = ecef_to_geodetic(state.pos).altitude;
    atmosphere.altitude_to_pressure(altitude) * GAIN + BIAS
}

pub struct Pressure;

impl Pressure {
    pub fn simulate(state: &RocketState, atmosphere: &Atmosphere) -> PressureReading {
        PressureReading { counts: quantize(forward_model(state, atmosphere)) }
    }

    pub fn log_likelihood(
        observed: &PressureReading,
        state: &RocketState,
        atmosphere: &Atmosphere,
        std_counts: f64,
    ) -> f64 {
        let predicted = forward_model(state, atmosphere);
        quantized_log_likelihood(observed.counts, predicted, std_counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;

    #[test]
    fn altitude_increase_reduces_reading() {
        let atmosphere = Atmosphere::default();
        let ground = RocketState::at_rest(na::Vector3::new(0.0, 0.0, 6_378_137.0), na::Matrix3::identity());
        let aloft = RocketState::at_rest(na::Vector3::new(0.0, 0.0, 6_378_137.0 + 3000.0), na::Matrix3::identity());

        let ground_reading = Pressure::simulate(&ground, &atmosphere);
        let aloft_reading = Pressure::simulate(&aloft, &atmosphere);
        assert!(aloft_reading.counts < ground_reading.counts);
    }
}

//! Three-axis rate gyroscope. `rotvel` on [`RocketState`] is already
//! expressed in the body frame, so this forward model is a pure affine
//! scale/offset with no additional rotation.

use super::likelihood::quantized_log_likelihood;
use crate::constants::ADC_MASK;
use crate::models::RocketState;

const DEGREES_PER_RADIAN: f64 = 180.0 / std::f64::consts::PI;
const BIAS: [f64; 3] = [2048.0, 2048.0, 2048.0];
const GAIN: f64 = 5.0 * 1.1628 * DEGREES_PER_RADIAN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroscopeReading {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

fn quantize(value: f64) -> u16 {
    value.round().clamp(0.0, ADC_MASK as f64) as u16
}

fn forward_model(state: &RocketState) -> [f64; 3] {
    [
        state.rotvel.x * GAIN + BIAS[0],
        state.rotvel.y * GAIN + BIAS[1],
        state.rotvel.z * GAIN + BIAS[2],
    ]
}

pub struct Gyroscope;

impl Gyroscope {
    pub fn simulate(state: &RocketState) -> GyroscopeReading {
        let raw = forward_model(state);
        GyroscopeReading { x: quantize(raw[0]), y: quantize(raw[1]), z: quantize(raw[2]) }
    }

    pub fn log_likelihood(observed: &GyroscopeReading, state: &RocketState, std_counts: f64) -> f64 {
        let predicted = forward_model(state);
        let observed = [observed.x, observed.y, observed.z];
        observed
            .iter()
            .zip(predicted.iter())
            .map(|(&obs, &mean)| quantized_log_likelihood(obs, mean, std_counts))
            .sum()
    }
}

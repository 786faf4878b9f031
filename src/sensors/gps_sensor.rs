//! GPS position/velocity fix. Unlike the ADC-backed sensors this estimator
//! treats GPS as an already-linearized floating point measurement: no
//! quantization bucket, identity forward model on the ECEF components.

use super::likelihood::log_gprob;
use crate::models::RocketState;
use nalgebra as na;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub pos: na::Vector3<f64>,
    pub vel: na::Vector3<f64>,
}

pub struct GpsSensor;

impl GpsSensor {
    pub fn simulate(state: &RocketState) -> GpsFix {
        GpsFix { pos: state.pos, vel: state.vel }
    }

    pub fn log_likelihood(observed: &GpsFix, state: &RocketState, pos_std: f64, vel_std: f64) -> f64 {
        let pos_variance = pos_std * pos_std;
        let vel_variance = vel_std * vel_std;
        let pos_ll: f64 = (0..3).map(|i| log_gprob(observed.pos[i] - state.pos[i], pos_variance)).sum();
        let vel_ll: f64 = (0..3).map(|i| log_gprob(observed.vel[i] - state.vel[i], vel_variance)).sum();
        pos_ll + vel_ll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fix_beats_offset_fix() {
        let state = RocketState::at_rest(na::Vector3::new(0.0, 0.0, 6_378_137.0), na::Matrix3::identity());
        let fix = GpsSensor::simulate(&state);
        let offset = GpsFix { pos: fix.pos + na::Vector3::new(500.0, 0.0, 0.0), vel: fix.vel };

        let exact = GpsSensor::log_likelihood(&fix, &state, 5.0, 1.0);
        let off = GpsSensor::log_likelihood(&offset, &state, 5.0, 1.0);
        assert!(exact > off);
    }
}

//! The rigid-body state carried by every particle and by the simulator's
//! ground truth: a canonical struct in place of the C union/`component[3]`
//! idiom this was ported from.

use crate::math::axis_angle_to_mat3;
use nalgebra as na;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketState {
    pub pos: na::Vector3<f64>, // ECEF meters
    pub vel: na::Vector3<f64>, // ECEF m/s
    pub acc: na::Vector3<f64>, // ECEF m/s^2
    pub rotpos: na::Matrix3<f64>, // ECEF -> body rotation
    pub rotvel: na::Vector3<f64>, // body-frame rad/s
}

impl RocketState {
    pub fn at_rest(pos: na::Vector3<f64>, rotpos: na::Matrix3<f64>) -> Self {
        RocketState {
            pos,
            vel: na::Vector3::zeros(),
            acc: na::Vector3::zeros(),
            rotpos,
            rotvel: na::Vector3::zeros(),
        }
    }

    /// Advance orientation by one step's worth of angular velocity, via
    /// Rodrigues' formula. Shared by every integrator variant.
    pub fn advance_orientation(&mut self, dt: f64) {
        self.rotpos = self.rotpos * axis_angle_to_mat3(self.rotvel * dt);
    }

    /// True when `rotpos` is (within tolerance) a proper rotation matrix.
    pub fn has_valid_rotation(&self) -> bool {
        let should_be_identity = self.rotpos.transpose() * self.rotpos;
        let identity = na::Matrix3::identity();
        (should_be_identity - identity).abs().max() < 1e-6 && (self.rotpos.determinant() - 1.0).abs() < 1e-6
    }
}

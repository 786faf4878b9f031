use crate::constants::EARTH_GRAVITY;
use nalgebra as na;

/// Constant-magnitude gravity directed from `pos` toward the Earth center.
/// TODO: apply at the approximate center of mass rather than at `pos`.
pub fn gravity_acceleration(pos: &na::Vector3<f64>) -> na::Vector3<f64> {
    pos * (-EARTH_GRAVITY / pos.magnitude())
}

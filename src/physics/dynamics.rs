//! Ground-truth rigid-body dynamics: thrust + drag + gravity, driving the
//! RK4 integrator used by the simulator's truth generator (never by the
//! filter's own `predict`, which just advances whatever acceleration a
//! particle already carries).

use super::drag::{drag_force, DragConfiguration};
use super::gravity::gravity_acceleration;
use crate::atmosphere::Atmosphere;
use crate::constants::{BURN_RATE, ENGINE_BURN_TIME, ENGINE_THRUST, FUEL_MASS, ROCKET_EMPTY_MASS, THRUST_RAMP_TIME};
use nalgebra as na;

/// Position+velocity pair; the sub-state the RK4 integrator blends. Kept
/// separate from the full `RocketState` because orientation does not
/// integrate linearly the way position and velocity do.
#[derive(Debug, Clone, Copy)]
pub struct PosVel {
    pub pos: na::Vector3<f64>,
    pub vel: na::Vector3<f64>,
}

impl std::ops::Add for PosVel {
    type Output = PosVel;
    fn add(self, rhs: PosVel) -> PosVel {
        PosVel { pos: self.pos + rhs.pos, vel: self.vel + rhs.vel }
    }
}

impl std::ops::Mul<f64> for PosVel {
    type Output = PosVel;
    fn mul(self, scalar: f64) -> PosVel {
        PosVel { pos: self.pos * scalar, vel: self.vel * scalar }
    }
}

pub trait EquationsOfMotion {
    type State;
    fn compute_derivative(&self, t: f64, state: &Self::State) -> Self::State;
}

/// Mass remaining after burning fuel linearly for `elapsed` seconds since
/// ignition.
pub fn rocket_mass(elapsed_since_ignition: Option<f64>) -> f64 {
    match elapsed_since_ignition {
        Some(elapsed) if elapsed < ENGINE_BURN_TIME => {
            ROCKET_EMPTY_MASS + FUEL_MASS - BURN_RATE * elapsed
        }
        Some(_) => ROCKET_EMPTY_MASS,
        None => ROCKET_EMPTY_MASS + FUEL_MASS,
    }
}

/// Thrust in ECEF, ramped up/down over [`THRUST_RAMP_TIME`] at ignition and
/// burnout, rotated from the body +z axis into ECEF by `rotpos`.
pub fn thrust_acceleration(
    elapsed_since_ignition: Option<f64>,
    rotpos: &na::Matrix3<f64>,
    mass: f64,
) -> na::Vector3<f64> {
    let Some(elapsed) = elapsed_since_ignition else {
        return na::Vector3::zeros();
    };
    if elapsed >= ENGINE_BURN_TIME {
        return na::Vector3::zeros();
    }
    let scale = if elapsed < THRUST_RAMP_TIME {
        elapsed / THRUST_RAMP_TIME
    } else if elapsed > ENGINE_BURN_TIME - THRUST_RAMP_TIME {
        (ENGINE_BURN_TIME - elapsed) / THRUST_RAMP_TIME
    } else {
        1.0
    };
    let body_thrust = na::Vector3::new(0.0, 0.0, scale * ENGINE_THRUST);
    (rotpos.transpose() * body_thrust) / mass
}

/// Ground-truth acceleration functional: thrust + drag + gravity.
///
/// `t` passed to [`compute_derivative`] is absolute simulation time in
/// seconds; `ignition_time` is the absolute time the engine was lit, so
/// elapsed burn time is simply `t - ignition_time`.
pub struct FlightPhysicsContext<'a> {
    pub atmosphere: &'a Atmosphere,
    pub rotpos: na::Matrix3<f64>,
    pub ignition_time: Option<f64>,
    pub drag_configuration: DragConfiguration,
}

impl<'a> EquationsOfMotion for FlightPhysicsContext<'a> {
    type State = PosVel;

    fn compute_derivative(&self, t: f64, state: &PosVel) -> PosVel {
        let elapsed_since_ignition = self.ignition_time.map(|ignition| t - ignition);
        let mass = rocket_mass(elapsed_since_ignition);
        let thrust_acc = thrust_acceleration(elapsed_since_ignition, &self.rotpos, mass);
        let drag_acc = drag_force(&state.pos, &state.vel, self.atmosphere, self.drag_configuration) / mass;
        let gravity_acc = gravity_acceleration(&state.pos);
        PosVel { pos: state.vel, vel: gravity_acc + thrust_acc + drag_acc }
    }
}

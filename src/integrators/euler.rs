use crate::models::RocketState;

/// The filter's predict-step propagator: advance `pos`/`vel` by whatever
/// acceleration the particle already carries, and advance orientation by
/// `rotvel`. Deliberately does not recompute `acc` from a physics
/// functional and never ground-clips — both are the simulator truth
/// generator's job (see [`crate::physics::dynamics::FlightPhysicsContext`]
/// and the demo binary's ground-truth loop).
pub fn semi_implicit_euler_step(state: &mut RocketState, dt: f64) {
    state.pos += state.vel * dt;
    state.vel += state.acc * dt;
    state.advance_orientation(dt);
}

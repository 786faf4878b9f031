use crate::models::RocketState;

/// One weighted hypothesis in the particle population. `weight` is carried
/// in log-space throughout, both to avoid underflow across many chained
/// sensor updates between resamplings and because every consumer
/// (`normalize`, `resample`, the phase machine's consensus weights) wants a
/// sum of exponentials rather than a product.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub weight: f64,
    pub state: RocketState,
}

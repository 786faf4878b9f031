pub mod drag;
pub mod dynamics;
pub mod gravity;

pub use dynamics::{rocket_mass, thrust_acceleration, FlightPhysicsContext};

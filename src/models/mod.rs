pub mod rocket_state;

pub use rocket_state::RocketState;

pub mod atmosphere;
pub mod callbacks;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod errors;
pub mod estimator;
pub mod filter;
pub mod fsm;
pub mod gps;
pub mod integrators;
pub mod math;
pub mod models;
pub mod physics;
pub mod sensors;

pub use callbacks::FlightCallbacks;
pub use config::FilterConfig;
pub use errors::EstimatorError;
pub use estimator::Estimator;
pub use fsm::Phase;

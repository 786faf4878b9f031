pub mod phase;
pub mod state_machine;

pub use phase::Phase;
pub use state_machine::PhaseStateMachine;

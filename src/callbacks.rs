//! The harness-facing side of the estimator: actuator toggles, state
//! change notifications and error/trace reporting, modeled as a trait
//! object supplied at construction rather than module-level function
//! pointers.

use crate::fsm::Phase;

pub trait FlightCallbacks {
    /// Phase change notification.
    fn report_state(&mut self, phase: Phase);

    /// Actuator toggles. `go = true` commands the actuator to fire;
    /// repeated calls with the same value are idempotent from the host's
    /// perspective, but the estimator logs the second call as an anomaly.
    fn ignite(&mut self, go: bool);
    fn drogue_chute(&mut self, go: bool);
    fn main_chute(&mut self, go: bool);

    /// A non-fatal, user-visible error (command violations and the like).
    fn enqueue_error(&mut self, message: &str);

    /// Optional observability hook mirroring the original harness's
    /// `trace_state`; the crate's own `tracing` spans (§4.L) are emitted
    /// independently of whatever this does.
    fn trace_state(&mut self, label: &str, message: &str) {
        let _ = (label, message);
    }
}

/// A callback sink that records everything for inspection, used by tests
/// and the demo binary's dry-run mode.
#[derive(Debug, Default)]
pub struct RecordingCallbacks {
    pub phases: Vec<Phase>,
    pub ignitions: Vec<bool>,
    pub drogue_chutes: Vec<bool>,
    pub main_chutes: Vec<bool>,
    pub errors: Vec<String>,
}

impl FlightCallbacks for RecordingCallbacks {
    fn report_state(&mut self, phase: Phase) {
        self.phases.push(phase);
    }

    fn ignite(&mut self, go: bool) {
        self.ignitions.push(go);
    }

    fn drogue_chute(&mut self, go: bool) {
        self.drogue_chutes.push(go);
    }

    fn main_chute(&mut self, go: bool) {
        self.main_chutes.push(go);
    }

    fn enqueue_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

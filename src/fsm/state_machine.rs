//! Flight-phase transitions driven by weighted consensus over the particle
//! cloud rather than raw sensor thresholds, with hysteresis on every edge
//! and rate-limited, single-shot pyrotechnic actuation.

use super::Phase;
use crate::callbacks::FlightCallbacks;
use crate::config::FilterConfig;
use crate::coordinates::ecef_to_geodetic;
use crate::filter::Particle;
use crate::physics::gravity::gravity_acceleration;

fn on_ground_mass(particles: &[Particle], config: &FilterConfig) -> f64 {
    particles
        .iter()
        .filter(|p| {
            p.state.vel.magnitude() <= config.on_ground_velocity_threshold
                && p.state.acc.magnitude() <= config.on_ground_acceleration_threshold
        })
        .map(|p| p.weight.exp())
        .sum()
}

fn deploy_drogue_mass(particles: &[Particle], config: &FilterConfig) -> f64 {
    particles
        .iter()
        .filter(|p| {
            let descending = p.state.pos.dot(&p.state.vel) < 0.0;
            let gravity = gravity_acceleration(&p.state.pos);
            let freefall = (gravity - p.state.acc).magnitude() <= config.freefall_acceleration_threshold;
            descending && freefall
        })
        .map(|p| p.weight.exp())
        .sum()
}

fn deploy_main_mass(particles: &[Particle], launch_altitude: f64, config: &FilterConfig) -> f64 {
    particles
        .iter()
        .filter(|p| {
            let descending = p.state.pos.dot(&p.state.vel) < 0.0;
            let altitude = ecef_to_geodetic(p.state.pos).altitude;
            let low = altitude < launch_altitude + config.main_deploy_altitude;
            let fast = p.state.vel.magnitude() >= config.main_deploy_velocity_threshold;
            descending && low && fast
        })
        .map(|p| p.weight.exp())
        .sum()
}

pub struct PhaseStateMachine {
    phase: Phase,
    on_ground_duration: f64,
    not_on_ground_duration: f64,
    deploy_drogue_duration: f64,
    deploy_main_duration: f64,
    drogue_rate_limit_remaining: f64,
    main_rate_limit_remaining: f64,
    drogue_fired: bool,
    main_fired: bool,
    ignited: bool,
    launch_altitude: Option<f64>,
}

impl Default for PhaseStateMachine {
    fn default() -> Self {
        PhaseStateMachine {
            phase: Phase::Preflight,
            on_ground_duration: 0.0,
            not_on_ground_duration: 0.0,
            deploy_drogue_duration: 0.0,
            deploy_main_duration: 0.0,
            drogue_rate_limit_remaining: 0.0,
            main_rate_limit_remaining: 0.0,
            drogue_fired: false,
            main_fired: false,
            ignited: false,
            launch_altitude: None,
        }
    }
}

impl PhaseStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn can_arm(&self, config: &FilterConfig) -> bool {
        self.on_ground_duration > config.can_arm_duration
    }

    /// Operator command: arm, provided the system is on the pad and the
    /// ground-consensus hysteresis window has elapsed.
    pub fn arm(&mut self, callbacks: &mut dyn FlightCallbacks, config: &FilterConfig) {
        if self.phase == Phase::Preflight && self.can_arm(config) {
            self.phase = Phase::Armed;
            callbacks.report_state(self.phase);
        } else {
            callbacks.enqueue_error("cannot arm: not preflight or ground consensus not yet settled");
        }
    }

    /// Operator command: launch. Fires the engine exactly once; every
    /// later call is a command violation, not a second ignition.
    pub fn launch(&mut self, callbacks: &mut dyn FlightCallbacks, launch_altitude: f64) {
        if self.phase == Phase::Armed && !self.ignited {
            self.ignited = true;
            self.launch_altitude = Some(launch_altitude);
            callbacks.ignite(true);
        } else {
            callbacks.enqueue_error("cannot launch: not armed or already launched");
        }
    }

    /// Per-tick consensus update: advance hysteresis durations, transition
    /// phase on any edge that has held long enough, and fire drogue/main
    /// pyros under rate limiting once each, ever.
    pub fn update(
        &mut self,
        dt: f64,
        particles: &[Particle],
        callbacks: &mut dyn FlightCallbacks,
        config: &FilterConfig,
    ) {
        let on_ground = on_ground_mass(particles, config);
        if on_ground > 0.5 {
            self.on_ground_duration += dt;
            self.not_on_ground_duration = 0.0;
        } else {
            self.not_on_ground_duration += dt;
            self.on_ground_duration = 0.0;
        }

        if self.phase != Phase::Flight && self.not_on_ground_duration > config.flight_detect_duration {
            self.phase = Phase::Flight;
            callbacks.report_state(self.phase);
        }

        if self.phase == Phase::Flight && self.on_ground_duration > config.recovery_detect_duration {
            self.phase = Phase::Recovery;
            callbacks.report_state(self.phase);
        }

        self.drogue_rate_limit_remaining = (self.drogue_rate_limit_remaining - dt).max(0.0);
        self.main_rate_limit_remaining = (self.main_rate_limit_remaining - dt).max(0.0);

        if self.phase == Phase::Flight {
            let drogue_mass = deploy_drogue_mass(particles, config);
            self.deploy_drogue_duration = if drogue_mass > 0.5 { self.deploy_drogue_duration + dt } else { 0.0 };
            if !self.drogue_fired
                && self.deploy_drogue_duration > config.deploy_detect_duration
                && self.drogue_rate_limit_remaining <= 0.0
            {
                self.drogue_fired = true;
                self.drogue_rate_limit_remaining = config.pyro_rate_limit;
                callbacks.drogue_chute(true);
            }

            if let Some(launch_altitude) = self.launch_altitude {
                let main_mass = deploy_main_mass(particles, launch_altitude, config);
                self.deploy_main_duration = if main_mass > 0.5 { self.deploy_main_duration + dt } else { 0.0 };
                if !self.main_fired
                    && self.deploy_main_duration > config.deploy_detect_duration
                    && self.main_rate_limit_remaining <= 0.0
                {
                    self.main_fired = true;
                    self.main_rate_limit_remaining = config.pyro_rate_limit;
                    callbacks.main_chute(true);
                }
            }
        } else {
            self.deploy_drogue_duration = 0.0;
            self.deploy_main_duration = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::RecordingCallbacks;
    use crate::models::RocketState;
    use nalgebra as na;

    fn particle_at_rest(weight: f64) -> Particle {
        Particle {
            weight,
            state: RocketState::at_rest(na::Vector3::new(0.0, 0.0, 6_378_137.0), na::Matrix3::identity()),
        }
    }

    #[test]
    fn arms_after_ground_hysteresis() {
        let config = FilterConfig::default();
        let mut fsm = PhaseStateMachine::new();
        let mut callbacks = RecordingCallbacks::default();
        let particles = vec![particle_at_rest(0.0)];

        for _ in 0..10 {
            fsm.update(0.1, &particles, &mut callbacks, &config);
        }
        assert!(fsm.can_arm(&config));
        fsm.arm(&mut callbacks, &config);
        assert_eq!(fsm.phase(), Phase::Armed);
        assert!(callbacks.errors.is_empty());
    }

    #[test]
    fn arm_before_hysteresis_is_rejected() {
        let config = FilterConfig::default();
        let mut fsm = PhaseStateMachine::new();
        let mut callbacks = RecordingCallbacks::default();
        fsm.arm(&mut callbacks, &config);
        assert_eq!(fsm.phase(), Phase::Preflight);
        assert_eq!(callbacks.errors.len(), 1);
    }

    #[test]
    fn double_launch_is_a_command_violation() {
        let config = FilterConfig::default();
        let mut fsm = PhaseStateMachine::new();
        let mut callbacks = RecordingCallbacks::default();
        let particles = vec![particle_at_rest(0.0)];
        for _ in 0..10 {
            fsm.update(0.1, &particles, &mut callbacks, &config);
        }
        fsm.arm(&mut callbacks, &config);
        fsm.launch(&mut callbacks, 0.0);
        fsm.launch(&mut callbacks, 0.0);
        assert_eq!(callbacks.ignitions.len(), 1);
        assert_eq!(callbacks.errors.len(), 1);
    }
}

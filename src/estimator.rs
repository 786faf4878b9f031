//! The owning type: holds every piece of estimator state explicitly
//! (particle population, phase machine, atmosphere model, harness
//! callbacks) in place of the module-level singletons the original
//! firmware used, and exposes the same tick/sensor/command surface on it.

use crate::atmosphere::Atmosphere;
use crate::callbacks::FlightCallbacks;
use crate::config::FilterConfig;
use crate::coordinates::{ecef_to_geodetic, Geodetic};
use crate::errors::EstimatorError;
use crate::filter::ParticlePopulation;
use crate::fsm::{Phase, PhaseStateMachine};
use crate::sensors::{
    Accelerometer, AccelerometerReading, GpsFix, GpsSensor, Gyroscope, GyroscopeReading, Magnetometer,
    MagnetometerReading, Pressure, PressureReading,
};
use nalgebra as na;

pub struct Estimator {
    config: FilterConfig,
    population: ParticlePopulation,
    fsm: PhaseStateMachine,
    atmosphere: Atmosphere,
    callbacks: Box<dyn FlightCallbacks>,
    time_since_resample: f64,
}

impl Estimator {
    pub fn new(config: FilterConfig, callbacks: Box<dyn FlightCallbacks>) -> Self {
        let population = ParticlePopulation::new(config.particle_count);
        Estimator {
            population,
            fsm: PhaseStateMachine::new(),
            atmosphere: Atmosphere::default(),
            callbacks,
            time_since_resample: 0.0,
            config,
        }
    }

    /// One-shot initialization: seed every particle at `origin`, at rest.
    pub fn init(&mut self, origin: Geodetic) {
        self.population.init(origin);
        self.time_since_resample = 0.0;
        tracing::info!(latitude = origin.latitude, longitude = origin.longitude, altitude = origin.altitude, "estimator initialized");
    }

    pub fn phase(&self) -> Phase {
        self.fsm.phase()
    }

    pub fn can_arm(&self) -> bool {
        self.fsm.can_arm(&self.config)
    }

    pub fn arm(&mut self) {
        self.fsm.arm(self.callbacks.as_mut(), &self.config);
    }

    pub fn launch(&mut self) {
        let centroid_altitude = ecef_to_geodetic(self.weighted_centroid_position()).altitude;
        self.fsm.launch(self.callbacks.as_mut(), centroid_altitude);
    }

    pub fn accelerometer_sensor(&mut self, reading: AccelerometerReading) {
        let sigma = self.config.accelerometer_noise_counts;
        self.population.update(|state| Accelerometer::log_likelihood(&reading, state, sigma));
    }

    pub fn gyroscope_sensor(&mut self, reading: GyroscopeReading) {
        let sigma = self.config.gyroscope_noise_counts;
        self.population.update(|state| Gyroscope::log_likelihood(&reading, state, sigma));
    }

    pub fn magnetometer_sensor(&mut self, reading: MagnetometerReading) {
        let sigma = self.config.magnetometer_noise_counts;
        self.population.update(|state| Magnetometer::log_likelihood(&reading, state, sigma));
    }

    pub fn pressure_sensor(&mut self, reading: PressureReading) {
        let sigma = self.config.pressure_noise_counts;
        let atmosphere = &self.atmosphere;
        self.population.update(|state| Pressure::log_likelihood(&reading, state, atmosphere, sigma));
    }

    pub fn gps_sensor(&mut self, fix: GpsFix) {
        let pos_sigma = self.config.gps_position_noise;
        let vel_sigma = self.config.gps_velocity_noise;
        self.population.update(|state| GpsSensor::log_likelihood(&fix, state, pos_sigma, vel_sigma));
    }

    fn weighted_centroid_position(&self) -> na::Vector3<f64> {
        self.population
            .current()
            .iter()
            .fold(na::Vector3::zeros(), |acc, p| acc + p.state.pos * p.weight.exp())
    }

    /// Advance one cooperative tick by `dt` seconds:
    /// 1. renormalize the weights accumulated by sensor callbacks since the
    ///    last tick so the cloud sums to 1 before consensus is read off it;
    /// 2. run the phase machine's consensus update against the normalized
    ///    weights;
    /// 3. resample if the effective sample size collapsed or the resample
    ///    interval elapsed;
    /// 4. check the particle-count/rotation invariants;
    /// 5. advance every particle by `dt` under the filter's propagator.
    pub fn tick(&mut self, dt: f64) -> Result<(), EstimatorError> {
        self.time_since_resample += dt;

        match self.population.normalize() {
            Some(ess) => {
                self.fsm.update(dt, self.population.current(), self.callbacks.as_mut(), &self.config);

                let threshold = self.config.ess_resample_fraction * self.config.particle_count as f64;
                if ess < threshold || self.time_since_resample > self.config.resample_interval_cap {
                    self.population.resample();
                    self.time_since_resample = 0.0;
                    tracing::debug!(ess, "resampled particle population");
                }
            }
            None => {
                tracing::warn!("all particle weights underflowed to -infinity; forcing uniform resample");
                self.population.resample();
                self.time_since_resample = 0.0;
                self.fsm.update(dt, self.population.current(), self.callbacks.as_mut(), &self.config);
            }
        }

        if self.population.len() != self.config.particle_count {
            return Err(EstimatorError::InvariantViolation(format!(
                "particle count drifted: expected {}, found {}",
                self.config.particle_count,
                self.population.len()
            )));
        }
        for particle in self.population.current() {
            if !particle.state.has_valid_rotation() {
                return Err(EstimatorError::InvariantViolation(
                    "particle rotpos is not a proper rotation matrix".to_string(),
                ));
            }
        }

        let centroid = self.weighted_centroid_position();
        tracing::trace!(x = centroid.x, y = centroid.y, z = centroid.z, "tick centroid");

        self.population.predict(dt, &self.config);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::RecordingCallbacks;

    fn pad_origin() -> Geodetic {
        Geodetic::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0)
    }

    #[test]
    fn preflight_idle_can_arm_after_hysteresis() {
        let mut estimator = Estimator::new(FilterConfig::default(), Box::new(RecordingCallbacks::default()));
        estimator.init(pad_origin());

        for _ in 0..100 {
            estimator.tick(0.01).unwrap();
        }
        assert!(estimator.can_arm());
        estimator.arm();
        assert_eq!(estimator.phase(), Phase::Armed);
    }

    #[test]
    fn ticking_preserves_particle_count_invariant() {
        let mut estimator = Estimator::new(FilterConfig::default(), Box::new(RecordingCallbacks::default()));
        estimator.init(pad_origin());
        for _ in 0..50 {
            assert!(estimator.tick(0.02).is_ok());
        }
    }
}

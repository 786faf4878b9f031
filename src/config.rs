//! Tunable constants for the particle filter and phase state machine.
//!
//! Collected here, with a [`Default`] impl matching the canonical values
//! from the design notes, so tests can construct an [`crate::estimator::Estimator`]
//! with a non-default configuration instead of editing magic numbers inline.

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FilterConfig {
    pub particle_count: usize,

    /// Per-axis process-noise standard deviations injected during `predict`.
    pub process_noise_position: f64, // m
    pub process_noise_velocity: f64, // m/s
    pub process_noise_acceleration: f64, // m/s^2

    /// Resample when ESS / N falls below this fraction...
    pub ess_resample_fraction: f64,
    /// ...or when this many seconds have elapsed since the last resample.
    pub resample_interval_cap: f64,

    /// Hysteresis: a consensus condition must hold for this long before it
    /// is acted on.
    pub can_arm_duration: f64,
    pub flight_detect_duration: f64,
    pub recovery_detect_duration: f64,
    pub deploy_detect_duration: f64,

    /// Minimum time between pyro actuations of the same kind.
    pub pyro_rate_limit: f64,

    pub on_ground_velocity_threshold: f64,
    pub on_ground_acceleration_threshold: f64,
    pub freefall_acceleration_threshold: f64,
    pub main_deploy_altitude: f64,
    pub main_deploy_velocity_threshold: f64,

    /// Measurement noise standard deviations used by the sensor
    /// likelihoods, in each sensor's native units (ADC counts for the
    /// quantized sensors, meters/m/s for GPS).
    pub accelerometer_noise_counts: f64,
    pub gyroscope_noise_counts: f64,
    pub magnetometer_noise_counts: f64,
    pub pressure_noise_counts: f64,
    pub gps_position_noise: f64,
    pub gps_velocity_noise: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            particle_count: 1000,
            process_noise_position: 0.2,
            process_noise_velocity: 0.2,
            process_noise_acceleration: 1.0,
            ess_resample_fraction: 0.05,
            resample_interval_cap: 1.0,
            can_arm_duration: 0.25,
            flight_detect_duration: 1.0,
            recovery_detect_duration: 1.0,
            deploy_detect_duration: 0.25,
            pyro_rate_limit: 1.0,
            on_ground_velocity_threshold: 2.0,
            on_ground_acceleration_threshold: 2.0,
            freefall_acceleration_threshold: 2.0,
            main_deploy_altitude: 500.0,
            main_deploy_velocity_threshold: 10.0,
            accelerometer_noise_counts: 5.0,
            gyroscope_noise_counts: 5.0,
            magnetometer_noise_counts: 5.0,
            pressure_noise_counts: 3.0,
            gps_position_noise: 5.0,
            gps_velocity_noise: 0.5,
        }
    }
}

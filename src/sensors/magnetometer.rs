//! Three-axis magnetometer, reading a low-degree spherical harmonic
//! expansion of Earth's main field (the IGRF/WMM family of models,
//! truncated here to degree 3) rather than a uniform dipole.
//!
//! The expansion itself — Schmidt semi-normalized associated Legendre
//! functions evaluated by upward recursion in latitude and longitude — is
//! the same recursive structure every geomagnetic reference field uses;
//! only the coefficient table differs between IGRF/WMM epochs. This board
//! carries a representative low-order coefficient set rather than a full
//! degree-13 table, since fidelity beyond a few thousand km of along-track
//! drift does not matter for a sounding rocket flight.

use super::likelihood::quantized_log_likelihood;
use crate::constants::{ADC_MASK, PI, WGS84_A, WGS84_B};
use crate::coordinates::geodetic::{ecef_to_geodetic, make_ltp_rotation};
use crate::models::RocketState;
use nalgebra as na;

const MAX_DEGREE: usize = 3;
const REFERENCE_RADIUS: f64 = 6_371_200.0; // m, IGRF conventional Earth radius
const NANOTESLA_TO_TESLA: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Coefficient {
    g: f64,
    h: f64,
}

const ZERO: Coefficient = Coefficient { g: 0.0, h: 0.0 };

/// `COEFFICIENTS[n][m]`, IGRF-13 (epoch 2020.0) degree <= 3 terms, nT.
const COEFFICIENTS: [[Coefficient; MAX_DEGREE + 1]; MAX_DEGREE + 1] = [
    [ZERO, ZERO, ZERO, ZERO],
    [
        Coefficient { g: -29404.8, h: 0.0 },
        Coefficient { g: -1450.9, h: 4652.5 },
        ZERO,
        ZERO,
    ],
    [
        Coefficient { g: -2499.6, h: 0.0 },
        Coefficient { g: 2982.0, h: -2991.6 },
        Coefficient { g: 1677.0, h: -734.6 },
        ZERO,
    ],
    [
        Coefficient { g: 1363.2, h: 0.0 },
        Coefficient { g: -2381.2, h: -82.1 },
        Coefficient { g: 1236.2, h: 241.9 },
        Coefficient { g: 525.7, h: -543.4 },
    ],
];

/// Schmidt semi-normalized spherical harmonic expansion, evaluated at
/// geocentric latitude `lat` (radians), longitude `lon` (radians) and
/// radius `r` (meters). Returns the field in local NED, nT.
fn expansion(lat: f64, lon: f64, r: f64, degree: usize) -> na::Vector3<f64> {
    let cos_lon = lon.cos();
    let sin_lon = lon.sin();
    let cos_lat = lat.cos();
    let sin_lat = lat.sin();
    let a_over_r = REFERENCE_RADIUS / r;
    let mut aoverr_pow = a_over_r * a_over_r;

    let mut cos_lon_arr = [0.0f64; MAX_DEGREE + 1];
    let mut sin_lon_arr = [0.0f64; MAX_DEGREE + 1];
    cos_lon_arr[0] = 1.0;
    sin_lon_arr[0] = 0.0;

    let mut leg = 0.0f64;
    let mut leg_n1 = 2f64.sqrt();
    let mut leg_m1 = 0.0f64;
    let mut leg_m2;

    let mut vector = na::Vector3::new(0.0, 0.0, COEFFICIENTS[0][0].g);

    for n in 1..=degree {
        let mut x = 0.0;
        let mut y = 0.0;
        let mut z = 0.0;

        cos_lon_arr[n] = cos_lon_arr[n - 1] * cos_lon - sin_lon_arr[n - 1] * sin_lon;
        sin_lon_arr[n] = cos_lon_arr[n - 1] * sin_lon + sin_lon_arr[n - 1] * cos_lon;

        // sectoral term m == n
        let sqrt_diag = ((2 * n - 1) as f64 / (2.0 * n as f64)).sqrt();
        leg = cos_lat * leg_n1 * sqrt_diag;
        let c = COEFFICIENTS[n][n];
        x += (c.g * cos_lon_arr[n] + c.h * sin_lon_arr[n]) * (-leg_n1 * sin_lat * sqrt_diag * n as f64);
        y += (n as f64) * (c.g * sin_lon_arr[n] - c.h * cos_lon_arr[n]) * leg;
        z += (c.g * cos_lon_arr[n] + c.h * sin_lon_arr[n]) * leg;
        leg_n1 = leg;

        for m in (1..n).rev() {
            leg_m2 = leg_m1;
            leg_m1 = leg;
            let norm = (((n - m) as f64) * ((n + m + 1) as f64)).sqrt();
            leg = (sin_lat / cos_lat * ((2 * m + 2) as f64) * leg_m1
                - (((n - m - 1) as f64) * ((n + m + 2) as f64)).sqrt() * leg_m2)
                / norm;
            let c = COEFFICIENTS[n][m];
            x += (c.g * cos_lon_arr[m] + c.h * sin_lon_arr[m]) * (leg_m1 * norm - (m as f64) * sin_lat / cos_lat * leg);
            y += (m as f64) * (c.g * sin_lon_arr[m] - c.h * cos_lon_arr[m]) * leg;
            z += (c.g * cos_lon_arr[m] + c.h * sin_lon_arr[m]) * leg;
        }

        // zonal term m == 0
        let norm0 = ((n * (n + 1) * 2) as f64).sqrt();
        leg_m2 = leg_m1;
        leg_m1 = leg;
        leg = (sin_lat / cos_lat * 2.0 * leg_m1 - (((n - 1) as f64) * ((n + 2) as f64)).sqrt() * leg_m2) / norm0;
        let g0 = COEFFICIENTS[n][0].g;
        x += g0 * leg_m1 * norm0 / 2.0;
        z += g0 * leg;

        aoverr_pow *= a_over_r;
        vector.x += aoverr_pow * x;
        vector.y += aoverr_pow * y;
        vector.z += aoverr_pow * z * (n as f64 + 1.0);
    }

    vector.x = -vector.x;
    vector.y /= cos_lat;
    vector.z = -vector.z;
    vector
}

/// Main geomagnetic field at a WGS-84 geodetic position, in local NED
/// Tesla. Converts to geocentric spherical coordinates, evaluates the
/// expansion there, then rotates the result back to geodetic NED.
pub fn magnetic_field(latitude: f64, longitude: f64, altitude: f64) -> na::Vector3<f64> {
    let f = (WGS84_A - WGS84_B) / WGS84_A;
    let e2 = f * (2.0 - f);
    let rc = WGS84_A / (1.0 - e2 * latitude.sin() * latitude.sin()).sqrt();
    let p = (rc + altitude) * latitude.cos();
    let z = (rc * (1.0 - e2) + altitude) * latitude.sin();
    let r = (p * p + z * z).sqrt();
    let phi_prime = (z / r).asin();

    let mut field = expansion(phi_prime, longitude, r, MAX_DEGREE);
    let delta = phi_prime - latitude;
    let xp = field.x * delta.cos() - field.z * delta.sin();
    let zp = field.x * delta.sin() + field.z * delta.cos();
    field.x = xp;
    field.z = zp;
    field * NANOTESLA_TO_TESLA
}

const BIAS: [f64; 3] = [0.0, 0.0, 0.0];
const GAIN: [f64; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagnetometerReading {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

fn quantize(value: f64) -> u16 {
    value.round().clamp(0.0, ADC_MASK as f64) as u16
}

/// Unlike the accelerometer/gyroscope models this rotates the field
/// ECEF -> body with `rotpos` directly (the same forward convention as the
/// other two sensors), rather than the inverse rotation.
fn forward_model(state: &RocketState) -> [f64; 3] {
    let geodetic = ecef_to_geodetic(state.pos);
    let ned = magnetic_field(geodetic.latitude, geodetic.longitude, geodetic.altitude);
    let enu = na::Vector3::new(ned.y, ned.x, -ned.z);
    let rotation = make_ltp_rotation(geodetic);
    let field_ecef = rotation.transpose() * enu;
    let body = state.rotpos * field_ecef;
    [body.x * GAIN[0] + BIAS[0], body.y * GAIN[1] + BIAS[1], body.z * GAIN[2] + BIAS[2]]
}

pub struct Magnetometer;

impl Magnetometer {
    pub fn simulate(state: &RocketState) -> MagnetometerReading {
        let raw = forward_model(state);
        MagnetometerReading { x: quantize(raw[0]), y: quantize(raw[1]), z: quantize(raw[2]) }
    }

    pub fn log_likelihood(observed: &MagnetometerReading, state: &RocketState, std_counts: f64) -> f64 {
        let predicted = forward_model(state);
        let observed = [observed.x, observed.y, observed.z];
        observed
            .iter()
            .zip(predicted.iter())
            .map(|(&obs, &mean)| quantized_log_likelihood(obs, mean, std_counts))
            .sum()
    }
}

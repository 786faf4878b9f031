//! GPS satellite position and velocity from a broadcast ephemeris, via
//! Keplerian orbital mechanics (IS-GPS-200D, chapter 4 of Spilker's
//! "Global Positioning System: Theory and Application").

use super::Ephemeris;
use crate::constants::{
    GPS_EARTH_ROTATION_RATE, GPS_HALF_WEEK_SECONDS, GPS_MU, GPS_WEEK_SECONDS,
    KEPLER_SOLVER_ITERATIONS,
};
use nalgebra as na;

/// Solve Kepler's equation `E - e*sin(E) = M` for the eccentric anomaly via
/// the fixed-iteration Lyapunov form `X_{i+1} = e*sin(M + X_i)`, where
/// `E = M + X`. Ten iterations bound the error by `e^11 / (1 - e)`, well
/// under a microradian for GPS eccentricities (e <= 0.03).
fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let mut x = 0.0;
    for _ in 0..KEPLER_SOLVER_ITERATIONS {
        x = eccentricity * (mean_anomaly + x).sin();
    }
    x
}

/// Time since ephemeris reference epoch, wrapped onto the nearest GPS week
/// boundary (IS-GPS-200D 20.3.3.4.3.3).
fn time_since_ephemeris(t: f64, t_oe: f64) -> f64 {
    let mut t_k = t - t_oe;
    if t_k > GPS_HALF_WEEK_SECONDS {
        t_k -= GPS_WEEK_SECONDS;
    } else if t_k < -GPS_HALF_WEEK_SECONDS {
        t_k += GPS_WEEK_SECONDS;
    }
    t_k
}

/// Satellite position (ECEF meters) and velocity (ECEF m/s) at GPS system
/// time `t`, measured in seconds since the start of the GPS week.
pub fn satellite_position_velocity(eph: &Ephemeris, t: f64) -> (na::Vector3<f64>, na::Vector3<f64>) {
    let a = eph.sqrt_a * eph.sqrt_a;
    let n_0 = (GPS_MU / (a * a * a)).sqrt();
    let t_k = time_since_ephemeris(t, eph.t_oe);
    let n = n_0 + eph.delta_n;
    let m_k = eph.m_0 + n * t_k;
    let e = eph.e;

    let big_e_minus_m = solve_kepler(m_k, e);
    let big_e = m_k + big_e_minus_m;

    let nu_k = ((1.0 - e * e).sqrt() * big_e.sin()).atan2(big_e.cos() - e);
    let phi_k = nu_k + eph.omega;
    let sin_2phi = (2.0 * phi_k).sin();
    let cos_2phi = (2.0 * phi_k).cos();

    let delta_u = eph.c_us * sin_2phi + eph.c_uc * cos_2phi;
    let delta_r = eph.c_rs * sin_2phi + eph.c_rc * cos_2phi;
    let delta_i = eph.c_is * sin_2phi + eph.c_ic * cos_2phi;

    let u_k = phi_k + delta_u;
    let r_k = a * (1.0 - e * big_e.cos()) + delta_r;
    let i_k = eph.i_0 + delta_i + eph.i_dot * t_k;

    let x_prime = r_k * u_k.cos();
    let y_prime = r_k * u_k.sin();

    let omega_k =
        eph.omega_0 + (eph.omega_dot - GPS_EARTH_ROTATION_RATE) * t_k - GPS_EARTH_ROTATION_RATE * eph.t_oe;

    let position = na::Vector3::new(
        x_prime * omega_k.cos() - y_prime * i_k.cos() * omega_k.sin(),
        x_prime * omega_k.sin() + y_prime * i_k.cos() * omega_k.cos(),
        y_prime * i_k.sin(),
    );

    // Analytic velocity (Remondi's formulation, as used in most GPS
    // receiver reference implementations).
    let e_dot = n / (1.0 - e * big_e.cos());
    let nu_k_dot = e_dot * (1.0 - e * e).sqrt() / (1.0 - e * big_e.cos());
    let u_k_dot = nu_k_dot + 2.0 * (eph.c_us * cos_2phi - eph.c_uc * sin_2phi) * nu_k_dot;
    let r_k_dot = a * e * big_e.sin() * e_dot + 2.0 * (eph.c_rs * cos_2phi - eph.c_rc * sin_2phi) * nu_k_dot;
    let i_k_dot = eph.i_dot + 2.0 * (eph.c_is * cos_2phi - eph.c_ic * sin_2phi) * nu_k_dot;
    let omega_k_dot = eph.omega_dot - GPS_EARTH_ROTATION_RATE;

    let x_prime_dot = r_k_dot * u_k.cos() - r_k * u_k_dot * u_k.sin();
    let y_prime_dot = r_k_dot * u_k.sin() + r_k * u_k_dot * u_k.cos();

    let vx = x_prime_dot * omega_k.cos()
        - y_prime_dot * i_k.cos() * omega_k.sin()
        - (x_prime * omega_k.sin() + y_prime * i_k.cos() * omega_k.cos()) * omega_k_dot
        + y_prime * i_k.sin() * omega_k.sin() * i_k_dot;
    let vy = x_prime_dot * omega_k.sin()
        + y_prime_dot * i_k.cos() * omega_k.cos()
        + (x_prime * omega_k.cos() - y_prime * i_k.cos() * omega_k.sin()) * omega_k_dot
        - y_prime * i_k.sin() * omega_k.cos() * i_k_dot;
    let vz = y_prime_dot * i_k.sin() + y_prime * i_k.cos() * i_k_dot;

    (position, na::Vector3::new(vx, vy, vz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::Ephemeris;

    const SUBFRAME_2: [u32; 10] = [
        0, 0, 0xc40d92, 0x2b475f, 0x772e13, 0x0bee01, 0x63fdf3, 0x0d5ca1, 0x0d6475, 0x00007f,
    ];
    const SUBFRAME_3: [u32; 10] = [
        0, 0, 0xfffb2e, 0xd811cd, 0xffe128, 0x4a5fe4, 0x21d82d, 0x42f0d9, 0xffa8f3, 0xc4198b,
    ];

    /// S2: satellite-13 orbit radius from the PSAS 2005-08-20 flight must
    /// sit on a ~26,560 km semi-major-axis orbit.
    #[test]
    fn s2_satellite_orbit_radius() {
        let eph = Ephemeris::from_subframes(&SUBFRAME_2, &SUBFRAME_3).unwrap();
        let (pos, _vel) = satellite_position_velocity(&eph, 86400.0 * 6.0);
        let radius = pos.magnitude();
        assert!(
            (2.55e7..2.70e7).contains(&radius),
            "radius {radius} outside plausible GPS orbit band"
        );
    }

    #[test]
    fn position_is_periodic_over_one_sidereal_orbit() {
        let eph = Ephemeris::from_subframes(&SUBFRAME_2, &SUBFRAME_3).unwrap();
        let (p0, _) = satellite_position_velocity(&eph, 86400.0 * 6.0);
        let period = 2.0 * std::f64::consts::PI * (eph.sqrt_a.powi(3)) / GPS_MU.sqrt();
        let (p1, _) = satellite_position_velocity(&eph, 86400.0 * 6.0 + period);
        assert!((p0 - p1).magnitude() < 50_000.0, "orbit did not repeat after one period");
    }
}

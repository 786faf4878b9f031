//! WGS-84 geodetic <-> ECEF conversion and local tangent plane rotations.
//!
//! Ported from the plumb-line / MathWorks ECEF-to-LLA formulas this
//! estimator has always used; see
//! <http://psas.pdx.edu/CoordinateSystem/Latitude_to_LocalTangent.pdf>.

use crate::constants::{PI, WGS84_A, WGS84_B};
use nalgebra as na;

const WGS84_FLATNESS: f64 = (WGS84_A - WGS84_B) / WGS84_A;
const WGS84_ESQ: f64 = WGS84_FLATNESS * (2.0 - WGS84_FLATNESS);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,  // radians
    pub longitude: f64, // radians
    pub altitude: f64,  // meters above the WGS-84 ellipsoid
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Geodetic { latitude, longitude, altitude }
    }
}

/// Distance from the ellipsoid surface to the z-axis along the ellipsoid
/// normal (the plumb line) at a given latitude.
fn prime_vertical_radius(latitude: f64) -> f64 {
    let sinlat = latitude.sin();
    WGS84_A / (1.0 - WGS84_ESQ * sinlat * sinlat).sqrt()
}

pub fn geodetic_to_ecef(g: Geodetic) -> na::Vector3<f64> {
    let n_lat = prime_vertical_radius(g.latitude);
    let coslat = g.latitude.cos();
    let sinlat = g.latitude.sin();
    let coslong = g.longitude.cos();
    let sinlong = g.longitude.sin();
    na::Vector3::new(
        (g.altitude + n_lat) * coslat * coslong,
        (g.altitude + n_lat) * coslat * sinlong,
        (g.altitude + (1.0 - WGS84_ESQ) * n_lat) * sinlat,
    )
}

/// ECEF -> local-tangent-plane (east-north-up) rotation at `g`.
pub fn make_ltp_rotation(g: Geodetic) -> na::Matrix3<f64> {
    let sinlong = g.longitude.sin();
    let coslong = g.longitude.cos();
    let sinlat = g.latitude.sin();
    let coslat = g.latitude.cos();
    #[rustfmt::skip]
    let rotation = na::Matrix3::new(
        -sinlong,           coslong,           0.0,
        -coslong * sinlat, -sinlat * sinlong,  coslat,
         coslat * coslong,  coslat * sinlong,  sinlat,
    );
    rotation
}

pub fn ecef_to_ltp(origin: na::Vector3<f64>, rotation: na::Matrix3<f64>, ecef: na::Vector3<f64>) -> na::Vector3<f64> {
    rotation * (ecef - origin)
}

pub fn ltp_to_ecef(origin: na::Vector3<f64>, rotation: na::Matrix3<f64>, ltp: na::Vector3<f64>) -> na::Vector3<f64> {
    rotation.transpose() * ltp + origin
}

/// Not exact; accurate to centimeters for altitudes below 1000 km.
/// <http://www.colorado.edu/geography/gcraft/notes/datum/gif/xyzllh.gif>
pub fn ecef_to_geodetic(ecef: na::Vector3<f64>) -> Geodetic {
    let edotsq = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    if p.abs() < 1e-30 {
        return Geodetic {
            latitude: (PI / 2.0).copysign(ecef.z),
            longitude: 0.0,
            altitude: ecef.z.abs() - WGS84_B,
        };
    }

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let st = theta.sin();
    let ct = theta.cos();

    let latitude = (ecef.z + edotsq * WGS84_B * st * st * st)
        .atan2(p - WGS84_ESQ * WGS84_A * ct * ct * ct);
    let longitude = ecef.y.atan2(ecef.x);
    let sinlat = latitude.sin();
    let n_lat = prime_vertical_radius(latitude);
    // Altitude per the MathWorks Aerospace Blockset "ECEF Position to LLA" derivation.
    let altitude = p * latitude.cos() + (ecef.z + WGS84_ESQ * n_lat * sinlat) * sinlat - n_lat;

    Geodetic { latitude, longitude, altitude }
}

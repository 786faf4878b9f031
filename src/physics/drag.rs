use crate::atmosphere::Atmosphere;
use crate::coordinates::ecef_to_geodetic;
use nalgebra as na;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfiguration {
    pub drag_coefficient: f64,
    pub cross_section: f64, // m^2
}

impl DragConfiguration {
    pub const ROCKET: DragConfiguration = DragConfiguration {
        drag_coefficient: crate::constants::ROCKET_DRAG,
        cross_section: crate::constants::ROCKET_CROSS_SECTION,
    };
    pub const DROGUE_CHUTE: DragConfiguration = DragConfiguration {
        drag_coefficient: crate::constants::DROGUE_CHUTE_DRAG,
        cross_section: crate::constants::DROGUE_CHUTE_CROSS_SECTION,
    };
    pub const MAIN_CHUTE: DragConfiguration = DragConfiguration {
        drag_coefficient: crate::constants::MAIN_CHUTE_DRAG,
        cross_section: crate::constants::MAIN_CHUTE_CROSS_SECTION,
    };
}

/// Drag opposes velocity; TODO: account for rocket orientation rather than
/// treating it as a bluff body.
pub fn drag_force(
    pos: &na::Vector3<f64>,
    vel: &na::Vector3<f64>,
    atmosphere: &Atmosphere,
    configuration: DragConfiguration,
) -> na::Vector3<f64> {
    let speed = vel.magnitude();
    if speed < 1e-9 {
        return na::Vector3::zeros();
    }
    let altitude = ecef_to_geodetic(*pos).altitude;
    let density = atmosphere.altitude_to_air_density(altitude);
    let magnitude = -0.5 * density * speed * configuration.cross_section * configuration.drag_coefficient;
    vel * magnitude
}

//! Physical and geometric constants shared across the estimator.

pub const PI: f64 = std::f64::consts::PI;

// WGS-84 ellipsoid (NIMA TR8350.2).
pub const WGS84_A: f64 = 6378137.0; // semi-major axis [m]
pub const WGS84_B: f64 = 6356752.3142; // semi-minor axis [m]

// Rigid-body / propulsion constants, matched against the airframe this
// estimator was tuned against.
pub const EARTH_GRAVITY: f64 = 9.8; // m/s^2, radial toward Earth center
pub const ENGINE_THRUST: f64 = 3094.65; // N
pub const ROCKET_EMPTY_MASS: f64 = 21.54; // kg
pub const FUEL_MASS: f64 = 5.9; // kg
pub const ENGINE_BURN_TIME: f64 = 4.3; // s
pub const BURN_RATE: f64 = FUEL_MASS / ENGINE_BURN_TIME; // kg/s
pub const THRUST_RAMP_TIME: f64 = 0.2; // s, ramp up/down at ignition/burnout

pub const ROCKET_DRAG: f64 = 0.36559;
pub const ROCKET_CROSS_SECTION: f64 = 0.015327901242699; // m^2
pub const DROGUE_CHUTE_DRAG: f64 = 0.8;
pub const DROGUE_CHUTE_CROSS_SECTION: f64 = 0.836954282802814; // m^2
pub const MAIN_CHUTE_DRAG: f64 = 0.8;
pub const MAIN_CHUTE_CROSS_SECTION: f64 = 7.429812032713523; // m^2

// ISA atmosphere.
pub const SEA_LEVEL_PRESSURE: f64 = 101325.0; // Pa
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
pub const GAS_CONSTANT_AIR: f64 = 8.314472 / 0.028964; // J/(kg*K), R/M
pub const MINIMUM_PRESSURE: f64 = 0.3734; // Pa
pub const MAXIMUM_ALTITUDE: f64 = 84852.0; // m
pub const ISA_LAYER_BASE_ALTITUDES: [f64; 7] =
    [0.0, 11000.0, 20000.0, 32000.0, 47000.0, 51000.0, 71000.0];
pub const ISA_LAYER_LAPSE_RATES: [f64; 7] =
    [-0.0065, 0.0, 0.001, 0.0028, 0.0, -0.0028, -0.002];

// GPS / WGS-84 geodesy constants from IS-GPS-200D.
pub const GPS_PI: f64 = 3.1415926535898;
pub const GPS_MU: f64 = 3.986005e14; // m^3/s^2, WGS-84 Earth gravitational constant
pub const GPS_EARTH_ROTATION_RATE: f64 = 7.2921151467e-5; // rad/s
pub const GPS_WEEK_SECONDS: f64 = 604800.0;
pub const GPS_HALF_WEEK_SECONDS: f64 = 302400.0;
pub const KEPLER_SOLVER_ITERATIONS: usize = 10;

// Sensor ADC quantization.
pub const ADC_BITS: u32 = 12;
pub const ADC_MASK: u16 = (1u16 << ADC_BITS) - 1;

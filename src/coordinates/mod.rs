pub mod geodetic;

pub use geodetic::{ecef_to_geodetic, ecef_to_ltp, geodetic_to_ecef, ltp_to_ecef, make_ltp_rotation, Geodetic};

//! Vector and rotation primitives.
//!
//! `vec3` and `mat3` from the design notes map directly onto
//! `nalgebra::Vector3<f64>` and `nalgebra::Matrix3<f64>`; there is no
//! separate newtype wrapping them, matching how the rest of this codebase
//! treats `nalgebra` types as the vocabulary for 3-space quantities.

pub mod rotation;

pub use rotation::axis_angle_to_mat3;

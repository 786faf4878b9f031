use nalgebra as na;

/// Rodrigues' rotation formula: a rotation vector (axis times angle, in
/// radians) to a proper 3x3 rotation matrix. The zero vector maps to the
/// identity rotation.
pub fn axis_angle_to_mat3(axis_angle: na::Vector3<f64>) -> na::Matrix3<f64> {
    let angle = axis_angle.magnitude();
    if angle < 1e-15 {
        return na::Matrix3::identity();
    }
    na::Rotation3::from_scaled_axis(axis_angle).into_inner()
}

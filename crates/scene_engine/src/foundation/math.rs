//! Math utilities and types
//!
//! Provides the fundamental math types shared by the scene graph and the
//! animation subsystem, plus the transform-composition helpers both rely on.
//!
//! Conventions: right-handed, Y-up, column-major matrices. Authored
//! rotations are Euler angles in degrees; everything internal works in
//! quaternions and radians.

pub use nalgebra::{Matrix4, UnitQuaternion, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Compose a transformation matrix from translation, rotation, and scale.
///
/// Multiplication order is `T * R * S`: scale applies first, then rotation,
/// then translation.
pub fn compose_trs(position: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position) * rotation.to_homogeneous() * Mat4::new_nonuniform_scaling(scale)
}

/// Build a rotation quaternion from Euler angles given in degrees.
///
/// Angles are (roll, pitch, yaw) about the X, Y, and Z axes respectively,
/// matching `nalgebra`'s intrinsic XYZ convention.
pub fn quat_from_euler_deg(angles: &Vec3) -> Quat {
    Quat::from_euler_angles(
        angles.x.to_radians(),
        angles.y.to_radians(),
        angles.z.to_radians(),
    )
}

/// Extract Euler angles in degrees from a rotation quaternion.
///
/// Inverse of [`quat_from_euler_deg`] up to angle wrapping and the usual
/// gimbal ambiguity near +/-90 degrees of pitch.
pub fn euler_deg_from_quat(rotation: &Quat) -> Vec3 {
    let (roll, pitch, yaw) = rotation.euler_angles();
    Vec3::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}

/// Export a matrix as column-major `[[f32; 4]; 4]` for GPU upload.
pub fn mat4_to_columns(matrix: &Mat4) -> [[f32; 4]; 4] {
    let mut columns = [[0.0; 4]; 4];
    for (c, column) in columns.iter_mut().enumerate() {
        for (r, value) in column.iter_mut().enumerate() {
            *value = matrix[(r, c)];
        }
    }
    columns
}

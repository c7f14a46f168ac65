//! Math type aliases and helper functions used by the importer.
//!
//! Matrices are nalgebra `Matrix4<f32>` and use column vectors, so a world
//! matrix is built as `parent * local`.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
/// Use [`quat_from_array`] or `Quaternion::new(w, x, y, z)` to construct.
pub type Quat = nalgebra::Quaternion<f32>;

/// Build a 4x4 matrix from scale, rotation (quaternion), and translation.
///
/// Equivalent to `T * R * S`: scale is applied first, translation last.
/// A rotation too close to zero length to normalize counts as identity.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::try_new(rotation, f32::EPSILON)
        .unwrap_or_else(nalgebra::UnitQuaternion::identity);
    let m = r.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Create a quaternion from a `[x, y, z, w]` array.
pub fn quat_from_array(a: [f32; 4]) -> Quat {
    nalgebra::Quaternion::new(a[3], a[0], a[1], a[2])
}

/// Build a matrix from 16 floats in column-major order.
pub fn mat4_from_cols_array(m: &[f32; 16]) -> Mat4 {
    Mat4::from_column_slice(m)
}

/// Flatten a matrix to 16 floats in column-major order.
pub fn mat4_to_cols_array(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

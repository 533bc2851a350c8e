//! Core types: math re-exports, Transform, free camera, scene graph, config tree.

pub use glam::{EulerRot, Mat4, Quat, Vec3, Vec4, vec3};

pub mod camera;
pub mod config;
pub mod error;
pub mod scene;
pub mod transform;

pub use error::{CoreError, CoreResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translated_transform_matrix() {
        let mut t = transform::Transform::identity();
        t.set_translation(vec3(1.0, 2.0, 3.0));
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 1.0).abs() < 1e-6);
    }
}

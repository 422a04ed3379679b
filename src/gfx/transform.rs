//! Model matrix construction
//!
//! Every part of the scene is placed with a non-uniform scale, three Euler
//! rotations in degrees and a translation. They are composed in a fixed order:
//!
//! ```text
//! M = Translate * RotateZ * RotateY * RotateX * Scale
//! ```
//!
//! so a vertex is scaled first, then rotated about X, Y and Z (right-handed),
//! then moved into place. The order is not commutative and must not change.

use cgmath::{Deg, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// Scale, rotation (degrees about X, Y, Z) and translation of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub position: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: [1.0, 1.0, 1.0],
            rotation: [0.0, 0.0, 0.0],
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl Transform {
    pub fn new(scale: [f32; 3], rotation: [f32; 3], position: [f32; 3]) -> Self {
        Self {
            scale,
            rotation,
            position,
        }
    }

    /// Builder pattern: set the rotation in degrees about X, Y and Z
    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = [x, y, z];
        self
    }

    /// Builder pattern: set the translation
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = [x, y, z];
        self
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        build_model_matrix(self.scale.into(), self.rotation, self.position.into())
    }
}

/// Composes `T * Rz * Ry * Rx * S` from the given components.
pub fn build_model_matrix(
    scale: Vector3<f32>,
    rotation_degrees: [f32; 3],
    translation: Vector3<f32>,
) -> Matrix4<f32> {
    let [x_deg, y_deg, z_deg] = rotation_degrees;

    let s = Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
    let rx = Matrix4::from_angle_x(Deg(x_deg));
    let ry = Matrix4::from_angle_y(Deg(y_deg));
    let rz = Matrix4::from_angle_z(Deg(z_deg));
    let t = Matrix4::from_translation(translation);

    t * rz * ry * rx * s
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Point3, SquareMatrix, Transform as _};

    fn assert_close(actual: Point3<f32>, expected: Point3<f32>) {
        let delta = actual - expected;
        assert!(
            delta.magnitude() < 1e-5,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_identity_transform() {
        let m = Transform::default().model_matrix();
        assert_eq!(m, Matrix4::identity());
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let m = build_model_matrix(
            Vector3::new(2.0, 1.0, 1.0),
            [0.0, 90.0, 0.0],
            Vector3::new(1.0, 0.0, 0.0),
        );
        let p = m.transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_close(p, Point3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_composition_order_is_significant() {
        let scale = Vector3::new(2.0, 1.0, 1.0);
        let translation = Vector3::new(1.0, 0.0, 0.0);
        let expected = build_model_matrix(scale, [0.0, 90.0, 0.0], translation);

        let reversed = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0)
            * Matrix4::from_angle_y(Deg(90.0))
            * Matrix4::from_translation(translation);

        let p = Point3::new(1.0, 0.0, 0.0);
        let a = expected.transform_point(p);
        let b = reversed.transform_point(p);
        assert!((a - b).magnitude() > 1e-3);
    }

    #[test]
    fn test_x_rotation_applies_before_z() {
        // Rx(90) takes +Y to +Z, Rz(90) leaves +Z alone
        let m = Transform::default().with_rotation(90.0, 0.0, 90.0).model_matrix();
        let p = m.transform_point(Point3::new(0.0, 1.0, 0.0));
        assert_close(p, Point3::new(0.0, 0.0, 1.0));

        // Rx(90) leaves +X alone, Rz(90) takes it to +Y
        let p = m.transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_close(p, Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let t: Transform = serde_json::from_str(r#"{ "scale": [1.0, 2.0, 3.0] }"#).unwrap();
        assert_eq!(t.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(t.position, [0.0, 0.0, 0.0]);
        assert_eq!(t.scale, [1.0, 2.0, 3.0]);
    }
}

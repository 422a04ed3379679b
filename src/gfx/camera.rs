//! Fixed look-at camera
//!
//! The scene is rendered from a single viewpoint taken from the
//! [`CameraConfig`]. Matrices are built with cgmath's OpenGL conventions and
//! the projection is remapped to wgpu's 0..1 depth range.

use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};

use crate::config::CameraConfig;
use crate::gfx::bridge::{names, UniformSink};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            eye: Point3::from(config.eye),
            target: Point3::from(config.target),
            up: Vector3::from(config.up),
            aspect,
            fovy: Deg(config.fovy),
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Writes `view`, `projection` and `viewPosition`
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        sink.set_mat4(names::VIEW, &self.view_matrix());
        sink.set_mat4(names::PROJECTION, &self.projection_matrix());
        sink.set_vec3(names::VIEW_POSITION, self.eye.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Transform;

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::from_config(&CameraConfig::default(), 16.0 / 9.0);
        let clip = camera
            .build_view_projection_matrix()
            .transform_point(camera.target);

        assert!(clip.x.abs() < 1e-5);
        assert!(clip.y.abs() < 1e-5);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_near_plane_maps_to_zero_depth() {
        let config = CameraConfig {
            eye: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            ..CameraConfig::default()
        };
        let camera = Camera::from_config(&config, 1.0);
        let near = Point3::new(0.0, 0.0, 5.0 - config.znear);
        let clip = camera.build_view_projection_matrix().transform_point(near);

        assert!(clip.z.abs() < 1e-4);
    }

    #[test]
    fn test_off_axis_point_matches_plain_perspective() {
        let camera = Camera::from_config(&CameraConfig::default(), 16.0 / 9.0);
        let reference = perspective(camera.fovy, camera.aspect, camera.znear, camera.zfar)
            * camera.view_matrix();
        let point = Point3::new(1.0, 1.0, 0.0);

        let expected = reference.transform_point(point);
        let actual = camera.build_view_projection_matrix().transform_point(point);

        assert!((actual.x - expected.x).abs() < 1e-5);
        assert!((actual.y - expected.y).abs() < 1e-5);
        assert!((actual.z - (expected.z * 0.5 + 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_far_plane_maps_to_unit_depth() {
        let config = CameraConfig {
            eye: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            ..CameraConfig::default()
        };
        let camera = Camera::from_config(&config, 1.0);
        let far = Point3::new(0.0, 0.0, 5.0 - config.zfar);
        let clip = camera.build_view_projection_matrix().transform_point(far);

        assert!((clip.z - 1.0).abs() < 1e-4);
    }
}

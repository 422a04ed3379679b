//! Render configuration
//!
//! [`RenderConfig`] gathers everything that is not part of the scene data
//! itself: output size, clear color, camera, tessellation of the curved
//! primitives and what to do when a part references an unknown tag. Every
//! field has a default, so a config file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the scene loop does when a texture or material tag does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Log the miss and keep drawing with degraded state.
    #[default]
    Warn,
    /// Abort the frame with the lookup error.
    FailFast,
}

/// Fixed look-at camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 12.0, 14.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fovy: 45.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

/// Resolution of the generated curved meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    pub sphere_segments: u32,
    pub sphere_rings: u32,
    pub cylinder_segments: u32,
    pub torus_segments: u32,
    pub torus_tube_segments: u32,
    /// Tube radius of the unit torus
    pub torus_thickness: f32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            sphere_segments: 32,
            sphere_rings: 16,
            cylinder_segments: 32,
            torus_segments: 48,
            torus_tube_segments: 16,
            torus_thickness: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: [f64; 4],
    pub camera: CameraConfig,
    pub tessellation: TessellationConfig,
    pub miss_policy: MissPolicy,
    /// Solid color drawn in place of a texture that could not be resolved
    pub fallback_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            camera: CameraConfig::default(),
            tessellation: TessellationConfig::default(),
            miss_policy: MissPolicy::Warn,
            fallback_color: [1.0, 0.0, 1.0, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Builder pattern: set the output size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Builder pattern: set the miss policy
    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config =
            RenderConfig::from_json_str(r#"{ "width": 640, "miss_policy": "fail_fast" }"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert_eq!(config.miss_policy, MissPolicy::FailFast);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_partial_camera_keeps_defaults() {
        let config = RenderConfig::from_json_str(r#"{ "camera": { "fovy": 60.0 } }"#).unwrap();
        assert_eq!(config.camera.fovy, 60.0);
        assert_eq!(config.camera.up, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_with_size_clamps_to_one() {
        let config = RenderConfig::default().with_size(0, 0);
        assert_eq!((config.width, config.height), (1, 1));
        assert_eq!(config.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(RenderConfig::from_json_str(r#"{ "miss_policy": "explode" }"#).is_err());
    }
}

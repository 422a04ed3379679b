//! Scene lighting
//!
//! One optional directional light and up to [`MAX_POINT_LIGHTS`] point lights,
//! all Phong-style (ambient, diffuse and specular colors). Lights are pushed
//! through a [`UniformSink`] once during scene preparation and stay in effect
//! for every following frame.

use serde::{Deserialize, Serialize};

use crate::gfx::bridge::{names, UniformSink};

/// Number of point light slots in the scene shader.
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    #[serde(default = "enabled")]
    pub active: bool,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: [0.0, -0.707, -0.707],
            ambient: [0.4, 0.4, 0.4],
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    #[serde(default = "enabled")]
    pub active: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: [2.0, 3.0, 2.0],
            ambient: [0.1, 0.05, 0.05],
            diffuse: [0.8, 0.4, 0.3],
            specular: [1.0, 1.0, 1.0],
            active: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Complete light rig of a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingSetup {
    #[serde(default = "enabled")]
    pub use_lighting: bool,
    #[serde(default)]
    pub directional: Option<DirectionalLight>,
    #[serde(default)]
    pub point_lights: Vec<PointLight>,
}

impl Default for LightingSetup {
    fn default() -> Self {
        Self {
            use_lighting: true,
            directional: Some(DirectionalLight::default()),
            point_lights: vec![PointLight::default()],
        }
    }
}

impl LightingSetup {
    /// Writes every light uniform
    ///
    /// Unused point light slots are written as inactive so that nothing from a
    /// previous setup lingers. Lights beyond [`MAX_POINT_LIGHTS`] are ignored
    /// with a warning.
    pub fn apply<S: UniformSink + ?Sized>(&self, sink: &mut S) {
        sink.set_bool(names::USE_LIGHTING, self.use_lighting);

        let prefix = names::DIRECTIONAL_LIGHT;
        match &self.directional {
            Some(light) => {
                sink.set_vec3(&format!("{prefix}.direction"), light.direction);
                sink.set_vec3(&format!("{prefix}.ambient"), light.ambient);
                sink.set_vec3(&format!("{prefix}.diffuse"), light.diffuse);
                sink.set_vec3(&format!("{prefix}.specular"), light.specular);
                sink.set_bool(&format!("{prefix}.bActive"), light.active);
            }
            None => sink.set_bool(&format!("{prefix}.bActive"), false),
        }

        if self.point_lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights defined, only the first {} are used",
                self.point_lights.len(),
                MAX_POINT_LIGHTS
            );
        }

        for index in 0..MAX_POINT_LIGHTS {
            let prefix = format!("{}[{}]", names::POINT_LIGHTS, index);
            match self.point_lights.get(index) {
                Some(light) => {
                    sink.set_vec3(&format!("{prefix}.position"), light.position);
                    sink.set_vec3(&format!("{prefix}.ambient"), light.ambient);
                    sink.set_vec3(&format!("{prefix}.diffuse"), light.diffuse);
                    sink.set_vec3(&format!("{prefix}.specular"), light.specular);
                    sink.set_bool(&format!("{prefix}.bActive"), light.active);
                }
                None => sink.set_bool(&format!("{prefix}.bActive"), false),
            }
        }
    }
}

//! GPU uniform layouts and name routing
//!
//! The scene shader reads two uniform blocks: [`SceneUniform`] (camera and
//! lights, one per frame) and [`ObjectUniform`] (one per draw).
//! [`UniformState`] accepts the named writes of the
//! [`UniformSink`](crate::gfx::bridge::UniformSink) interface and routes each
//! name to its field in those blocks. The structs MUST match the WGSL
//! declarations in `shaders/scene.wgsl` exactly.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::gfx::bridge::{names, UniformSink, UniformValue};
use crate::gfx::lighting::MAX_POINT_LIGHTS;

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Per-draw state
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale
    pub normal_matrix: [[f32; 4]; 4],
    pub object_color: [f32; 4],
    pub diffuse_color: [f32; 3],
    pub shininess: f32,
    pub specular_color: [f32; 3],
    pub use_texture: u32,
    pub uv_scale: [f32; 2],
    pub texture_slot: u32,
    pub _padding: u32,
}
// Total: 64 + 64 + 16 + 16 + 16 + 16 = 192 bytes

impl Default for ObjectUniform {
    fn default() -> Self {
        Self {
            model: IDENTITY,
            normal_matrix: IDENTITY,
            object_color: [1.0, 1.0, 1.0, 1.0],
            diffuse_color: [1.0, 1.0, 1.0],
            shininess: 1.0,
            specular_color: [0.0, 0.0, 0.0],
            use_texture: 0,
            uv_scale: [1.0, 1.0],
            texture_slot: 0,
            _padding: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightUniform {
    pub direction: [f32; 3],
    pub enabled: u32,
    pub ambient: [f32; 3],
    pub _padding0: f32,
    pub diffuse: [f32; 3],
    pub _padding1: f32,
    pub specular: [f32; 3],
    pub _padding2: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub enabled: u32,
    pub ambient: [f32; 3],
    pub _padding0: f32,
    pub diffuse: [f32; 3],
    pub _padding1: f32,
    pub specular: [f32; 3],
    pub _padding2: f32,
}

/// Per-frame state: camera and lights
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub directional: DirectionalLightUniform,
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    pub use_lighting: u32,
    pub _padding: [u32; 3],
}
// Total: 64 + 16 + 64 + 4 * 64 + 16 = 416 bytes

impl Default for SceneUniform {
    fn default() -> Self {
        Self {
            view_proj: IDENTITY,
            view_position: [0.0, 0.0, 0.0, 1.0],
            directional: DirectionalLightUniform::default(),
            point_lights: [PointLightUniform::default(); MAX_POINT_LIGHTS],
            use_lighting: 0,
            _padding: [0; 3],
        }
    }
}

enum LightTarget {
    Directional,
    Point(usize),
}

/// Splits `directionalLight.diffuse` or `pointLights[2].position` into the
/// light it addresses and the field name
fn split_light_name(name: &str) -> Option<(LightTarget, &str)> {
    let (head, field) = name.split_once('.')?;
    if head == names::DIRECTIONAL_LIGHT {
        return Some((LightTarget::Directional, field));
    }

    let index = head
        .strip_prefix(names::POINT_LIGHTS)?
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse::<usize>()
        .ok()?;
    Some((LightTarget::Point(index), field))
}

fn as_flag(value: UniformValue) -> Option<u32> {
    match value {
        UniformValue::Bool(b) => Some(b as u32),
        UniformValue::Int(i) => Some((i != 0) as u32),
        _ => None,
    }
}

fn normal_matrix(model: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let model = Matrix4::from(model);
    model
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(model)
        .into()
}

/// CPU mirror of the shader's uniform state
#[derive(Debug, Clone)]
pub struct UniformState {
    pub object: ObjectUniform,
    pub scene: SceneUniform,
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl Default for UniformState {
    fn default() -> Self {
        Self {
            object: ObjectUniform::default(),
            scene: SceneUniform::default(),
            view: IDENTITY,
            projection: IDENTITY,
        }
    }
}

impl UniformState {
    /// Scene block with `view_proj` rebuilt from the last view and
    /// projection writes
    pub fn scene_uniform(&self) -> SceneUniform {
        let view_proj = Matrix4::from(self.projection) * Matrix4::from(self.view);
        SceneUniform {
            view_proj: view_proj.into(),
            ..self.scene
        }
    }

    fn set_light_uniform(&mut self, target: LightTarget, field: &str, value: UniformValue) -> bool {
        match target {
            LightTarget::Directional => {
                let light = &mut self.scene.directional;
                match (field, value) {
                    ("direction", UniformValue::Vec3(v)) => light.direction = v,
                    ("ambient", UniformValue::Vec3(v)) => light.ambient = v,
                    ("diffuse", UniformValue::Vec3(v)) => light.diffuse = v,
                    ("specular", UniformValue::Vec3(v)) => light.specular = v,
                    ("bActive", value) => match as_flag(value) {
                        Some(flag) => light.enabled = flag,
                        None => return false,
                    },
                    _ => return false,
                }
            }
            LightTarget::Point(index) => {
                let Some(light) = self.scene.point_lights.get_mut(index) else {
                    return false;
                };
                match (field, value) {
                    ("position", UniformValue::Vec3(v)) => light.position = v,
                    ("ambient", UniformValue::Vec3(v)) => light.ambient = v,
                    ("diffuse", UniformValue::Vec3(v)) => light.diffuse = v,
                    ("specular", UniformValue::Vec3(v)) => light.specular = v,
                    ("bActive", value) => match as_flag(value) {
                        Some(flag) => light.enabled = flag,
                        None => return false,
                    },
                    _ => return false,
                }
            }
        }
        true
    }
}

impl UniformSink for UniformState {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let object = &mut self.object;
        let handled = match (name, value) {
            (names::MODEL, UniformValue::Mat4(m)) => {
                object.model = m;
                object.normal_matrix = normal_matrix(m);
                true
            }
            (names::OBJECT_COLOR, UniformValue::Vec4(c)) => {
                object.object_color = c;
                true
            }
            (names::OBJECT_TEXTURE, UniformValue::Sampler2D(unit)) => {
                object.texture_slot = unit;
                true
            }
            (names::OBJECT_TEXTURE, UniformValue::Int(unit)) if unit >= 0 => {
                object.texture_slot = unit as u32;
                true
            }
            (names::USE_TEXTURE, value) => match as_flag(value) {
                Some(flag) => {
                    object.use_texture = flag;
                    true
                }
                None => false,
            },
            (names::UV_SCALE, UniformValue::Vec2(uv)) => {
                object.uv_scale = uv;
                true
            }
            (names::MATERIAL_DIFFUSE, UniformValue::Vec3(c)) => {
                object.diffuse_color = c;
                true
            }
            (names::MATERIAL_SPECULAR, UniformValue::Vec3(c)) => {
                object.specular_color = c;
                true
            }
            (names::MATERIAL_SHININESS, UniformValue::Float(s)) => {
                object.shininess = s;
                true
            }
            (names::USE_LIGHTING, value) => match as_flag(value) {
                Some(flag) => {
                    self.scene.use_lighting = flag;
                    true
                }
                None => false,
            },
            (names::VIEW, UniformValue::Mat4(m)) => {
                self.view = m;
                true
            }
            (names::PROJECTION, UniformValue::Mat4(m)) => {
                self.projection = m;
                true
            }
            (names::VIEW_POSITION, UniformValue::Vec3([x, y, z])) => {
                self.scene.view_position = [x, y, z, 1.0];
                true
            }
            (name, value) => match split_light_name(name) {
                Some((target, field)) => self.set_light_uniform(target, field, value),
                None => false,
            },
        };

        if !handled {
            log::trace!("Ignoring uniform '{}' = {:?}", name, value);
        }
    }
}

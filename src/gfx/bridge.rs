//! Shader uniform bridge
//!
//! Translates high-level requests ("use this material", "use this texture")
//! into named uniform writes. The shader program itself sits behind the
//! [`UniformSink`] trait, so the same bridge drives the wgpu
//! [`RenderEngine`](crate::gfx::rendering::RenderEngine) and the recording
//! fakes used in tests.

use cgmath::Matrix4;

use crate::error::{Result, SceneError};
use crate::gfx::resources::{MaterialTable, TextureRegistry, TextureSlot};

/// Uniform names understood by the scene shader.
pub mod names {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const VIEW_POSITION: &str = "viewPosition";

    pub const OBJECT_COLOR: &str = "objectColor";
    pub const OBJECT_TEXTURE: &str = "objectTexture";
    pub const USE_TEXTURE: &str = "bUseTexture";
    pub const USE_LIGHTING: &str = "bUseLighting";
    pub const UV_SCALE: &str = "UVscale";

    pub const MATERIAL_DIFFUSE: &str = "material.diffuseColor";
    pub const MATERIAL_SPECULAR: &str = "material.specularColor";
    pub const MATERIAL_SHININESS: &str = "material.shininess";

    pub const DIRECTIONAL_LIGHT: &str = "directionalLight";
    pub const POINT_LIGHTS: &str = "pointLights";
}

/// A value written to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
    /// Texture unit index for a 2D sampler
    Sampler2D(u32),
}

/// Anything that accepts named uniform writes.
///
/// Only [`set_uniform`](UniformSink::set_uniform) is required; the typed
/// setters forward to it. Writing to a name the program does not know is a
/// silent no-op, as with GL uniform locations of -1.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: [f32; 2]) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: [f32; 4]) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.set_uniform(name, UniformValue::Mat4((*value).into()));
    }

    fn set_sampler2d(&mut self, name: &str, unit: u32) {
        self.set_uniform(name, UniformValue::Sampler2D(unit));
    }
}

impl<T: UniformSink + ?Sized> UniformSink for &mut T {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        (**self).set_uniform(name, value);
    }
}

/// Per-draw uniform writer backed by the texture and material registries.
pub struct ShaderBridge<'a, S: ?Sized, H> {
    sink: &'a mut S,
    textures: &'a TextureRegistry<H>,
    materials: &'a MaterialTable,
}

impl<'a, S: UniformSink + ?Sized, H> ShaderBridge<'a, S, H> {
    pub fn new(
        sink: &'a mut S,
        textures: &'a TextureRegistry<H>,
        materials: &'a MaterialTable,
    ) -> Self {
        Self {
            sink,
            textures,
            materials,
        }
    }

    /// Uploads the model matrix for the next draw.
    pub fn set_model(&mut self, model: &Matrix4<f32>) {
        self.sink.set_mat4(names::MODEL, model);
    }

    /// Switches the shader to flat color mode.
    pub fn set_solid_color(&mut self, rgba: [f32; 4]) {
        self.sink.set_bool(names::USE_TEXTURE, false);
        self.sink.set_vec4(names::OBJECT_COLOR, rgba);
    }

    /// Switches the shader to texture mode and points the sampler at the unit
    /// holding `tag`.
    ///
    /// On a miss nothing is written, so the previous draw's texture state is
    /// left untouched and the caller decides how to degrade.
    pub fn set_texture(&mut self, tag: &str) -> Result<TextureSlot> {
        let slot = self
            .textures
            .slot(tag)
            .ok_or_else(|| SceneError::texture_miss(tag))?;

        self.sink.set_bool(names::USE_TEXTURE, true);
        self.sink.set_sampler2d(names::OBJECT_TEXTURE, slot.unit());
        Ok(slot)
    }

    pub fn set_uv_scale(&mut self, u: f32, v: f32) {
        self.sink.set_vec2(names::UV_SCALE, [u, v]);
    }

    /// Writes the three material uniforms for `tag`.
    pub fn set_material(&mut self, tag: &str) -> Result<()> {
        let material = self
            .materials
            .lookup(tag)
            .ok_or_else(|| SceneError::material_miss(tag))?;

        self.sink
            .set_vec3(names::MATERIAL_DIFFUSE, material.diffuse_color);
        self.sink
            .set_vec3(names::MATERIAL_SPECULAR, material.specular_color);
        self.sink
            .set_float(names::MATERIAL_SHININESS, material.shininess);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::Material;

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(String, UniformValue)>,
    }

    impl UniformSink for RecordingSink {
        fn set_uniform(&mut self, name: &str, value: UniformValue) {
            self.writes.push((name.to_string(), value));
        }
    }

    fn materials() -> MaterialTable {
        let mut table = MaterialTable::new();
        table
            .define(Material::new("gold", [0.8, 0.6, 0.2], [1.0, 1.0, 1.0], 22.0))
            .unwrap();
        table
    }

    #[test]
    fn test_set_material_writes_three_uniforms() {
        let textures = TextureRegistry::<u32>::new();
        let materials = materials();
        let mut sink = RecordingSink::default();

        ShaderBridge::new(&mut sink, &textures, &materials)
            .set_material("gold")
            .unwrap();

        assert_eq!(
            sink.writes,
            vec![
                (
                    names::MATERIAL_DIFFUSE.to_string(),
                    UniformValue::Vec3([0.8, 0.6, 0.2])
                ),
                (
                    names::MATERIAL_SPECULAR.to_string(),
                    UniformValue::Vec3([1.0, 1.0, 1.0])
                ),
                (
                    names::MATERIAL_SHININESS.to_string(),
                    UniformValue::Float(22.0)
                ),
            ]
        );
    }

    #[test]
    fn test_material_miss_writes_nothing() {
        let textures = TextureRegistry::<u32>::new();
        let materials = materials();
        let mut sink = RecordingSink::default();

        let err = ShaderBridge::new(&mut sink, &textures, &materials)
            .set_material("lead")
            .unwrap_err();

        assert!(err.is_lookup_miss());
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_material_miss_on_empty_table() {
        let textures = TextureRegistry::<u32>::new();
        let materials = MaterialTable::new();
        let mut sink = RecordingSink::default();

        let err = ShaderBridge::new(&mut sink, &textures, &materials)
            .set_material("gold")
            .unwrap_err();

        assert!(matches!(
            err,
            SceneError::LookupMiss {
                kind: crate::error::AssetKind::Material,
                ref tag,
            } if tag == "gold"
        ));
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_texture_miss_writes_nothing() {
        let textures = TextureRegistry::<u32>::new();
        let materials = MaterialTable::new();
        let mut sink = RecordingSink::default();

        let err = ShaderBridge::new(&mut sink, &textures, &materials)
            .set_texture("pcba")
            .unwrap_err();

        assert!(matches!(
            err,
            SceneError::LookupMiss {
                kind: crate::error::AssetKind::Texture,
                ..
            }
        ));
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_solid_color_disables_texturing() {
        let textures = TextureRegistry::<u32>::new();
        let materials = MaterialTable::new();
        let mut sink = RecordingSink::default();

        let mut bridge = ShaderBridge::new(&mut sink, &textures, &materials);
        bridge.set_solid_color([0.2, 0.4, 0.6, 1.0]);
        bridge.set_uv_scale(5.0, 1.0);

        assert_eq!(
            sink.writes,
            vec![
                (names::USE_TEXTURE.to_string(), UniformValue::Bool(false)),
                (
                    names::OBJECT_COLOR.to_string(),
                    UniformValue::Vec4([0.2, 0.4, 0.6, 1.0])
                ),
                (names::UV_SCALE.to_string(), UniformValue::Vec2([5.0, 1.0])),
            ]
        );
    }

    #[test]
    fn test_set_model_uploads_matrix() {
        let textures = TextureRegistry::<u32>::new();
        let materials = MaterialTable::new();
        let mut sink = RecordingSink::default();

        let model = Matrix4::from_translation(cgmath::Vector3::new(1.0, 2.0, 3.0));
        ShaderBridge::new(&mut sink, &textures, &materials).set_model(&model);

        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.writes[0].0, names::MODEL);
        assert_eq!(sink.writes[0].1, UniformValue::Mat4(model.into()));
    }
}

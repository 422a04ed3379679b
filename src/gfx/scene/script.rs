//! Scene manifest
//!
//! The board is described entirely by data: which textures to load, which
//! materials and lights to define, and an ordered list of parts. Each part is
//! one primitive drawn with one transform, an optional material and either a
//! texture (with UV scale) or a solid color. Draw order is list order.
//!
//! The bundled board lives in `assets/scene/pcb.json` and is compiled into
//! the crate, see [`SceneManifest::builtin`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AssetKind, Result};
use crate::gfx::geometry::PrimitiveKind;
use crate::gfx::lighting::LightingSetup;
use crate::gfx::resources::Material;
use crate::gfx::transform::Transform;

const BUILTIN_MANIFEST: &str = include_str!("../../../assets/scene/pcb.json");

/// Image file to register under a tag, relative to the asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureSource {
    pub tag: String,
    pub path: String,
}

fn unit_uv() -> [f32; 2] {
    [1.0, 1.0]
}

/// How a part is colored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Surface {
    Texture {
        tag: String,
        #[serde(default = "unit_uv")]
        uv_scale: [f32; 2],
    },
    Color {
        rgba: [f32; 4],
    },
}

/// One draw of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePart {
    pub name: String,
    pub primitive: PrimitiveKind,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub material: Option<String>,
    pub surface: Surface,
}

/// A tag a part uses that the manifest never defines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedTag {
    pub part: String,
    pub kind: AssetKind,
    pub tag: String,
}

impl std::fmt::Display for UndefinedTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "part '{}' uses undefined {} '{}'", self.part, self.kind, self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    #[serde(default)]
    pub textures: Vec<TextureSource>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub lighting: LightingSetup,
    pub parts: Vec<ScenePart>,
}

impl SceneManifest {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// The printed-circuit-board replica shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_MANIFEST)
    }

    /// Lists every texture or material tag a part references but the
    /// manifest does not define
    pub fn validate(&self) -> Vec<UndefinedTag> {
        let mut issues = Vec::new();

        for part in &self.parts {
            if let Some(tag) = &part.material {
                if !self.materials.iter().any(|m| &m.tag == tag) {
                    issues.push(UndefinedTag {
                        part: part.name.clone(),
                        kind: AssetKind::Material,
                        tag: tag.clone(),
                    });
                }
            }

            if let Surface::Texture { tag, .. } = &part.surface {
                if !self.textures.iter().any(|t| &t.tag == tag) {
                    issues.push(UndefinedTag {
                        part: part.name.clone(),
                        kind: AssetKind::Texture,
                        tag: tag.clone(),
                    });
                }
            }
        }

        issues
    }

    /// Primitive kinds the parts use, in order of first appearance
    pub fn primitive_kinds(&self) -> Vec<PrimitiveKind> {
        let mut kinds = Vec::new();
        for part in &self.parts {
            if !kinds.contains(&part.primitive) {
                kinds.push(part.primitive);
            }
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_manifest_is_complete() {
        let manifest = SceneManifest::builtin().unwrap();

        assert_eq!(manifest.parts.len(), 67);
        assert_eq!(manifest.textures.len(), 11);
        assert_eq!(manifest.materials.len(), 6);
        assert!(manifest.validate().is_empty(), "{:?}", manifest.validate());
        assert!(manifest.lighting.use_lighting);
        assert_eq!(manifest.lighting.point_lights.len(), 1);
    }

    #[test]
    fn test_builtin_primitive_mix() {
        let manifest = SceneManifest::builtin().unwrap();
        let count = |kind: PrimitiveKind| manifest.parts.iter().filter(|p| p.primitive == kind).count();

        assert_eq!(count(PrimitiveKind::Box), 31);
        assert_eq!(count(PrimitiveKind::Cylinder), 20);
        assert_eq!(count(PrimitiveKind::Sphere), 12);
        assert_eq!(count(PrimitiveKind::Torus), 3);
        assert_eq!(count(PrimitiveKind::Plane), 1);
        assert_eq!(
            manifest.primitive_kinds(),
            vec![
                PrimitiveKind::Plane,
                PrimitiveKind::Box,
                PrimitiveKind::Sphere,
                PrimitiveKind::Torus,
                PrimitiveKind::Cylinder,
            ]
        );
    }

    #[test]
    fn test_builtin_floor_comes_first() {
        let manifest = SceneManifest::builtin().unwrap();
        let floor = &manifest.parts[0];

        assert_eq!(floor.primitive, PrimitiveKind::Plane);
        assert_eq!(floor.transform.scale, [20.0, 1.0, 10.0]);
        assert_eq!(floor.material.as_deref(), Some("planeMaterial"));
        assert_eq!(
            floor.surface,
            Surface::Texture {
                tag: "esdmat".to_string(),
                uv_scale: [5.0, 1.0]
            }
        );
    }

    #[test]
    fn test_validate_reports_undefined_tags() {
        let manifest = SceneManifest::from_json_str(
            r#"{
                "materials": [
                    { "tag": "gold", "diffuse_color": [1,1,0], "specular_color": [1,1,1], "shininess": 8 }
                ],
                "parts": [
                    { "name": "a", "primitive": "box", "material": "gold",
                      "surface": { "kind": "texture", "tag": "nowhere" } },
                    { "name": "b", "primitive": "sphere", "material": "lead",
                      "surface": { "kind": "color", "rgba": [1, 0, 0, 1] } }
                ]
            }"#,
        )
        .unwrap();

        let issues = manifest.validate();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].kind, AssetKind::Texture);
        assert_eq!(issues[0].tag, "nowhere");
        assert_eq!(issues[1].kind, AssetKind::Material);
        assert_eq!(issues[1].part, "b");
        assert_eq!(
            issues[1].to_string(),
            "part 'b' uses undefined material 'lead'"
        );
    }

    #[test]
    fn test_texture_surface_defaults_uv_scale() {
        let part: ScenePart = serde_json::from_str(
            r#"{ "name": "p", "primitive": "torus", "surface": { "kind": "texture", "tag": "copper" } }"#,
        )
        .unwrap();

        assert_eq!(part.material, None);
        assert_eq!(part.transform, Transform::default());
        assert_eq!(
            part.surface,
            Surface::Texture {
                tag: "copper".to_string(),
                uv_scale: [1.0, 1.0]
            }
        );
    }

    #[test]
    fn test_unknown_primitive_is_rejected() {
        let result = SceneManifest::from_json_str(
            r#"{ "parts": [ { "name": "p", "primitive": "cone", "surface": { "kind": "color", "rgba": [1,1,1,1] } } ] }"#,
        );
        assert!(result.is_err());
    }
}

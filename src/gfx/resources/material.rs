//! Material table for Phong shading
//!
//! Materials are plain values (diffuse color, specular color, shininess)
//! registered under a string tag. Objects reference them by tag at draw time;
//! the table itself never touches the GPU, the
//! [`ShaderBridge`](crate::gfx::bridge::ShaderBridge) writes the values into
//! the shader uniforms for each draw.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Phong surface response registered under a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub tag: String,
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub shininess: f32,
}

impl Material {
    /// Creates a new material
    ///
    /// # Arguments
    /// * `tag` - Name objects use to reference this material
    /// * `diffuse_color` - RGB diffuse response in 0..1
    /// * `specular_color` - RGB specular response in 0..1
    /// * `shininess` - Specular exponent, must not be negative. Zero gives a
    ///   constant specular term
    pub fn new(tag: &str, diffuse_color: [f32; 3], specular_color: [f32; 3], shininess: f32) -> Self {
        Self {
            tag: tag.to_string(),
            diffuse_color,
            specular_color,
            shininess,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.shininess.is_finite() || self.shininess < 0.0 {
            return Err(SceneError::InvalidMaterial {
                tag: self.tag.clone(),
                reason: format!("shininess must be a non-negative number, got {}", self.shininess),
            });
        }
        Ok(())
    }
}

/// Ordered collection of materials, looked up by tag
///
/// Lookups return the first material defined under a tag. Defining a tag a
/// second time keeps the table append-only: the new entry is stored but stays
/// shadowed by the earlier one, and a warning is logged.
#[derive(Debug, Default, Clone)]
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a material to the table
    ///
    /// # Arguments
    /// * `material` - Material to add
    ///
    /// # Returns
    /// [`SceneError::InvalidMaterial`] if the shininess is negative or not finite
    pub fn define(&mut self, material: Material) -> Result<()> {
        material.validate()?;

        if self.lookup(&material.tag).is_some() {
            log::warn!(
                "Material '{}' is already defined, the earlier definition stays in effect",
                material.tag
            );
        }

        self.materials.push(material);
        Ok(())
    }

    /// Gets a material by tag
    ///
    /// # Returns
    /// The first material defined under `tag`, if any
    pub fn lookup(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.tag == tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.lookup(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let mut table = MaterialTable::new();
        table
            .define(Material::new("solderMaterial", [0.7; 3], [0.9; 3], 16.0))
            .unwrap();

        let material = table.lookup("solderMaterial").unwrap();
        assert_eq!(material.diffuse_color, [0.7, 0.7, 0.7]);
        assert_eq!(material.specular_color, [0.9, 0.9, 0.9]);
        assert_eq!(material.shininess, 16.0);
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    fn test_duplicate_tag_keeps_first_definition() {
        let mut table = MaterialTable::new();
        table
            .define(Material::new("copper", [0.7, 0.4, 0.3], [0.8, 0.5, 0.4], 12.0))
            .unwrap();
        table
            .define(Material::new("copper", [0.0; 3], [0.0; 3], 1.0))
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("copper").unwrap().shininess, 12.0);
    }

    #[test]
    fn test_negative_shininess_is_rejected() {
        let mut table = MaterialTable::new();
        let result = table.define(Material::new("bad", [1.0; 3], [1.0; 3], -1.0));

        assert!(matches!(result, Err(SceneError::InvalidMaterial { .. })));
        assert!(table.is_empty());
    }

    #[test]
    fn test_zero_shininess_is_allowed() {
        let mut table = MaterialTable::new();
        assert!(table
            .define(Material::new("matte", [0.5; 3], [0.0; 3], 0.0))
            .is_ok());
    }
}

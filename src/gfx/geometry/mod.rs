//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes the scene is assembled from, so no
//! external model files are needed.
//!
//! ## Supported Primitives
//!
//! All shapes use a Y-up frame:
//!
//! - **Plane**: 2x2 square in the XZ plane, normal +Y
//! - **Box**: unit cube from -0.5 to 0.5 on every axis
//! - **Sphere**: UV sphere of radius 1
//! - **Cylinder**: radius 1, from y = 0 to y = 1, capped
//! - **Torus**: ring of radius 1 in the XY plane around the Z axis
//!
//! ## Usage
//!
//! ```rust
//! use boardview::config::TessellationConfig;
//! use boardview::gfx::geometry::{generate, PrimitiveKind};
//!
//! let cylinder = generate(PrimitiveKind::Cylinder, &TessellationConfig::default());
//! assert!(cylinder.triangle_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

use serde::{Deserialize, Serialize};

use crate::config::TessellationConfig;
use crate::gfx::scene::vertex::Vertex3D;

/// Shape of a primitive mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Plane,
    Box,
    Sphere,
    Cylinder,
    Torus,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 5] = [
        PrimitiveKind::Plane,
        PrimitiveKind::Box,
        PrimitiveKind::Sphere,
        PrimitiveKind::Cylinder,
        PrimitiveKind::Torus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Plane => "plane",
            PrimitiveKind::Box => "box",
            PrimitiveKind::Sphere => "sphere",
            PrimitiveKind::Cylinder => "cylinder",
            PrimitiveKind::Torus => "torus",
        }
    }
}

/// Source of primitive meshes
///
/// `load_mesh` is called once per kind during scene preparation;
/// `draw_mesh` draws the kind with whatever uniform state is current.
pub trait MeshLibrary {
    fn load_mesh(&mut self, kind: PrimitiveKind);
    fn draw_mesh(&mut self, kind: PrimitiveKind);
}

/// Generates the mesh for `kind` at the given resolution
pub fn generate(kind: PrimitiveKind, tessellation: &TessellationConfig) -> GeometryData {
    match kind {
        PrimitiveKind::Plane => generate_plane(2.0, 2.0, 1, 1),
        PrimitiveKind::Box => generate_cube(),
        PrimitiveKind::Sphere => {
            generate_sphere(tessellation.sphere_segments, tessellation.sphere_rings)
        }
        PrimitiveKind::Cylinder => generate_cylinder(1.0, 1.0, tessellation.cylinder_segments),
        PrimitiveKind::Torus => generate_torus(
            1.0,
            tessellation.torus_thickness,
            tessellation.torus_segments,
            tessellation.torus_tube_segments,
        ),
    }
}

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }
        (min, max)
    }

    /// Interleaves the attributes into the vertex format used by the renderer
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

//! # Graphics Module
//!
//! Everything between a scene manifest and a rendered frame.
//!
//! ## Architecture Overview
//!
//! - **Resources** ([`resources`]) - Tagged texture registry, material table
//!   and wgpu texture helpers
//! - **Transforms** ([`transform`]) - Scale, Euler rotation and translation
//!   composed into model matrices
//! - **Uniform Bridge** ([`bridge`]) - Named uniform writes for materials,
//!   textures and colors
//! - **Lighting** ([`lighting`]) - Directional and point lights
//! - **Geometry** ([`geometry`]) - Procedural primitive meshes
//! - **Scene** ([`scene`]) - Manifest and the prepare/render lifecycle
//! - **Rendering** ([`rendering`]) - Offscreen wgpu engine
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use boardview::gfx::{RenderEngine, scene::{SceneManager, SceneManifest}};
//! use boardview::RenderConfig;
//!
//! # fn main() -> boardview::Result<()> {
//! let config = RenderConfig::default();
//! let mut engine = pollster::block_on(RenderEngine::new_headless(&config))?;
//! let mut scene = SceneManager::new(SceneManifest::builtin()?, &config);
//! scene.prepare_scene(&mut engine, Path::new("assets"))?;
//! engine.render(&mut scene)?;
//! engine.save_png("board.png")?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use bridge::{ShaderBridge, UniformSink, UniformValue};
pub use camera::Camera;
pub use geometry::{MeshLibrary, PrimitiveKind};
pub use lighting::{DirectionalLight, LightingSetup, PointLight};
pub use rendering::render_engine::RenderEngine;
pub use transform::{build_model_matrix, Transform};

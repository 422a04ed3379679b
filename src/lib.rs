// src/lib.rs
//! Boardview
//!
//! A small scene manager built on wgpu. It loads tagged textures, defines
//! tagged Phong materials and lights once, then lays out a fixed composite
//! object (a printed-circuit-board replica) by transforming and drawing
//! primitive meshes described in a data manifest.
//!
//! The core pipeline (texture registry, material table, transform builder,
//! uniform bridge and scene script) only talks to its collaborators through
//! the [`TextureDevice`](gfx::resources::TextureDevice),
//! [`UniformSink`](gfx::bridge::UniformSink) and
//! [`MeshLibrary`](gfx::geometry::MeshLibrary) traits. The
//! [`RenderEngine`](gfx::rendering::RenderEngine) implements all three on top
//! of wgpu and renders offscreen.

pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use config::{MissPolicy, RenderConfig};
pub use error::{Result, SceneError};
pub use gfx::rendering::RenderEngine;
pub use gfx::scene::{SceneManager, SceneManifest};

/// Renders the built-in board manifest offscreen with the given configuration
///
/// Textures are resolved relative to `asset_root`. Missing textures degrade to
/// the configured fallback color unless the config asks for
/// [`MissPolicy::FailFast`].
pub fn render_builtin(
    config: &RenderConfig,
    asset_root: &std::path::Path,
) -> Result<image::RgbaImage> {
    let manifest = SceneManifest::builtin()?;
    let mut engine = pollster::block_on(RenderEngine::new_headless(config))?;
    let mut manager = SceneManager::new(manifest, config);
    manager.prepare_scene(&mut engine, asset_root)?;
    engine.render(&mut manager)?;
    let image = engine.read_frame()?;
    manager.release(&mut engine);
    Ok(image)
}

//! # Scene Module
//!
//! The data-driven scene: the manifest that lists textures, materials, lights
//! and parts, the manager that prepares and draws it, and the vertex format
//! the primitive meshes are uploaded in.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use boardview::{RenderConfig, RenderEngine, SceneManager, SceneManifest};
//!
//! # fn main() -> boardview::Result<()> {
//! let config = RenderConfig::default();
//! let mut engine = pollster::block_on(RenderEngine::new_headless(&config))?;
//! let mut scene = SceneManager::new(SceneManifest::builtin()?, &config);
//!
//! scene.prepare_scene(&mut engine, Path::new("assets"))?;
//! let stats = engine.render(&mut scene)?;
//! println!("{} draw calls", stats.draw_calls);
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod script;
pub mod vertex;

// Re-export main types
pub use manager::{FrameStats, PrepareReport, SceneManager};
pub use script::{SceneManifest, ScenePart, Surface, TextureSource, UndefinedTag};
pub use vertex::Vertex3D;

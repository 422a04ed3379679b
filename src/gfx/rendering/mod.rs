// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The offscreen render engine and the pieces it is built from: uniform
//! layouts shared with the WGSL shader, per-frame draw recording, GPU meshes
//! and pipeline creation.

pub mod frame;
pub mod mesh_library;
pub mod pipeline_manager;
pub mod render_engine;
pub mod uniforms;

// Re-export main types
pub use frame::{FrameRecorder, RecordedDraw};
pub use mesh_library::{DrawMesh, GpuMesh, PrimitiveMeshes};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use uniforms::{ObjectUniform, SceneUniform, UniformState};

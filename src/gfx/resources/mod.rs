// src/gfx/resources/mod.rs
//! Scene resources
//!
//! Tagged textures and materials, plus the wgpu texture helpers the render
//! engine builds its textures with.

pub mod material;
pub mod texture_registry;
pub mod texture_resource;

// Re-export main types
pub use material::{Material, MaterialTable};
pub use texture_registry::{
    Bitmap, TextureDevice, TextureEntry, TextureRegistry, TextureSlot, MAX_TEXTURE_UNITS,
};
pub use texture_resource::TextureResource;

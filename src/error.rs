//! Error types
//!
//! [`SceneError`] covers every failure the scene pipeline can report. Texture
//! load failures are non-fatal during scene preparation: they are logged and
//! counted, and later lookups of that tag simply miss. Lookup misses are
//! reported as [`SceneError::LookupMiss`] so that the caller decides whether
//! to degrade or abort (see [`MissPolicy`](crate::config::MissPolicy)).

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used by every fallible API in the crate.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Which registry a tag lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Material,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Texture => f.write_str("texture"),
            AssetKind::Material => f.write_str("material"),
        }
    }
}

/// Reasons a texture could not be registered.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The image file could not be read.
    #[error("Could not read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a decodable image.
    #[error("Could not decode image {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },

    /// Only RGB and RGBA bitmaps are supported.
    #[error("Not implemented to handle image with {channels} channels ({label})")]
    UnsupportedChannels { label: String, channels: u8 },

    /// Every texture unit is already taken.
    #[error("Cannot register texture '{tag}': all {capacity} texture units are in use")]
    CapacityExceeded { tag: String, capacity: usize },

    /// The GPU backend refused to create the texture.
    #[error("Texture upload failed for {label}: {reason}")]
    Gpu { label: String, reason: String },
}

/// The main error type for the scene pipeline.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A tag did not resolve to a registered texture or material.
    #[error("No {kind} registered under tag '{tag}'")]
    LookupMiss { kind: AssetKind, tag: String },

    #[error("Invalid material '{tag}': {reason}")]
    InvalidMaterial { tag: String, reason: String },

    #[error("Scene manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Scene has already been prepared")]
    AlreadyPrepared,

    #[error("Scene has not been prepared yet")]
    NotPrepared,
}

impl SceneError {
    pub fn texture_miss(tag: &str) -> Self {
        SceneError::LookupMiss {
            kind: AssetKind::Texture,
            tag: tag.to_string(),
        }
    }

    pub fn material_miss(tag: &str) -> Self {
        SceneError::LookupMiss {
            kind: AssetKind::Material,
            tag: tag.to_string(),
        }
    }

    /// True for [`SceneError::LookupMiss`].
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, SceneError::LookupMiss { .. })
    }
}

//! Scene manager
//!
//! Owns the texture registry and material table for one scene and runs the
//! two phases of its lifetime:
//!
//! 1. [`SceneManager::prepare_scene`], once: define materials, load
//!    textures and bind them to units, push the lights and load the meshes
//!    the manifest uses. An invalid material fails before any texture is
//!    created.
//! 2. [`SceneManager::render_scene`], every frame: for each part upload the
//!    model matrix, material and texture (or color) and draw the primitive.
//!
//! Both phases talk to the backend only through the collaborator traits, so a
//! recording fake can stand in for the GPU.

use std::collections::HashSet;
use std::path::Path;

use crate::config::{MissPolicy, RenderConfig};
use crate::error::{AssetKind, Result, SceneError};
use crate::gfx::bridge::{ShaderBridge, UniformSink};
use crate::gfx::geometry::MeshLibrary;
use crate::gfx::resources::{MaterialTable, TextureDevice, TextureRegistry};

use super::script::{SceneManifest, Surface};

/// Counters for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub texture_misses: usize,
    pub material_misses: usize,
}

/// Outcome of [`SceneManager::prepare_scene`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareReport {
    pub textures_loaded: usize,
    /// Tags whose image could not be loaded
    pub textures_failed: Vec<String>,
    pub units_bound: usize,
    pub materials_defined: usize,
    pub meshes_loaded: usize,
}

pub struct SceneManager<H> {
    manifest: SceneManifest,
    textures: TextureRegistry<H>,
    materials: MaterialTable,
    miss_policy: MissPolicy,
    fallback_color: [f32; 4],
    prepared: bool,
    reported_misses: HashSet<(AssetKind, String)>,
}

impl<H> SceneManager<H> {
    pub fn new(manifest: SceneManifest, config: &RenderConfig) -> Self {
        Self {
            manifest,
            textures: TextureRegistry::new(),
            materials: MaterialTable::new(),
            miss_policy: config.miss_policy,
            fallback_color: config.fallback_color,
            prepared: false,
            reported_misses: HashSet::new(),
        }
    }

    /// Builder pattern: set the lookup miss policy
    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    pub fn manifest(&self) -> &SceneManifest {
        &self.manifest
    }

    pub fn textures(&self) -> &TextureRegistry<H> {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Loads and binds everything the manifest needs
    ///
    /// Texture files that fail to load are logged and listed in the report;
    /// parts using them will miss at draw time. An invalid material aborts
    /// preparation.
    ///
    /// # Arguments
    /// * `backend` - Texture, uniform and mesh collaborator
    /// * `asset_root` - Directory the manifest's texture paths are relative to
    ///
    /// # Returns
    /// [`SceneError::AlreadyPrepared`] when called a second time
    pub fn prepare_scene<B>(&mut self, backend: &mut B, asset_root: &Path) -> Result<PrepareReport>
    where
        B: TextureDevice<Handle = H> + UniformSink + MeshLibrary + ?Sized,
    {
        if self.prepared {
            return Err(SceneError::AlreadyPrepared);
        }

        let mut report = PrepareReport::default();

        for issue in self.manifest.validate() {
            log::warn!("Scene manifest: {}", issue);
        }

        let mut materials = MaterialTable::new();
        for material in &self.manifest.materials {
            materials.define(material.clone())?;
        }

        self.textures.destroy(backend);
        self.textures = TextureRegistry::with_capacity(backend.max_texture_units());
        for source in &self.manifest.textures {
            let path = asset_root.join(&source.path);
            match self.textures.load(backend, &path, &source.tag) {
                Ok(()) => report.textures_loaded += 1,
                Err(err) => {
                    log::debug!("Texture '{}' skipped: {}", source.tag, err);
                    report.textures_failed.push(source.tag.clone());
                }
            }
        }
        report.units_bound = self.textures.bind_all(backend);

        report.materials_defined = materials.len();
        self.materials = materials;

        self.manifest.lighting.apply(backend);

        for kind in self.manifest.primitive_kinds() {
            log::debug!("Loading {} mesh", kind.name());
            backend.load_mesh(kind);
            report.meshes_loaded += 1;
        }

        log::info!(
            "Scene prepared: {} textures ({} failed), {} materials, {} meshes",
            report.textures_loaded,
            report.textures_failed.len(),
            report.materials_defined,
            report.meshes_loaded
        );

        self.prepared = true;
        Ok(report)
    }

    /// Issues the uniform writes and draw calls for every part, in order
    ///
    /// Each part gets exactly one model upload followed by exactly one draw.
    /// Lookup misses are handled according to the [`MissPolicy`]: with
    /// `Warn` a missing material leaves the previous material uniforms in
    /// place and a missing texture is replaced by the fallback color; with
    /// `FailFast` the first miss ends the frame with its error.
    pub fn render_scene<B>(&mut self, backend: &mut B) -> Result<FrameStats>
    where
        B: UniformSink + MeshLibrary + ?Sized,
    {
        if !self.prepared {
            return Err(SceneError::NotPrepared);
        }

        let mut stats = FrameStats::default();

        for part in &self.manifest.parts {
            {
                let mut bridge = ShaderBridge::new(&mut *backend, &self.textures, &self.materials);
                bridge.set_model(&part.transform.model_matrix());

                if let Some(tag) = &part.material {
                    if let Err(err) = bridge.set_material(tag) {
                        stats.material_misses += 1;
                        note_miss(self.miss_policy, &mut self.reported_misses, &part.name, err)?;
                    }
                }

                match &part.surface {
                    Surface::Texture { tag, uv_scale } => match bridge.set_texture(tag) {
                        Ok(_) => bridge.set_uv_scale(uv_scale[0], uv_scale[1]),
                        Err(err) => {
                            stats.texture_misses += 1;
                            note_miss(self.miss_policy, &mut self.reported_misses, &part.name, err)?;
                            bridge.set_solid_color(self.fallback_color);
                        }
                    },
                    Surface::Color { rgba } => bridge.set_solid_color(*rgba),
                }
            }

            backend.draw_mesh(part.primitive);
            stats.draw_calls += 1;
        }

        Ok(stats)
    }

    /// Releases every texture and forgets the materials
    ///
    /// The scene can be prepared again afterwards.
    pub fn release<D>(&mut self, device: &mut D)
    where
        D: TextureDevice<Handle = H> + ?Sized,
    {
        self.textures.destroy(device);
        self.materials = MaterialTable::new();
        self.reported_misses.clear();
        self.prepared = false;
    }
}

fn note_miss(
    policy: MissPolicy,
    reported: &mut HashSet<(AssetKind, String)>,
    part: &str,
    err: SceneError,
) -> Result<()> {
    match policy {
        MissPolicy::FailFast => Err(err),
        MissPolicy::Warn => {
            if let SceneError::LookupMiss { kind, tag } = &err {
                if reported.insert((*kind, tag.clone())) {
                    log::warn!("{} (first used by '{}')", err, part);
                } else {
                    log::debug!("{} ('{}')", err, part);
                }
            }
            Ok(())
        }
    }
}

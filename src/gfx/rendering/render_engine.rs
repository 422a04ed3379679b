//! Offscreen wgpu render engine
//!
//! [`RenderEngine`] is the GPU side of the scene pipeline. It implements the
//! three collaborator traits the scene manager drives:
//!
//! - [`TextureDevice`]: uploads bitmaps as mipmapped textures and binds them
//!   to one of sixteen texture units
//! - [`UniformSink`]: named uniform writes, routed into the shader's uniform
//!   blocks
//! - [`MeshLibrary`]: uploads primitive meshes and records draws
//!
//! Frames are rendered into an offscreen color target and read back with
//! [`RenderEngine::read_frame`].

use std::path::Path;

use image::RgbaImage;

use crate::config::RenderConfig;
use crate::error::{LoadError, Result, SceneError};
use crate::gfx::bridge::{UniformSink, UniformValue};
use crate::gfx::camera::Camera;
use crate::gfx::geometry::{MeshLibrary, PrimitiveKind};
use crate::gfx::resources::{Bitmap, TextureDevice, TextureResource, MAX_TEXTURE_UNITS};
use crate::gfx::scene::{FrameStats, SceneManager};
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    DynamicUniformBuffer, UniformBuffer,
};

use super::frame::FrameRecorder;
use super::mesh_library::{DrawMesh, PrimitiveMeshes};
use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::uniforms::{ObjectUniform, SceneUniform};

const SCENE_SHADER: &str = "scene";
const SCENE_PIPELINE: &str = "Scene";

/// Initial number of per-draw uniform slots; grows on demand
const INITIAL_DRAW_CAPACITY: usize = 128;

pub struct RenderEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,

    color_target: TextureResource,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,

    scene_buffer: UniformBuffer<SceneUniform>,
    scene_bind_group: wgpu::BindGroup,

    object_layout: BindGroupLayoutWithDesc,
    object_buffer: DynamicUniformBuffer<ObjectUniform>,
    object_bind_group: wgpu::BindGroup,

    texture_layout: BindGroupLayoutWithDesc,
    texture_units: Vec<Option<TextureResource>>,
    texture_bind_group: wgpu::BindGroup,
    textures_dirty: bool,
    placeholder: TextureResource,
    sampler: wgpu::Sampler,
    max_texture_units: usize,

    meshes: PrimitiveMeshes,
    frame: FrameRecorder,
    camera: Camera,
}

impl RenderEngine {
    /// Creates a render engine without a window
    ///
    /// # Arguments
    /// * `config` - Target size, clear color, camera and tessellation
    ///
    /// # Returns
    /// [`SceneError::Gpu`] if no adapter or device is available, the target
    /// size exceeds the device limits, or the scene pipeline fails validation
    pub async fn new_headless(config: &RenderConfig) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| SceneError::Gpu(format!("Failed to request adapter: {err}")))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Boardview Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| SceneError::Gpu(format!("Failed to request a device: {err}")))?;

        let max_dimension = device.limits().max_texture_dimension_2d;
        if !(1..=max_dimension).contains(&config.width) || !(1..=max_dimension).contains(&config.height) {
            return Err(SceneError::Gpu(format!(
                "Render target {}x{} must be between 1 and {} on each axis",
                config.width, config.height, max_dimension
            )));
        }

        let max_texture_units =
            (device.limits().max_sampled_textures_per_shader_stage as usize).min(MAX_TEXTURE_UNITS);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let color_target = TextureResource::create_render_target(
            &device,
            config.width,
            config.height,
            "Offscreen Color Target",
        );
        let depth_texture = TextureResource::create_depth_texture(
            &device,
            config.width,
            config.height,
            "Depth Texture",
        );

        // Group 0: camera and lights
        let scene_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Scene Bind Group Layout");
        let scene_buffer = UniformBuffer::<SceneUniform>::new(&device);
        let scene_bind_group = BindGroupBuilder::new(&scene_layout)
            .resource(scene_buffer.binding_resource())
            .create(&device, "Scene Bind Group");

        // Group 1: per-draw object block
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::dynamic_uniform(
                std::mem::size_of::<ObjectUniform>() as u64,
            ))
            .create(&device, "Object Bind Group Layout");
        let object_buffer = DynamicUniformBuffer::<ObjectUniform>::new(&device, INITIAL_DRAW_CAPACITY);
        let object_bind_group = Self::create_object_bind_group(&device, &object_layout, &object_buffer);

        // Group 2: texture units and the shared sampler
        let mut texture_layout = BindGroupLayoutBuilder::new();
        for _ in 0..MAX_TEXTURE_UNITS {
            texture_layout = texture_layout.next_binding_fragment(binding_types::texture_2d());
        }
        let texture_layout = texture_layout
            .next_binding_fragment(binding_types::sampler())
            .create(&device, "Texture Units Bind Group Layout");

        let placeholder = TextureResource::create_solid(&device, &queue, [255; 4], "Placeholder Texture");
        let sampler = TextureResource::create_scene_sampler(&device);
        let texture_units = vec![None; MAX_TEXTURE_UNITS];
        let texture_bind_group = Self::create_texture_bind_group(
            &device,
            &texture_layout,
            &texture_units,
            &placeholder,
            &sampler,
        );

        let mut pipeline_manager = PipelineManager::new();
        pipeline_manager.load_shader(&device, SCENE_SHADER, include_str!("scene.wgsl"));
        pipeline_manager.create_pipeline(
            &device,
            SCENE_PIPELINE,
            &PipelineConfig::default_with_shader(SCENE_SHADER)
                .with_label("Scene Pipeline")
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format: TextureResource::COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
            &[
                &scene_layout.layout,
                &object_layout.layout,
                &texture_layout.layout,
            ],
        )?;

        if let Some(err) = device.pop_error_scope().await {
            return Err(SceneError::Gpu(format!("Scene pipeline setup failed: {err}")));
        }

        let [r, g, b, a] = config.clear_color;

        Ok(Self {
            device,
            queue,
            width: config.width,
            height: config.height,
            clear_color: wgpu::Color { r, g, b, a },
            color_target,
            depth_texture,
            pipeline_manager,
            scene_buffer,
            scene_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            texture_layout,
            texture_units,
            texture_bind_group,
            textures_dirty: false,
            placeholder,
            sampler,
            max_texture_units,
            meshes: PrimitiveMeshes::new(config.tessellation),
            frame: FrameRecorder::new(),
            camera: Camera::from_config(&config.camera, config.aspect_ratio()),
        })
    }

    fn create_object_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        buffer: &DynamicUniformBuffer<ObjectUniform>,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(buffer.binding_resource())
            .create(device, "Object Bind Group")
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        units: &[Option<TextureResource>],
        placeholder: &TextureResource,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let mut builder = BindGroupBuilder::new(layout);
        for unit in units {
            let view = unit.as_ref().map_or(&placeholder.view, |texture| &texture.view);
            builder = builder.texture(view);
        }
        builder.sampler(sampler).create(device, "Texture Units Bind Group")
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Renders one frame of a prepared scene into the offscreen target
    ///
    /// The camera is uploaded first, then the scene issues its per-part
    /// uniform writes and draws, and finally the recorded draws are encoded
    /// into a single render pass.
    pub fn render(&mut self, scene: &mut SceneManager<TextureResource>) -> Result<FrameStats> {
        self.frame.begin_frame();
        let camera = self.camera;
        camera.apply(&mut self.frame);

        let stats = scene.render_scene(self)?;
        self.submit_frame()?;

        log::debug!(
            "Rendered frame: {} draws, {} texture misses, {} material misses",
            stats.draw_calls,
            stats.texture_misses,
            stats.material_misses
        );
        Ok(stats)
    }

    fn submit_frame(&mut self) -> Result<()> {
        self.scene_buffer
            .update_content(&self.queue, self.frame.scene_uniform());

        let objects = self.frame.object_uniforms();
        if self.object_buffer.write_all(&self.device, &self.queue, &objects) {
            log::debug!("Grew object uniform buffer to {} draws", self.object_buffer.capacity());
            self.object_bind_group =
                Self::create_object_bind_group(&self.device, &self.object_layout, &self.object_buffer);
        }

        if self.textures_dirty {
            self.texture_bind_group = Self::create_texture_bind_group(
                &self.device,
                &self.texture_layout,
                &self.texture_units,
                &self.placeholder,
                &self.sampler,
            );
            self.textures_dirty = false;
        }

        let pipeline = self
            .pipeline_manager
            .get_pipeline(SCENE_PIPELINE)
            .ok_or_else(|| SceneError::Gpu(format!("Pipeline '{}' not found", SCENE_PIPELINE)))?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_bind_group(2, &self.texture_bind_group, &[]);

            for (index, draw) in self.frame.draws().iter().enumerate() {
                let Some(mesh) = self.meshes.get(draw.kind) else {
                    continue;
                };
                render_pass.set_bind_group(1, &self.object_bind_group, &[self.object_buffer.offset(index)]);
                render_pass.draw_gpu_mesh(mesh);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Copies the last rendered frame back to the CPU
    pub fn read_frame(&self) -> Result<RgbaImage> {
        let padded_row = padded_bytes_per_row(self.width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Readback Buffer"),
            size: padded_row as u64 * self.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color_target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        let _ = self.device.poll(wgpu::MaintainBase::Wait);

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(SceneError::Gpu(format!("Failed to map readback buffer: {err}"))),
            Err(_) => return Err(SceneError::Gpu("Readback was cancelled".to_string())),
        }

        let mapped = slice.get_mapped_range();
        let pixels = strip_row_padding(&mapped, self.width, self.height, padded_row);
        drop(mapped);
        buffer.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| SceneError::Gpu("Readback size does not match the target".to_string()))
    }

    /// Reads the last frame back and writes it as a PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.read_frame()?
            .save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Saved frame to {}", path.display());
        Ok(())
    }
}

impl TextureDevice for RenderEngine {
    type Handle = TextureResource;

    fn create_texture(&mut self, bitmap: &Bitmap, label: &str) -> std::result::Result<TextureResource, LoadError> {
        let max_dimension = self.device.limits().max_texture_dimension_2d;
        if bitmap.width() > max_dimension || bitmap.height() > max_dimension {
            return Err(LoadError::Gpu {
                label: label.to_string(),
                reason: format!(
                    "{}x{} exceeds the device limit of {}",
                    bitmap.width(),
                    bitmap.height(),
                    max_dimension
                ),
            });
        }
        Ok(TextureResource::create_from_bitmap(&self.device, &self.queue, bitmap, label))
    }

    fn bind_texture_unit(&mut self, unit: u32, handle: &TextureResource) {
        match self.texture_units.get_mut(unit as usize) {
            Some(slot) => {
                *slot = Some(handle.clone());
                self.textures_dirty = true;
            }
            None => log::warn!("Texture unit {} is out of range", unit),
        }
    }

    /// Destroys the texture
    ///
    /// Every unit is reset to the placeholder since the registry releases
    /// its textures together.
    fn release_texture(&mut self, handle: TextureResource) {
        for slot in &mut self.texture_units {
            *slot = None;
        }
        self.textures_dirty = true;
        handle.texture.destroy();
    }

    fn max_texture_units(&self) -> usize {
        self.max_texture_units
    }
}

impl UniformSink for RenderEngine {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.frame.set_uniform(name, value);
    }
}

impl MeshLibrary for RenderEngine {
    fn load_mesh(&mut self, kind: PrimitiveKind) {
        self.meshes.load(&self.device, kind);
    }

    fn draw_mesh(&mut self, kind: PrimitiveKind) {
        if !self.meshes.is_loaded(kind) {
            log::warn!("Drawing {} before its mesh was loaded", kind.name());
        }
        self.frame.record_draw(kind);
    }
}

/// Row pitch of a readback buffer, padded to wgpu's copy alignment
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

fn strip_row_padding(data: &[u8], width: u32, height: u32, padded_row: u32) -> Vec<u8> {
    let row = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded_row as usize).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bytes_per_row() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1280), 5120);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn test_strip_row_padding() {
        let padded = padded_bytes_per_row(2) as usize;
        let mut data = vec![0u8; padded * 2];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[padded..padded + 8].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);

        let pixels = strip_row_padding(&data, 2, 2, padded as u32);
        assert_eq!(pixels, (1..=16).collect::<Vec<u8>>());
    }
}

use std::collections::HashMap;

use crate::config::TessellationConfig;
use crate::gfx::geometry::{generate, PrimitiveKind};

/// One primitive uploaded to the GPU
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, kind: PrimitiveKind, tessellation: &TessellationConfig) -> Self {
        let geometry = generate(kind, tessellation);
        let vertices = geometry.to_vertices();

        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", kind.name())),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", kind.name())),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        log::debug!(
            "Uploaded {} mesh: {} vertices, {} triangles",
            kind.name(),
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Primitive meshes keyed by kind, each uploaded at most once
pub struct PrimitiveMeshes {
    meshes: HashMap<PrimitiveKind, GpuMesh>,
    tessellation: TessellationConfig,
}

impl PrimitiveMeshes {
    pub fn new(tessellation: TessellationConfig) -> Self {
        Self {
            meshes: HashMap::new(),
            tessellation,
        }
    }

    /// Uploads the mesh for `kind` unless it is already resident
    pub fn load(&mut self, device: &wgpu::Device, kind: PrimitiveKind) {
        if !self.meshes.contains_key(&kind) {
            let mesh = GpuMesh::upload(device, kind, &self.tessellation);
            self.meshes.insert(kind, mesh);
        }
    }

    pub fn get(&self, kind: PrimitiveKind) -> Option<&GpuMesh> {
        self.meshes.get(&kind)
    }

    pub fn is_loaded(&self, kind: PrimitiveKind) -> bool {
        self.meshes.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

pub trait DrawMesh<'a> {
    fn draw_gpu_mesh(&mut self, mesh: &'a GpuMesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_gpu_mesh(&mut self, mesh: &'b GpuMesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

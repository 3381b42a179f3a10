//! # Buffer State Module
//!
//! GPU-resident block geometry. `WgpuMeshBackend` implements `MeshBackend` on top of a wgpu
//! device: every uploaded block gets its own vertex buffer, index buffer and translation
//! uniform, bound through a per-block bind group.
//!
//! ## Key Features
//!
//! * Out-of-memory detection through a wgpu error scope around every upload
//! * An optional byte budget checked before anything is allocated
//! * Buffer usage analytics and memory tracking
//!
//! ## Performance Considerations
//!
//! * Buffers are created initialised (`create_buffer_init`), so an upload is one allocation
//!   and one copy per buffer
//! * Released buffers are destroyed immediately instead of waiting for the last handle drop

use cgmath::Vector3;
use log::{debug, warn};
use wgpu::{util::DeviceExt, BindGroup, BindGroupLayout, Buffer, Device};

use super::{
    displayer::{BlockIndex, MeshBackend},
    error::DisplayError,
    rendering::meshing::MeshData,
};

/// Label of the bind group layout shared by all block translation uniforms.
pub const BLOCK_BIND_GROUP_LAYOUT: &str = "block_bind_group_layout";

/// Translation uniform of one block, as the shader sees it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockUniform {
    translation: [f32; 4],
}

impl BlockUniform {
    /// Creates the uniform for a block placed at `translation`.
    pub fn new(translation: Vector3<f32>) -> Self {
        Self {
            translation: [translation.x, translation.y, translation.z, 0.0],
        }
    }
}

/// Size of a block's translation uniform in bytes.
const BLOCK_UNIFORM_SIZE: u64 = std::mem::size_of::<BlockUniform>() as u64;

/// Analytics data for the block buffers
///
/// Tracks memory allocation and upload counts to help spot runaway regeneration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufferAnalytics {
    /// Bytes currently allocated across all live blocks
    pub allocated_memory: u64,
    /// Highest value `allocated_memory` has reached
    pub peak_memory: u64,
    /// Number of blocks currently holding buffers
    pub live_blocks: u64,
    /// Number of successful uploads
    pub uploads: u64,
    /// Number of released blocks
    pub releases: u64,
}

/// GPU resources of one block.
#[derive(Debug)]
pub struct GpuBlockMesh {
    /// Vertex buffer holding block-local vertices
    pub vertex_buffer: Buffer,
    /// Index buffer of `u32` triangle indices
    pub index_buffer: Buffer,
    /// Uniform buffer holding the block translation
    pub translation_buffer: Buffer,
    /// Bind group exposing `translation_buffer` at group 1
    pub bind_group: BindGroup,
    /// Bytes accounted to this block
    pub byte_size: u64,
}

impl GpuBlockMesh {
    fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.translation_buffer.destroy();
    }
}

/// Mesh backend allocating block geometry on a wgpu device.
pub struct WgpuMeshBackend {
    device: Device,
    block_bind_group_layout: BindGroupLayout,
    budget: Option<u64>,
    analytics: BufferAnalytics,
}

impl WgpuMeshBackend {
    /// Creates a backend allocating on `device`.
    pub fn new(device: Device, budget: Option<u64>) -> Self {
        let block_bind_group_layout = Self::create_block_bind_group_layout(&device);
        Self {
            device,
            block_bind_group_layout,
            budget,
            analytics: BufferAnalytics::default(),
        }
    }

    /// Layout of the per-block translation uniform (group 1, binding 0).
    pub fn create_block_bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(BLOCK_UNIFORM_SIZE),
                },
                count: None,
            }],
            label: Some(BLOCK_BIND_GROUP_LAYOUT),
        })
    }

    /// The layout block bind groups are created with; pipelines must use the same one.
    pub fn block_bind_group_layout(&self) -> &BindGroupLayout {
        &self.block_bind_group_layout
    }

    /// Current allocation analytics.
    pub fn analytics(&self) -> BufferAnalytics {
        self.analytics
    }
}

impl MeshBackend for WgpuMeshBackend {
    type Handle = GpuBlockMesh;

    fn upload(
        &mut self,
        block: BlockIndex,
        mesh: &MeshData,
        translation: Vector3<f32>,
        replacing: Option<&GpuBlockMesh>,
    ) -> Result<GpuBlockMesh, DisplayError> {
        let requested_bytes = mesh.byte_size() + BLOCK_UNIFORM_SIZE;
        let replaced_bytes = replacing.map_or(0, |old| old.byte_size);
        if let Some(budget) = self.budget {
            let remaining = self.analytics.allocated_memory.saturating_sub(replaced_bytes);
            if remaining + requested_bytes > budget {
                return Err(DisplayError::ResourceExhaustion {
                    block,
                    requested_bytes,
                    reason: format!(
                        "GPU memory budget of {} bytes exceeded ({} bytes allocated)",
                        budget, self.analytics.allocated_memory
                    ),
                });
            }
        }

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Block Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Block Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let translation_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Block Translation Buffer"),
                contents: bytemuck::cast_slice(&[BlockUniform::new(translation)]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.block_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: translation_buffer.as_entire_binding(),
            }],
            label: Some("Block Bind Group"),
        });

        let handle = GpuBlockMesh {
            vertex_buffer,
            index_buffer,
            translation_buffer,
            bind_group,
            byte_size: requested_bytes,
        };

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            warn!("Allocation for block {:?} failed: {}", block, error);
            handle.destroy();
            return Err(DisplayError::ResourceExhaustion {
                block,
                requested_bytes,
                reason: error.to_string(),
            });
        }

        let analytics = &mut self.analytics;
        analytics.allocated_memory += requested_bytes;
        analytics.peak_memory = analytics.peak_memory.max(analytics.allocated_memory);
        analytics.live_blocks += 1;
        analytics.uploads += 1;
        debug!(
            "Uploaded block {:?}: {} bytes, {} bytes allocated in total",
            block, requested_bytes, analytics.allocated_memory
        );

        Ok(handle)
    }

    fn release(&mut self, handle: GpuBlockMesh) {
        handle.destroy();
        let analytics = &mut self.analytics;
        analytics.allocated_memory = analytics.allocated_memory.saturating_sub(handle.byte_size);
        analytics.live_blocks = analytics.live_blocks.saturating_sub(1);
        analytics.releases += 1;
    }

    fn set_memory_budget(&mut self, budget: Option<u64>) {
        self.budget = budget;
    }
}

//! Meshing renderer module for the voxel map.
//!
//! This module handles the rendering of cached block meshes, one indexed draw per block.
//!
//! # Architecture
//!
//! The meshing renderer is responsible for:
//! 1. Creating and managing its own render pipeline
//! 2. Binding the camera uniform for the frame
//! 3. Providing `WgpuBlockDrawer`, which the displayer calls once per non-empty block
//!
//! # Performance Considerations
//!
//! - Back faces are culled, so hidden faces within a voxel never reach the rasterizer
//! - Each block binds its own vertex, index and translation resources; nothing is rebuilt
//!   per frame

use wgpu::{Device, RenderPass, RenderPipeline, TextureFormat};

use crate::engine_state::{
    buffer_state::GpuBlockMesh,
    displayer::{BlockDrawer, BlockMesh},
    rendering::{bind_group_state::BindGroupState, Vertex},
};

/// Bind group slot of the camera uniform.
const CAMERA_GROUP: u32 = 0;
/// Bind group slot of a block's translation uniform.
const BLOCK_GROUP: u32 = 1;

/// Manages mesh rendering for the voxel map.
pub struct MeshingRenderer {
    /// The WebGPU render pipeline for mesh rendering
    render_pipeline: RenderPipeline,
}

impl MeshingRenderer {
    /// Creates a new `MeshingRenderer` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `shader_string` - The WGSL shader source code
    /// * `texture_format` - The texture format to use for rendering
    /// * `bind_group_state` - Layouts of the camera and block bind groups
    /// * `depth_stencil` - Optional depth stencil state
    pub fn new(
        device: &Device,
        shader_string: &str,
        texture_format: TextureFormat,
        bind_group_state: &BindGroupState,
        depth_stencil: Option<wgpu::DepthStencilState>,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Render Pipeline Layout"),
            bind_group_layouts: &[
                bind_group_state.camera_bind_group_layout(),
                bind_group_state.block_bind_group_layout(),
            ],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self { render_pipeline }
    }

    /// Sets the pipeline and camera bind group, then returns a drawer for the blocks.
    pub fn begin<'p, 'e>(
        &self,
        render_pass: &'p mut RenderPass<'e>,
        bind_group_state: &BindGroupState,
    ) -> WgpuBlockDrawer<'p, 'e> {
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(CAMERA_GROUP, bind_group_state.camera_bind_group(), &[]);
        WgpuBlockDrawer { render_pass }
    }
}

/// Records one indexed draw per block into a render pass.
pub struct WgpuBlockDrawer<'p, 'e> {
    render_pass: &'p mut RenderPass<'e>,
}

impl BlockDrawer<GpuBlockMesh> for WgpuBlockDrawer<'_, '_> {
    fn draw_block(&mut self, mesh: &BlockMesh<GpuBlockMesh>) {
        let gpu = &mesh.handle;
        self.render_pass
            .set_bind_group(BLOCK_GROUP, &gpu.bind_group, &[]);
        self.render_pass
            .set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        self.render_pass
            .set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

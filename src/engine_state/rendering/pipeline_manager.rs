//! Manages the WebGPU render pipeline and associated rendering resources.
//!
//! This module coordinates a frame: it acquires the surface texture, opens a render pass
//! with a depth attachment and hands the pass to the displayer through the meshing
//! renderer's block drawer.
//!
//! # Resource Management
//!
//! The pipeline manager initializes and maintains shared resources:
//!
//! - Bind groups for the camera and the block translation layout
//! - The depth texture, recreated on resize

use log::{debug, warn};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, TextureFormat};

use super::{bind_group_state::BindGroupState, meshing::MeshingRenderer, texture::DepthTexture};
use crate::engine_state::{
    buffer_state::WgpuMeshBackend,
    displayer::Displayer,
    rendering::meshing::Mesher,
    voxels::volume::VoxelVolume,
};

/// Background colour, matching the shader's fog colour.
pub const SKY_COLOR: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.71,
    b: 0.92,
    a: 1.0,
};

/// Manages the WebGPU rendering process and associated rendering resources.
pub struct PipelineManager {
    /// Manages all bind groups used in the pipeline
    pub bind_group_state: BindGroupState,
    /// Depth texture used for depth testing
    pub depth_texture: DepthTexture,
    /// Meshing renderer for voxel meshes
    pub meshing_renderer: MeshingRenderer,
}

impl PipelineManager {
    /// Creates a new `PipelineManager` instance.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - Surface configuration containing size and format
    /// * `texture_format` - The texture format to use for rendering
    /// * `bind_group_state` - Camera and block bind group state
    /// * `shader_string` - The WGSL shader source code for mesh rendering
    pub fn new(
        device: &Device,
        config: &SurfaceConfiguration,
        texture_format: TextureFormat,
        bind_group_state: BindGroupState,
        shader_string: &str,
    ) -> Self {
        let depth_texture = DepthTexture::new(device, config, "DEPTH TEXTURE");

        let meshing_renderer = MeshingRenderer::new(
            device,
            shader_string,
            texture_format,
            &bind_group_state,
            Some(DepthTexture::depth_stencil_state()),
        );

        Self {
            bind_group_state,
            depth_texture,
            meshing_renderer,
        }
    }

    /// Renders a frame to the given surface.
    ///
    /// 1. Acquires the next frame from the surface
    /// 2. Creates a render pass clearing colour and depth
    /// 3. Lets the displayer draw every cached block
    /// 4. Submits commands to the GPU and presents the frame
    ///
    /// A frame that cannot be acquired is skipped with a warning; the next call tries again.
    pub fn render<V, M>(
        &mut self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        displayer: &Displayer<'_, V, M, WgpuMeshBackend>,
    ) where
        V: VoxelVolume + ?Sized,
        M: Mesher<V>,
    {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                warn!("Error getting current frame: {:?}", err);
                return;
            }
        };

        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&Default::default());
        let drawn = {
            let depth_stencil_attachment = Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment,
                ..Default::default()
            });

            let mut drawer = self
                .meshing_renderer
                .begin(&mut rpass, &self.bind_group_state);
            displayer.display(&mut drawer)
        };

        queue.submit([encoder.finish()]);
        frame.present();
        debug!("Frame drew {} blocks", drawn);
    }

    /// Handles window resize events by recreating the depth texture.
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = DepthTexture::new(device, config, "DEPTH TEXTURE");
    }
}

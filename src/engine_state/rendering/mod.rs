//! Rendering system for the voxel map viewer.
//!
//! This module contains the wgpu side of the viewer: the surface, the pipeline drawing cached
//! block meshes and the meshing code producing them. The displayer itself never touches wgpu
//! types; everything GPU-specific is reached through `WgpuMeshBackend` and `WgpuBlockDrawer`.

use std::borrow::Cow;

use log::info;
use pipeline_manager::PipelineManager;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use super::{
    buffer_state::WgpuMeshBackend,
    camera_state::camera,
    config::ViewerConfig,
    displayer::Displayer,
    error::ViewerError,
    voxels::volume::VoxelVolume,
};

mod bind_group_state;
pub mod meshing;
mod pipeline_manager;
mod texture;
mod vertex;

pub use bind_group_state::BindGroupState;
pub use vertex::Vertex;

/// The built-in voxel map shader.
pub const DEFAULT_SHADER: &str = include_str!("../../../assets/shaders/voxel_map.wgsl");

/// Returns the shader named in `config`, or the built-in one.
pub fn load_shader(config: &ViewerConfig) -> Result<Cow<'static, str>, ViewerError> {
    match &config.shader_path {
        Some(path) => {
            let source = std::fs::read_to_string(path).map_err(|source| ViewerError::Shader {
                path: path.clone(),
                source,
            })?;
            info!("Loaded shader from {}", path);
            Ok(Cow::Owned(source))
        }
        None => Ok(Cow::Borrowed(DEFAULT_SHADER)),
    }
}

/// Manages the entire rendering pipeline for the viewer.
///
/// This struct is the main entry point for all rendering operations.
/// It manages the WebGPU surface, device, queue, and rendering pipeline.
pub struct RenderManager {
    /// The WebGPU surface being rendered to
    pub surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    pub surface_config: SurfaceConfiguration,
    /// The WebGPU device used for creating GPU resources
    pub device: Device,
    /// The WebGPU queue for submitting command buffers
    pub queue: Queue,
    /// Manages the rendering pipeline and shaders
    pub pipeline_manager: PipelineManager,
    /// Camera projection settings
    pub camera_projection: camera::Projection,
}

impl RenderManager {
    /// Creates a new `RenderManager` instance.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to
    /// * `surface_config` - Configuration for the surface
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue
    /// * `bind_group_state` - Camera and block bind group state
    /// * `shader_string` - WGSL source code for the shaders
    /// * `camera_projection` - Initial camera projection settings
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        bind_group_state: BindGroupState,
        shader_string: &str,
        camera_projection: camera::Projection,
    ) -> Self {
        let pipeline_manager = PipelineManager::new(
            &device,
            &surface_config,
            surface_config.format,
            bind_group_state,
            shader_string,
        );

        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            camera_projection,
        }
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration, camera projection, and depth texture to match the
    /// new window size. A zero-sized window keeps the previous configuration.
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);

        self.camera_projection.resize(size.width, size.height);
        self.pipeline_manager
            .resize(&self.device, &self.surface_config);
    }

    /// Renders a new frame showing everything `displayer` has cached.
    pub fn render<V, M>(&mut self, displayer: &Displayer<'_, V, M, WgpuMeshBackend>)
    where
        V: VoxelVolume + ?Sized,
        M: meshing::Mesher<V>,
    {
        self.pipeline_manager
            .render(&self.surface, &self.device, &self.queue, displayer);
    }
}

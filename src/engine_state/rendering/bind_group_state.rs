//! Manages WebGPU bind groups and their layouts.
//!
//! The voxel map pipeline uses two groups:
//! - group 0: the camera uniform, one bind group for the whole frame
//! - group 1: a block's translation uniform, one bind group per uploaded block
//!
//! Block bind groups are created by the mesh backend when a block is uploaded, so this state
//! only holds their layout.

use wgpu::{BindGroup, BindGroupLayout, Buffer, Device};

use crate::engine_state::buffer_state::WgpuMeshBackend;

/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";

/// Bind groups and layouts shared by the voxel map pipeline.
pub struct BindGroupState {
    camera_bind_group: BindGroup,
    camera_bind_group_layout: BindGroupLayout,
    block_bind_group_layout: BindGroupLayout,
}

impl BindGroupState {
    /// Creates the camera bind group over `camera_buffer` and takes the block layout from
    /// `backend`.
    pub fn new(device: &Device, camera_buffer: &Buffer, backend: &WgpuMeshBackend) -> Self {
        let (camera_bind_group, camera_bind_group_layout) =
            Self::generate_camera_bindgroups(device, camera_buffer);

        Self {
            camera_bind_group,
            camera_bind_group_layout,
            block_bind_group_layout: backend.block_bind_group_layout().clone(),
        }
    }

    /// The camera bind group (group 0).
    pub fn camera_bind_group(&self) -> &BindGroup {
        &self.camera_bind_group
    }

    /// Layout of the camera bind group.
    pub fn camera_bind_group_layout(&self) -> &BindGroupLayout {
        &self.camera_bind_group_layout
    }

    /// Layout of the per-block bind groups (group 1).
    pub fn block_bind_group_layout(&self) -> &BindGroupLayout {
        &self.block_bind_group_layout
    }

    /// Creates bind groups for camera uniforms.
    ///
    /// This sets up the bind group layout and bind group for camera uniforms
    /// that will be used in the vertex and fragment shaders.
    fn generate_camera_bindgroups(device: &Device, camera_buffer: &Buffer) -> (BindGroup, BindGroupLayout) {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some(CAMERA_BIND_GROUP_LAYOUT),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some(CAMERA_BIND_GROUP),
        });

        (camera_bind_group, camera_bind_group_layout)
    }
}

//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Camera view tracking
//! - View and projection matrix calculations
//! - Player input processing for camera control
//! - The camera uniform buffer read by the voxel map shader
//!
//! ## Core Components
//! - `Camera`: The free camera's view matrix
//! - `CameraController`: Handles player input and updates camera state
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders

use camera::{CameraController, ROTATION_SPEED, TRANSLATION_SPEED};
use cgmath::{Point3, Vector3};
use wgpu::util::DeviceExt;

use super::PlayerAction;

pub mod camera;

/// Manages the complete camera system including state, controls, and GPU resources.
///
/// # Fields
/// - `camera`: The current camera view
/// - `camera_uniform`: GPU-optimized camera data for shaders
/// - `camera_controller`: Handles player input and camera movement
/// - `camera_buffer`: Uniform buffer bound at group 0
pub struct CameraState {
    /// The current camera view
    pub camera: camera::Camera,
    /// GPU-optimized camera data for shaders
    pub camera_uniform: camera::CameraUniform,
    /// Handles player input and camera movement
    pub camera_controller: camera::CameraController,
    /// Uniform buffer holding `camera_uniform`
    pub camera_buffer: wgpu::Buffer,
}

/// Name of the GPU buffer used for camera uniform data
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";

impl CameraState {
    /// Creates a camera above the corner of a volume of size `extent`, looking at its centre.
    ///
    /// # Arguments
    /// * `device` - Device the camera buffer is created on
    /// * `extent` - Size of the displayed volume
    /// * `projection` - The initial camera projection settings
    pub fn new(device: &wgpu::Device, extent: Vector3<i32>, projection: &camera::Projection) -> Self {
        let size = extent.map(|axis| axis.max(1) as f32);
        let target = Point3::new(size.x * 0.5, size.y * 0.25, size.z * 0.5);
        let eye = Point3::new(-size.x * 0.25, size.y * 1.5, -size.z * 0.25);
        let camera = camera::Camera::looking_at(eye, target);
        let camera_controller = CameraController::new(TRANSLATION_SPEED, ROTATION_SPEED);

        let mut camera_uniform = camera::CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&camera, projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(CAMERA_BUFFER_NAME),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        CameraState {
            camera,
            camera_uniform,
            camera_controller,
            camera_buffer,
        }
    }

    /// Processes player input actions and updates the camera controller state.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Moves the camera for a frame of length `dt` and uploads the new uniform.
    ///
    /// Returns whether the camera moved.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        dt: web_time::Duration,
        projection: &camera::Projection,
    ) -> bool {
        if !self.camera_controller.has_updates() {
            return false;
        }

        self.camera_controller.apply(&mut self.camera, dt);
        self.refresh(queue, projection);
        true
    }

    /// Recomputes the uniform from the current camera and projection and uploads it.
    pub fn refresh(&mut self, queue: &wgpu::Queue, projection: &camera::Projection) {
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, projection);
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }
}

//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - A free camera stored directly as a view matrix
//! - Projection matrix handling
//! - Keyboard controller editing the view matrix
//! - GPU uniform layout
//!
//! ## Key Components
//! - `Camera`: The view matrix, world to camera space
//! - `Projection`: Manages perspective projection settings
//! - `CameraController`: Turns held keys into view-space translations and rotations
//! - `CameraUniform`: Packed data structure for GPU shaders

use cgmath::*;
use web_time::Duration;

use crate::engine_state::PlayerAction;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU uses a coordinate system where:
/// - X is right
/// - Y is up
/// - Z is forward (unlike OpenGL where Z is backward)
/// - NDC (Normalized Device Coordinates) range from -1 to 1 in X and Y, and 0 to 1 in Z
///
/// This matrix performs two main transformations:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Translation speed in world units per second.
pub const TRANSLATION_SPEED: f32 = 40.0;
/// Rotation speed in radians per second.
pub const ROTATION_SPEED: f32 = 2.0;

/// A free-flying camera.
///
/// Movement is applied in view space by pre-multiplying the view matrix, so "forward" is
/// always where the camera currently looks and rotations are about the camera's own axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World to view space transform
    pub view: Matrix4<f32>,
}

impl Camera {
    /// Creates a camera at `eye` looking at `target` with +Y up.
    pub fn looking_at(eye: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            view: Matrix4::look_at_rh(eye, target, Vector3::unit_y()),
        }
    }

    /// The camera's position in world space.
    pub fn position(&self) -> Point3<f32> {
        self.view
            .invert()
            .map(|inverse| Point3::from_homogeneous(inverse.w))
            .unwrap_or_else(Point3::origin)
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.view
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the perspective projection used to render the 3D scene.
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Handles camera movement and rotation based on held keys.
///
/// Each axis accumulates `positive - negative` so opposite keys cancel out.
#[derive(Debug)]
pub struct CameraController {
    /// View-space translation direction
    translation: Vector3<f32>,
    /// Rotation direction about the view-space X, Y and Z axes
    rotation: Vector3<f32>,

    translation_speed: f32,
    rotation_speed: f32,
}

impl CameraController {
    /// Creates a new camera controller.
    ///
    /// # Arguments
    /// * `translation_speed` - Movement speed in units per second
    /// * `rotation_speed` - Turn speed in radians per second
    pub fn new(translation_speed: f32, rotation_speed: f32) -> Self {
        Self {
            translation: Vector3::zero(),
            rotation: Vector3::zero(),
            translation_speed,
            rotation_speed,
        }
    }

    /// Processes player actions and updates controller state accordingly.
    ///
    /// Signs are those of the world motion in view space, the opposite of the camera motion.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;

        self.translation = Vector3::new(
            axis(actions.move_left, actions.move_right),
            axis(actions.move_down, actions.move_up),
            axis(actions.move_forward, actions.move_backward),
        );
        self.rotation = Vector3::new(
            axis(actions.turn_x_positive, actions.turn_x_negative),
            axis(actions.turn_y_positive, actions.turn_y_negative),
            axis(actions.turn_z_positive, actions.turn_z_negative),
        );
    }

    /// Checks if there are any pending updates that would affect the camera.
    pub fn has_updates(&self) -> bool {
        !self.translation.is_zero() || !self.rotation.is_zero()
    }

    /// Applies the pending movement for a frame of length `dt`.
    ///
    /// The translation is applied first, then rotations about X, Y and Z, each one
    /// pre-multiplied onto the view matrix.
    pub fn apply(&self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        let translation = self.translation * self.translation_speed * dt;
        let angles = self.rotation * self.rotation_speed * dt;

        let movement = Matrix4::from_angle_z(Rad(angles.z))
            * Matrix4::from_angle_y(Rad(angles.y))
            * Matrix4::from_angle_x(Rad(angles.x))
            * Matrix4::from_translation(translation);
        camera.view = movement * camera.view;
    }
}

/// GPU-friendly representation of camera data for shaders.
///
/// This struct is used to pass camera data to the GPU in a format that matches
/// the layout expected by the shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly so we'll have to conver the Matrix4 into a 4x4 f32 array
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the view-projection matrix and position based on the current camera state.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
        let pos3: [f32; 3] = camera.position().into();

        self.position = [pos3[0], pos3[1], pos3[2], 1.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_forward_moves_along_view_direction() {
        let mut camera = Camera {
            view: Matrix4::identity(),
        };
        let mut controller = CameraController::new(TRANSLATION_SPEED, ROTATION_SPEED);
        controller.intake_actions(&PlayerAction {
            move_forward: true,
            ..PlayerAction::default()
        });
        assert!(controller.has_updates());

        controller.apply(&mut camera, Duration::from_millis(500));
        assert!(approx(camera.position(), Point3::new(0.0, 0.0, -20.0)));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut controller = CameraController::new(TRANSLATION_SPEED, ROTATION_SPEED);
        controller.intake_actions(&PlayerAction {
            move_left: true,
            move_right: true,
            turn_y_negative: true,
            turn_y_positive: true,
            ..PlayerAction::default()
        });
        assert!(!controller.has_updates());
    }

    #[test]
    fn test_strafe_and_lift_directions() {
        let mut camera = Camera {
            view: Matrix4::identity(),
        };
        let mut controller = CameraController::new(TRANSLATION_SPEED, ROTATION_SPEED);
        controller.intake_actions(&PlayerAction {
            move_right: true,
            move_up: true,
            ..PlayerAction::default()
        });
        controller.apply(&mut camera, Duration::from_millis(100));
        assert!(approx(camera.position(), Point3::new(4.0, 4.0, 0.0)));
    }

    #[test]
    fn test_rotation_keeps_position() {
        let mut camera = Camera::looking_at(Point3::new(10.0, 5.0, 3.0), Point3::new(0.0, 0.0, 0.0));
        let mut controller = CameraController::new(TRANSLATION_SPEED, ROTATION_SPEED);
        controller.intake_actions(&PlayerAction {
            turn_x_negative: true,
            turn_z_positive: true,
            ..PlayerAction::default()
        });
        controller.apply(&mut camera, Duration::from_millis(250));
        assert!(approx(camera.position(), Point3::new(10.0, 5.0, 3.0)));
    }
}

//! # Engine State Module
//!
//! Everything the running viewer owns, plus the displayer library it is built around.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container of the viewer
//! * `displayer` - The block mesh cache: grid, store, update scheduler and `Displayer`
//! * `buffer_state` - GPU-resident block geometry (`WgpuMeshBackend`)
//! * `camera_state` - Free camera and its keyboard controller
//! * `rendering` - Surface, pipeline and meshing
//! * `voxels` - Regions, voxels and the dense voxel map
//! * `config` / `error` - Serde configuration and thiserror error types
//!
//! ## Architecture
//!
//! The volume is created before the event loop starts and outlives the engine state, which
//! borrows it. Edits go through the volume's interior mutability and are followed by a
//! `Displayer::update` over the edited region, so the next frame shows them.

use cgmath::{Deg, Point3};
use log::{error, info};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::keyboard::KeyCode;

use crate::application_state::input_state::ProcessedInputState;

use buffer_state::WgpuMeshBackend;
use camera_state::{camera, CameraState};
use config::ViewerConfig;
use displayer::Displayer;
use error::ViewerError;
use rendering::{meshing::CubicMesher, BindGroupState, RenderManager};
use voxels::{
    region::Region,
    volume::{VoxelMap, VoxelVolume},
    voxel::{Material, Voxel},
};

pub mod buffer_state;
pub mod camera_state;
pub mod config;
pub mod displayer;
pub mod error;
pub mod rendering;
pub mod voxels;

/// Vertical field of view of the viewer camera.
const FIELD_OF_VIEW_DEGREES: f32 = 60.0;
/// Near clipping plane distance.
const Z_NEAR: f32 = 0.1;
/// Far clipping plane distance.
const Z_FAR: f32 = 2000.0;

/// The displayer type the viewer runs.
pub type MapDisplayer<'v> = Displayer<'v, VoxelMap, CubicMesher, WgpuMeshBackend>;

/// The main state container for the viewer.
///
/// Holds the borrowed volume, its displayer, the camera and the render manager, and turns
/// player input into camera motion and volume edits.
pub struct EngineState<'v> {
    /// The displayed volume
    volume: &'v VoxelMap,
    /// Block mesh cache over `volume`
    pub displayer: MapDisplayer<'v>,
    /// Camera state managing the view and its movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// Manager for surface and pipeline
    pub render_manager: RenderManager,
    /// Radius of edit spheres
    edit_radius: i32,
}

impl<'v> EngineState<'v> {
    /// Creates the engine state and meshes the whole volume once.
    ///
    /// # Errors
    /// `ViewerError::Shader` when a configured shader cannot be read, `ViewerError::Display`
    /// when the displayer rejects the configuration or its first update fails.
    pub fn new(
        volume: &'v VoxelMap,
        config: &ViewerConfig,
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
    ) -> Result<Self, ViewerError> {
        let camera_projection = camera::Projection::new(
            surface_config.width,
            surface_config.height,
            Deg(FIELD_OF_VIEW_DEGREES),
            Z_NEAR,
            Z_FAR,
        );
        let camera_state = CameraState::new(&device, volume.extent(), &camera_projection);

        let backend = WgpuMeshBackend::new(device.clone(), None);
        let bind_group_state = BindGroupState::new(&device, &camera_state.camera_buffer, &backend);
        let shader = rendering::load_shader(config)?;

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            device,
            queue,
            bind_group_state,
            &shader,
            camera_projection,
        );

        let mut displayer = Displayer::with_config(volume, &config.displayer, CubicMesher, backend)?;
        let report = displayer.update_all()?;
        info!(
            "Initial mesh of {} solid voxels: {} blocks meshed, {} vertices",
            volume.solid_count(),
            report.blocks_meshed,
            report.vertices_uploaded
        );

        Ok(Self {
            volume,
            displayer,
            camera_state,
            player_actions: PlayerAction::default(),
            render_manager,
            edit_radius: config.edit_radius,
        })
    }

    /// Resizes the rendering surface when the window size changes
    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.render_manager.resize_surface(size);
        self.camera_state.refresh(
            &self.render_manager.queue,
            &self.render_manager.camera_projection,
        );
    }

    /// Renders the current frame
    pub fn render(&mut self) {
        self.render_manager.render(&self.displayer);
    }

    /// Moves the camera and applies edits requested since the last frame.
    pub fn process_input(&mut self, wait_duration: web_time::Duration) {
        self.camera_state.intake_actions(&self.player_actions);
        self.camera_state.update(
            &self.render_manager.queue,
            wait_duration,
            &self.render_manager.camera_projection,
        );

        if self.player_actions.carve_sphere {
            self.edit_sphere(Voxel::EMPTY);
        }
        if self.player_actions.add_sphere {
            self.edit_sphere(Voxel::new(Material::random_solid()));
        }
    }

    /// Fills a sphere at a random position with `voxel` and updates the blocks it touched.
    fn edit_sphere(&mut self, voxel: Voxel) {
        let center = random_point(self.volume.full_region());
        let touched = self.volume.fill_sphere(center, self.edit_radius, voxel);
        let region = self.volume.full_region().intersection(&touched.grown(1));

        match self.displayer.update(&region) {
            Ok(report) => info!(
                "Sphere of {:?} at {:?}: {} blocks touched, {} meshed, {} cleared",
                voxel.material(),
                center,
                report.blocks_touched,
                report.blocks_meshed,
                report.blocks_cleared
            ),
            Err(e) => error!("Update after edit at {:?} failed: {}", center, e),
        }
    }

    /// Sets the input commands for the engine state.
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = PlayerAction::from_input(&input);
    }
}

/// A uniformly chosen point of a non-empty `region`, or its minimum corner when empty.
fn random_point(region: Region) -> Point3<i32> {
    if region.is_empty() {
        return region.min;
    }
    Point3::new(
        fastrand::i32(region.min.x..region.max.x),
        fastrand::i32(region.min.y..region.max.y),
        fastrand::i32(region.min.z..region.max.z),
    )
}

/// Represents player actions derived from input
///
/// Movement and rotation flags are true while their key is held; edit flags only on the
/// frame their key goes down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerAction {
    /// W
    pub move_forward: bool,
    /// S
    pub move_backward: bool,
    /// A
    pub move_left: bool,
    /// D
    pub move_right: bool,
    /// E
    pub move_up: bool,
    /// Q
    pub move_down: bool,

    /// K
    pub turn_x_positive: bool,
    /// I
    pub turn_x_negative: bool,
    /// L
    pub turn_y_positive: bool,
    /// J
    pub turn_y_negative: bool,
    /// O
    pub turn_z_positive: bool,
    /// U
    pub turn_z_negative: bool,

    /// Space: carve a sphere out of the volume
    pub carve_sphere: bool,
    /// B: add a sphere of random material
    pub add_sphere: bool,
}

impl PlayerAction {
    /// Translates the processed input state into player actions.
    pub fn from_input(input: &ProcessedInputState) -> Self {
        let held = |key| input.get_key_state(key).is_active();
        let pressed = |key| input.get_key_state(key).is_just_pressed();

        Self {
            move_forward: held(KeyCode::KeyW),
            move_backward: held(KeyCode::KeyS),
            move_left: held(KeyCode::KeyA),
            move_right: held(KeyCode::KeyD),
            move_up: held(KeyCode::KeyE),
            move_down: held(KeyCode::KeyQ),

            turn_x_positive: held(KeyCode::KeyK),
            turn_x_negative: held(KeyCode::KeyI),
            turn_y_positive: held(KeyCode::KeyL),
            turn_y_negative: held(KeyCode::KeyJ),
            turn_z_positive: held(KeyCode::KeyO),
            turn_z_negative: held(KeyCode::KeyU),

            carve_sphere: pressed(KeyCode::Space),
            add_sphere: pressed(KeyCode::KeyB),
        }
    }
}

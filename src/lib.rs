#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Map Displayer
//!
//! Renders a dense voxel volume through a cache of per-block meshes, regenerating only the
//! blocks an edit touches.
//!
//! The volume is partitioned into cubic blocks of `buffer_size` voxels per axis. Each block
//! owns at most one mesh. `Displayer::update(region)` remeshes every block the region touches
//! and `Displayer::display(drawer)` hands every non-empty block mesh to a drawer.
//!
//! ## Key Modules
//!
//! * `engine_state::displayer` - `BlockGrid`, `BlockMeshStore`, `UpdateScheduler`, `Displayer`
//! * `engine_state::voxels` - `Region`, `Voxel`, `VoxelVolume` and the dense `VoxelMap`
//! * `engine_state::rendering` - `Mesher`, `CubicMesher` and the wgpu pipeline
//! * `application_state` - the demo viewer's window and input handling
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Point3, Vector3};
//! use voxel_map_displayer::{
//!     BlockMesh, CpuMesh, CpuMeshBackend, CubicMesher, Displayer, Material, Voxel, VoxelMap,
//!     VoxelVolume,
//! };
//!
//! let map = VoxelMap::new(Vector3::new(32, 32, 32));
//! let mut displayer = Displayer::new(&map, 16, CubicMesher, CpuMeshBackend::new()).unwrap();
//!
//! let edited = map.fill_sphere(Point3::new(16, 16, 16), 3, Voxel::new(Material::STONE));
//! let region = map.full_region().intersection(&edited.grown(1));
//! let report = displayer.update(&region).unwrap();
//! assert_eq!(report.blocks_touched, 8);
//!
//! let mut drawn = 0;
//! displayer.display(&mut |_: &BlockMesh<CpuMesh>| drawn += 1);
//! assert_eq!(drawn, 8);
//! ```
//!
//! The viewer binary runs the same displayer on a wgpu device:
//!
//! ```no_run
//! fn main() {
//!     if let Err(e) = voxel_map_displayer::run() {
//!         eprintln!("{e}");
//!     }
//! }
//! ```

use application_state::{graphics_resources_builder::Graphics, ApplicationState};
use log::info;
use winit::event_loop::EventLoop;

mod application_state;
mod engine_state;

pub use engine_state::{
    buffer_state::{BufferAnalytics, GpuBlockMesh, WgpuMeshBackend},
    config::{DisplayerConfig, ViewerConfig, CONFIG_ENV_VAR},
    displayer::{
        BlockDrawer, BlockGrid, BlockIndex, BlockMesh, BlockMeshStore, BlockRange, CpuMesh,
        CpuMeshBackend, Displayer, MeshBackend, UpdateReport, UpdateScheduler,
    },
    error::{ConfigError, DisplayError, MeshingError, ViewerError},
    rendering::{
        meshing::{CubicMesher, MeshData, Mesher, VoxelFace},
        Vertex,
    },
    voxels::{
        region::Region,
        volume::{VoxelMap, VoxelVolume},
        voxel::{Material, Voxel},
    },
};

/// Runs the demo viewer until its window closes.
///
/// Initialises `env_logger` from `RUST_LOG`, loads the configuration named by
/// `VOXEL_MAP_CONFIG`, generates a terrain volume and shows it.
///
/// # Errors
/// Any failure setting up the window, the GPU or the displayer.
pub fn run() -> Result<(), ViewerError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = ViewerConfig::load_from_env();
    let volume = VoxelMap::terrain(config.extent(), config.terrain_seed);
    info!(
        "Generated {:?} terrain with seed {}: {} solid voxels",
        config.volume_extent,
        config.terrain_seed,
        volume.solid_count()
    );

    let event_loop = EventLoop::<Graphics>::with_user_event().build()?;
    let mut state = ApplicationState::new(&volume, config, event_loop.create_proxy());
    event_loop.run_app(&mut state)?;

    state.into_result()
}

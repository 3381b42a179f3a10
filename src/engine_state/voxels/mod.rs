//! # Voxel Data
//!
//! The data the displayer renders: voxels, the volumes holding them and the regions used to
//! address parts of a volume.
//!
//! ## Architecture
//!
//! * **Voxel**: a compact material id with derived occupancy and colour
//! * **Region**: half-open integer boxes used for edits and update requests
//! * **Volume**: the read-only `VoxelVolume` interface plus the editable `VoxelMap`
//!
//! ## Data Flow
//!
//! 1. The application edits a `VoxelMap` and gets back the region that changed
//! 2. The region (grown by one voxel) is handed to `Displayer::update`
//! 3. The displayer re-reads the affected blocks through `VoxelVolume`

pub mod region;
pub mod volume;
pub mod voxel;

//! # Voxel Map Viewer Entry Point
//!
//! Calls into the library's `run()` function, which opens a window on a generated terrain.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info VOXEL_MAP_CONFIG=viewer.json cargo run --release
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_map_displayer::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Viewer stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}

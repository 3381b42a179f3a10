//! # Configuration
//!
//! Serde-backed settings for the displayer and the viewer around it.
//!
//! The viewer reads a JSON file named by the `VOXEL_MAP_CONFIG` environment variable. Every
//! field has a default, so a file only needs the keys it changes:
//!
//! ```json
//! { "volume_extent": [256, 64, 256], "displayer": { "buffer_size": 32 } }
//! ```

use std::{env, fs, path::Path};

use cgmath::Vector3;
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Environment variable naming the viewer's configuration file.
pub const CONFIG_ENV_VAR: &str = "VOXEL_MAP_CONFIG";

/// Settings of the block mesh cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayerConfig {
    /// Edge length of a block in voxels
    pub buffer_size: u32,
    /// Maximum bytes of block geometry held on the GPU, unlimited when absent
    pub gpu_memory_budget: Option<u64>,
}

impl Default for DisplayerConfig {
    fn default() -> Self {
        Self {
            buffer_size: 16,
            gpu_memory_budget: None,
        }
    }
}

/// Settings of the demo viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Size of the generated volume per axis
    pub volume_extent: [i32; 3],
    /// Seed of the terrain noise
    pub terrain_seed: u32,
    /// Radius of the spheres carved or added by edit keys
    pub edit_radius: i32,
    /// Path of a WGSL shader replacing the built-in one
    pub shader_path: Option<String>,
    /// Block mesh cache settings
    pub displayer: DisplayerConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            volume_extent: [128, 64, 128],
            terrain_seed: 1,
            edit_radius: 5,
            shader_path: None,
            displayer: DisplayerConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Loads the file named by `VOXEL_MAP_CONFIG`.
    ///
    /// Falls back to defaults when the variable is unset, and logs then falls back when the
    /// file cannot be read or parsed.
    pub fn load_from_env() -> Self {
        let Ok(path) = env::var(CONFIG_ENV_VAR) else {
            info!("{} not set, using default configuration", CONFIG_ENV_VAR);
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to load configuration from {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// The volume extent as a vector.
    pub fn extent(&self) -> Vector3<i32> {
        Vector3::from(self.volume_extent)
    }
}

//! # Error Module
//!
//! Error types surfaced by the block mesh cache.
//!
//! Three failure classes exist:
//! * `ContractViolation` - a caller handed in a region, coordinate or block index that does not
//!   fit the volume/grid. This is a programming error; nothing is modified.
//! * `ResourceExhaustion` - a GPU allocation failed or the configured memory budget would be
//!   exceeded. The block keeps the geometry it had before the failed upload.
//! * `Meshing` - the meshing function failed or produced malformed geometry. Again the block
//!   keeps its previous geometry.
//!
//! Configuration loading and viewer startup have their own enums, `ConfigError` and
//! `ViewerError`.

use thiserror::Error;

use super::displayer::BlockIndex;

/// Errors produced by the meshing function.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshingError {
    /// An index references a vertex past the end of the vertex list
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index value
        index: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// The index list does not describe whole triangles
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// Any other failure reported by a meshing implementation
    #[error("meshing failed: {0}")]
    Failed(String),
}

/// Main error type for the displayer.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Coordinate, region or block index outside the volume/grid
    #[error("contract violation: {reason}")]
    ContractViolation {
        /// What was out of range
        reason: String,
    },

    /// GPU allocation failed or the memory budget would be exceeded
    #[error("resource exhaustion while uploading block {block:?} ({requested_bytes} bytes): {reason}")]
    ResourceExhaustion {
        /// Block whose upload failed
        block: BlockIndex,
        /// Bytes the upload needed
        requested_bytes: u64,
        /// Backend-specific description
        reason: String,
    },

    /// The meshing function failed for a block
    #[error("meshing block {block:?}: {source}")]
    Meshing {
        /// Block being regenerated
        block: BlockIndex,
        /// Underlying meshing failure
        #[source]
        source: MeshingError,
    },
}

impl DisplayError {
    /// Shorthand for building a `ContractViolation`.
    pub fn contract(reason: impl Into<String>) -> Self {
        DisplayError::ContractViolation {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller rather than by resources or meshing.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, DisplayError::ContractViolation { .. })
    }
}

/// Errors raised while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for the expected shape
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that stop the viewer from starting or keep it from running.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The window could not be created
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop failed to start or exited with an error
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The event loop closed before the graphics resources reached it
    #[error("event loop closed before graphics were ready")]
    EventLoopClosed,

    /// No surface could be created for the window
    #[error("surface creation failed: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface
    #[error("no suitable GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device
    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// The surface reports no usable texture format
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    /// The configured shader file could not be read
    #[error("failed to read shader {path}: {source}")]
    Shader {
        /// Path from the configuration
        path: String,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The displayer rejected its configuration or failed its first update
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/*!
Error types for the Pixoo core engine.
*/

use thiserror::Error;

/// Result type used throughout the Pixoo core.
pub type Result<T> = std::result::Result<T, PixooError>;

/// Errors that can occur while painting, rendering or archiving grids.
#[derive(Error, Debug)]
pub enum PixooError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raster encoding/decoding errors
    #[error("Image error: {0}")]
    Image(String),

    /// Storage adapter errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid persisted or imported data
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A paint coordinate outside the grid
    #[error("Cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },

    /// A grid that is not exactly GRID_SIZE x GRID_SIZE
    #[error("Grid must be 64x64, got {rows} rows x {cols} columns")]
    DimensionMismatch { rows: usize, cols: usize },

    /// No snapshot with the requested id
    #[error("Snapshot not found: {0}")]
    NotFound(String),

    /// Integrity check failures
    #[error("Integrity check failed: expected hash {expected}, got {actual}")]
    IntegrityCheckFailed { expected: String, actual: String },
}

impl PixooError {
    /// Create a new image error
    pub fn image<S: Into<String>>(msg: S) -> Self {
        Self::Image(msg.into())
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new invalid format error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

impl From<image::ImageError> for PixooError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}

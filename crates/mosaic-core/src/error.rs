//! Error types for the layout pipeline

use thiserror::Error;

/// Errors that abort a layout run.
///
/// Any of these means no layout is published; the caller shows a failure
/// state instead of an empty or partial arrangement.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Embedding buffer length is not a whole number of vectors
    #[error("malformed embedding buffer: {len} bytes is not a multiple of {dims} * 4")]
    MalformedInput { len: usize, dims: usize },

    /// The reduction backend could not produce a usable projection
    #[error("reduction failed: {0}")]
    Reduction(String),

    /// More grid cells than normalized points
    #[error("grid needs {cells} points but only {points} are available")]
    InsufficientPoints { cells: usize, points: usize },

    /// Parameter validation error
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Photo metadata does not line up with the embeddings
    #[error("photo catalog error: {0}")]
    Catalog(String),

    /// The run was abandoned through its cancellation token
    #[error("layout run cancelled")]
    Cancelled,

    /// IO error (for file operations)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

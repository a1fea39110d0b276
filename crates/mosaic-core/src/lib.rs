//! Mosaic layout engine
//!
//! Turns a batch of image embeddings into screen positions: decode the raw
//! embeddings file, reduce the vectors to 2D or 3D through a pluggable
//! [`DimensionReducer`], then either center the points for a pannable
//! scatter view or snap them onto a fixed grid, one image per cell.
//!
//! # Example
//!
//! ```rust
//! use mosaic_core::{grid, GridSpec};
//!
//! let points = [[10.0, 10.0], [0.0, 10.0], [10.0, 0.0], [0.0, 0.0]];
//! let cells = grid::assign(&points, &GridSpec::new(2, 2, 10.0)).unwrap();
//! let order: Vec<usize> = cells.iter().map(|c| c.index).collect();
//! assert_eq!(order, vec![3, 2, 1, 0]);
//! ```

pub mod catalog;
pub mod config;
pub mod decode;
pub mod error;
pub mod grid;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod reduce;
pub mod store;
pub mod types;

// Re-export main types at crate root
pub use catalog::{PhotoCatalog, PhotoRecord};
pub use config::{Canvas, LayoutConfig, LayoutMode, ReductionParams};
pub use decode::{decode, decode_file};
pub use error::{LayoutError, Result};
pub use grid::{GridCell, GridSpec};
pub use layout::{GridLayout, LayoutResult, ScatterLayout};
pub use pipeline::{spawn_layout, CancellationToken, LayoutPipeline};
pub use reduce::{DimensionReducer, PcaReducer, PrecomputedReducer, ReductionAdapter};
pub use store::LayoutStore;
pub use types::{EmbeddingBatch, Projection};

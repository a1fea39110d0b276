//! Layout configuration types

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::grid::GridSpec;

/// Items laid out in scatter mode when no explicit count is given.
pub const DEFAULT_SCATTER_IMAGES: usize = 2000;

/// Parameters handed to the reduction backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionParams {
    /// Output dimensions (2 or 3)
    pub n_components: usize,
    /// Neighborhood size for graph-based reducers
    pub n_neighbors: usize,
    /// Minimum embedded distance, in [0, 1]
    pub min_dist: f32,
}

impl Default for ReductionParams {
    fn default() -> Self {
        Self {
            n_components: 2,
            n_neighbors: 15,
            min_dist: 0.1,
        }
    }
}

impl ReductionParams {
    pub fn validate(&self) -> Result<()> {
        if !(2..=3).contains(&self.n_components) {
            return Err(LayoutError::InvalidConfig(format!(
                "n_components must be 2 or 3, got {}",
                self.n_components
            )));
        }
        if self.n_neighbors == 0 {
            return Err(LayoutError::InvalidConfig(
                "n_neighbors must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_dist) {
            return Err(LayoutError::InvalidConfig(format!(
                "min_dist must be in [0, 1], got {}",
                self.min_dist
            )));
        }
        Ok(())
    }
}

/// Target pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 1024.0,
        }
    }
}

/// How reduced points are arranged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutMode {
    /// Free points centered on the origin
    #[default]
    Scatter,
    /// Points snapped onto a rows x cols grid
    Grid {
        rows: usize,
        cols: usize,
        /// Cell edge in pixels; defaults to `canvas.width / cols`
        #[serde(default)]
        cell_size: Option<f32>,
    },
}

/// Full configuration for one layout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Floats per embedding vector
    pub embedding_dims: usize,
    /// Only the first N embeddings are reduced
    pub total_images: Option<usize>,
    pub reduction: ReductionParams,
    pub canvas: Canvas,
    pub mode: LayoutMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            embedding_dims: 512,
            total_images: None,
            reduction: ReductionParams::default(),
            canvas: Canvas::default(),
            mode: LayoutMode::Scatter,
        }
    }
}

impl LayoutConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Grid configuration with the cell size derived from the canvas width.
    pub fn grid(rows: usize, cols: usize) -> Self {
        Self {
            mode: LayoutMode::Grid {
                rows,
                cols,
                cell_size: None,
            },
            ..Self::default()
        }
    }

    /// Number of leading embeddings handed to the reducer.
    pub fn effective_total(&self) -> usize {
        match (&self.mode, self.total_images) {
            (_, Some(n)) => n,
            (LayoutMode::Scatter, None) => DEFAULT_SCATTER_IMAGES,
            (LayoutMode::Grid { rows, cols, .. }, None) => rows.saturating_mul(*cols),
        }
    }

    /// Grid geometry, or `None` in scatter mode.
    pub fn grid_spec(&self) -> Option<GridSpec> {
        match self.mode {
            LayoutMode::Scatter => None,
            LayoutMode::Grid {
                rows,
                cols,
                cell_size,
            } => Some(GridSpec {
                rows,
                cols,
                cell_size: cell_size.unwrap_or(self.canvas.width / cols.max(1) as f32),
            }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_dims == 0 {
            return Err(LayoutError::InvalidConfig(
                "embedding_dims must be positive".to_string(),
            ));
        }
        if self.total_images == Some(0) {
            return Err(LayoutError::InvalidConfig(
                "total_images must be positive".to_string(),
            ));
        }
        self.reduction.validate()?;

        if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "canvas must have positive size, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }

        if let Some(spec) = self.grid_spec() {
            spec.validate()?;
            if self.reduction.n_components != 2 {
                return Err(LayoutError::InvalidConfig(format!(
                    "grid layout needs 2 components, got {}",
                    self.reduction.n_components
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_scatter_sketch() {
        let config = LayoutConfig::default();
        assert_eq!(config.embedding_dims, 512);
        assert_eq!(config.effective_total(), 2000);
        assert_eq!(config.reduction, ReductionParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn grid_defaults_derive_from_canvas() {
        let config = LayoutConfig::grid(24, 24);
        assert_eq!(config.effective_total(), 576);
        let spec = config.grid_spec().unwrap();
        assert_eq!(spec.cell_size, 1024.0 / 24.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_json() {
        let config: LayoutConfig = serde_json::from_str(
            r#"{
                "embedding_dims": 4,
                "reduction": { "n_components": 3 },
                "mode": { "kind": "grid", "rows": 2, "cols": 3, "cell_size": 10.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.embedding_dims, 4);
        assert_eq!(config.reduction.n_components, 3);
        assert_eq!(config.reduction.n_neighbors, 15);
        assert_eq!(
            config.mode,
            LayoutMode::Grid {
                rows: 2,
                cols: 3,
                cell_size: Some(10.0)
            }
        );
        // 3D grid is rejected
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_bad_reduction_params() {
        let mut params = ReductionParams::default();
        params.n_components = 4;
        assert!(params.validate().is_err());

        let mut params = ReductionParams::default();
        params.n_neighbors = 0;
        assert!(params.validate().is_err());

        let mut params = ReductionParams::default();
        params.min_dist = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_empty_grid() {
        let config = LayoutConfig::grid(0, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, r#"{ "total_images": 16 }"#).unwrap();
        let config = LayoutConfig::from_json_file(&path).unwrap();
        assert_eq!(config.effective_total(), 16);
        assert_eq!(config.mode, LayoutMode::Scatter);
    }
}

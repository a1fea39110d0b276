//! Render-facing layout results

use serde::Serialize;

use crate::grid::{GridCell, GridSpec};
use crate::types::Projection;

/// Slider range and default for the scatter scale factor.
pub const SCATTER_SCALE_MIN: f32 = 1.0;
pub const SCATTER_SCALE_MAX: f32 = 1000.0;
pub const SCATTER_SCALE_DEFAULT: f32 = 100.0;

/// Finished layout for one run. Rebuilt wholesale when inputs change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LayoutResult {
    Scatter(ScatterLayout),
    Grid(GridLayout),
}

impl LayoutResult {
    /// Number of items placed.
    pub fn len(&self) -> usize {
        match self {
            LayoutResult::Scatter(s) => s.len(),
            LayoutResult::Grid(g) => g.cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scatter(&self) -> Option<&ScatterLayout> {
        match self {
            LayoutResult::Scatter(s) => Some(s),
            LayoutResult::Grid(_) => None,
        }
    }

    pub fn as_grid(&self) -> Option<&GridLayout> {
        match self {
            LayoutResult::Grid(g) => Some(g),
            LayoutResult::Scatter(_) => None,
        }
    }
}

/// Centered positions, item `i` at `positions.point(i)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterLayout {
    pub positions: Projection,
}

impl ScatterLayout {
    pub fn new(positions: Projection) -> Self {
        Self { positions }
    }

    pub fn dims(&self) -> usize {
        self.positions.dims()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of item `index` multiplied by the render scale factor,
    /// clamped to the slider range. A non-finite factor falls back to
    /// [`SCATTER_SCALE_DEFAULT`].
    pub fn scaled(&self, index: usize, factor: f32) -> Option<Vec<f32>> {
        let factor = if factor.is_finite() {
            factor.clamp(SCATTER_SCALE_MIN, SCATTER_SCALE_MAX)
        } else {
            SCATTER_SCALE_DEFAULT
        };
        self.positions
            .point(index)
            .map(|p| p.iter().map(|c| c * factor).collect())
    }
}

/// Cells in row-major order, each holding one distinct item index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub spec: GridSpec,
    pub cells: Vec<GridCell>,
}

impl GridLayout {
    pub fn new(spec: GridSpec, cells: Vec<GridCell>) -> Self {
        Self { spec, cells }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        if row >= self.spec.rows || col >= self.spec.cols {
            return None;
        }
        self.cells.get(row * self.spec.cols + col)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Item indices in cell order.
    pub fn item_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().map(|c| c.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;

    #[test]
    fn scaled_scatter_position() {
        let layout = ScatterLayout::new(Projection::from_points(&[[0.5, -0.25], [1.0, 2.0]]));
        assert_eq!(layout.scaled(0, SCATTER_SCALE_DEFAULT), Some(vec![50.0, -25.0]));
        assert_eq!(layout.scaled(2, 1.0), None);
        assert_eq!(layout.scaled(1, 0.0), Some(vec![1.0, 2.0]));
        assert_eq!(layout.scaled(1, 5000.0), Some(vec![1000.0, 2000.0]));
    }

    #[test]
    fn non_finite_scale_uses_default() {
        let layout = ScatterLayout::new(Projection::from_points(&[[0.5, -0.25], [1.0, 2.0]]));
        assert_eq!(layout.scaled(1, f32::NAN), Some(vec![100.0, 200.0]));
        assert_eq!(layout.scaled(1, f32::INFINITY), Some(vec![100.0, 200.0]));
    }

    #[test]
    fn grid_cell_lookup() {
        let spec = GridSpec::new(2, 3, 10.0);
        let points = [[0.0, 0.0]; 6];
        let layout = GridLayout::new(spec, grid::assign(&points, &spec).unwrap());
        let cell = layout.cell(1, 2).unwrap();
        assert_eq!((cell.row, cell.col), (1, 2));
        assert_eq!((cell.x, cell.y), (20.0, 10.0));
        assert!(layout.cell(2, 0).is_none());
        assert!(layout.cell(0, 3).is_none());
    }

    #[test]
    fn serializes_with_mode_tag() {
        let result = LayoutResult::Scatter(ScatterLayout::new(Projection::from_points(&[[1.0, 2.0]])));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["mode"], "scatter");
        assert_eq!(json["positions"]["dims"], 2);
        assert_eq!(result.len(), 1);
        assert!(result.as_grid().is_none());
    }
}

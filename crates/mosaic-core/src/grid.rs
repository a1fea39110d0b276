//! Greedy grid assignment
//!
//! Snaps scattered 2D points onto a regular grid. Cells are visited in
//! row-major order and each takes the nearest point nobody has claimed yet.
//! This is a greedy approximation of the assignment problem, not an optimal
//! matching: a cell never gives its point back, even when a later cell would
//! have been a closer fit.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LayoutError, Result};

/// Grid geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f32,
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize, cell_size: f32) -> Self {
        Self {
            rows,
            cols,
            cell_size,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Top-left pixel anchor of cell (row, col).
    pub fn anchor(&self, row: usize, col: usize) -> [f32; 2] {
        [col as f32 * self.cell_size, row as f32 * self.cell_size]
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "grid must have at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(LayoutError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }
}

/// One grid cell and the item placed in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    /// Pixel anchor, `(col * cell_size, row * cell_size)`
    pub x: f32,
    pub y: f32,
    /// Index of the assigned point
    pub index: usize,
}

/// Indices of points not yet claimed by a cell, kept in ascending order.
///
/// Claimed indices are removed outright, so each scan only touches the points
/// still available.
#[derive(Debug, Clone)]
struct Unclaimed {
    indices: Vec<usize>,
}

impl Unclaimed {
    fn new(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
        }
    }

    /// Position (within `indices`) of the point nearest to `anchor`.
    ///
    /// Strict `<` keeps the first hit on ties, which is the lowest index, and
    /// never picks a NaN distance. If no remaining point has a finite distance
    /// the lowest unclaimed index is taken.
    fn nearest(&self, points: &[[f32; 2]], anchor: [f32; 2]) -> Option<usize> {
        if self.indices.is_empty() {
            return None;
        }
        let mut best_pos = 0;
        let mut best_d2 = f32::INFINITY;
        for (pos, &i) in self.indices.iter().enumerate() {
            let [px, py] = points[i];
            let dx = px - anchor[0];
            let dy = py - anchor[1];
            let d2 = dx * dx + dy * dy;
            if d2 < best_d2 {
                best_pos = pos;
                best_d2 = d2;
            }
        }
        Some(best_pos)
    }

    fn claim(&mut self, pos: usize) -> usize {
        self.indices.remove(pos)
    }
}

/// Assign every cell of `spec` exactly one distinct point.
///
/// Fails with [`LayoutError::InsufficientPoints`] before touching any cell if
/// the grid has more cells than there are points. Identical inputs always give
/// identical assignments.
pub fn assign(points: &[[f32; 2]], spec: &GridSpec) -> Result<Vec<GridCell>> {
    spec.validate()?;

    let cells = spec.cell_count();
    if cells > points.len() {
        return Err(LayoutError::InsufficientPoints {
            cells,
            points: points.len(),
        });
    }

    let mut unclaimed = Unclaimed::new(points.len());
    let mut assigned = Vec::with_capacity(cells);

    for row in 0..spec.rows {
        for col in 0..spec.cols {
            let anchor = spec.anchor(row, col);
            let pos = unclaimed.nearest(points, anchor).ok_or(
                LayoutError::InsufficientPoints {
                    cells,
                    points: points.len(),
                },
            )?;
            let index = unclaimed.claim(pos);
            assigned.push(GridCell {
                row,
                col,
                x: anchor[0],
                y: anchor[1],
                index,
            });
        }
    }

    debug!(
        "assigned {} cells from {} points ({} left over)",
        assigned.len(),
        points.len(),
        unclaimed.indices.len()
    );
    Ok(assigned)
}

//! Dimensionality reduction
//!
//! The reduction itself is a black box behind [`DimensionReducer`]; graph
//! based backends such as UMAP are usually stochastic, so callers must not
//! count on identical output across runs. [`ReductionAdapter`] owns the
//! caller-side policy: take a bounded prefix of the batch, refuse inputs the
//! neighbor graph cannot handle, and check that whatever comes back is a
//! usable projection.

use std::path::Path;
use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::{debug, error, info, warn};

use crate::config::ReductionParams;
use crate::error::{LayoutError, Result};
use crate::types::{EmbeddingBatch, Projection};

/// Contract for dimensionality reduction backends.
///
/// This trait exists so alternative backends (or deterministic stubs in
/// tests) can be swapped in.
pub trait DimensionReducer: Send {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Fit on `data` (`n_points` rows of `input_dims` floats) and return one
    /// `params.n_components`-tuple per row.
    fn fit_transform(
        &mut self,
        data: &[f32],
        n_points: usize,
        input_dims: usize,
        params: &ReductionParams,
    ) -> std::result::Result<Projection, String>;
}

impl<R: DimensionReducer + ?Sized> DimensionReducer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit_transform(
        &mut self,
        data: &[f32],
        n_points: usize,
        input_dims: usize,
        params: &ReductionParams,
    ) -> std::result::Result<Projection, String> {
        (**self).fit_transform(data, n_points, input_dims, params)
    }
}

/// Runs a reducer over the leading `total_images` embeddings.
pub struct ReductionAdapter<R> {
    reducer: R,
}

impl<R: DimensionReducer> ReductionAdapter<R> {
    pub fn new(reducer: R) -> Self {
        Self { reducer }
    }

    pub fn reducer_name(&self) -> &str {
        self.reducer.name()
    }

    /// Reduce the first `total_images` vectors of `batch`.
    ///
    /// The output is index-aligned with that prefix. Any failure, including a
    /// backend returning the wrong shape or non-finite coordinates, is a
    /// [`LayoutError::Reduction`].
    pub fn reduce(
        &mut self,
        batch: &EmbeddingBatch,
        total_images: usize,
        params: &ReductionParams,
    ) -> Result<Projection> {
        params.validate()?;

        if batch.len() > total_images {
            info!(
                "using first {} of {} embeddings",
                total_images,
                batch.len()
            );
        } else if batch.len() < total_images {
            warn!(
                "requested {} embeddings but only {} available",
                total_images,
                batch.len()
            );
        }

        let data = batch.head(total_images);
        let n_points = data.len() / batch.dims();

        if n_points <= params.n_neighbors {
            return Err(LayoutError::Reduction(format!(
                "need more than {} points for n_neighbors={}, got {}",
                params.n_neighbors, params.n_neighbors, n_points
            )));
        }

        let name = self.reducer.name().to_string();
        let start = Instant::now();

        let projection = self
            .reducer
            .fit_transform(data, n_points, batch.dims(), params)
            .map_err(|e| {
                error!("{} fit_transform failed: {}", name, e);
                LayoutError::Reduction(format!("{} fit_transform failed: {}", name, e))
            })?;

        check_projection(&projection, n_points, params.n_components)?;

        info!(
            "{} fit complete: {} points in {}ms",
            name,
            n_points,
            start.elapsed().as_millis()
        );
        Ok(projection)
    }
}

fn check_projection(projection: &Projection, n_points: usize, n_components: usize) -> Result<()> {
    if projection.len() != n_points {
        return Err(LayoutError::Reduction(format!(
            "reducer returned {} points for {} inputs",
            projection.len(),
            n_points
        )));
    }
    if projection.dims() != n_components {
        return Err(LayoutError::Reduction(format!(
            "reducer returned {} components, expected {}",
            projection.dims(),
            n_components
        )));
    }
    if let Some(pos) = projection.as_flat().iter().position(|v| !v.is_finite()) {
        return Err(LayoutError::Reduction(format!(
            "reducer returned a non-finite coordinate for point {}",
            pos / n_components
        )));
    }
    Ok(())
}

const PCA_MAX_ITERS: usize = 256;
const PCA_TOLERANCE: f32 = 1e-6;

/// Principal component projection.
///
/// Deterministic: fixed starting vectors, power iteration with Gram-Schmidt
/// deflation, and each axis signed so its largest component is positive.
/// `n_neighbors` and `min_dist` do not apply and are ignored.
#[derive(Debug, Default, Clone)]
pub struct PcaReducer {
    /// Principal axes from the last fit, one per output component
    axes: Vec<Array1<f32>>,
}

impl PcaReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        !self.axes.is_empty()
    }

    pub fn axes(&self) -> &[Array1<f32>] {
        &self.axes
    }
}

impl DimensionReducer for PcaReducer {
    fn name(&self) -> &str {
        "pca"
    }

    fn fit_transform(
        &mut self,
        data: &[f32],
        n_points: usize,
        input_dims: usize,
        params: &ReductionParams,
    ) -> std::result::Result<Projection, String> {
        if data.len() != n_points * input_dims {
            return Err(format!(
                "data length {} != n_points {} * dimensions {}",
                data.len(),
                n_points,
                input_dims
            ));
        }

        let x = ArrayView2::from_shape((n_points, input_dims), data).map_err(|e| e.to_string())?;
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| "no points to fit".to_string())?;
        let centered = &x - &mean;

        let k = params.n_components;
        let mut axes: Vec<Array1<f32>> = Vec::with_capacity(k);
        for a in 0..k {
            let axis = principal_axis(&centered, &axes, a);
            axes.push(axis);
        }

        let basis = Array2::from_shape_fn((input_dims, k), |(i, a)| axes[a][i]);
        let projected = centered.dot(&basis);
        self.axes = axes;

        Projection::new(k, projected.iter().copied().collect())
    }
}

/// Dominant direction of `centered` orthogonal to `found`.
fn principal_axis(centered: &Array2<f32>, found: &[Array1<f32>], seed: usize) -> Array1<f32> {
    let dims = centered.ncols();
    let mut v = Array1::from_shape_fn(dims, |i| {
        ((seed + i + 7) as f32 * 0.123).sin() + ((seed * i) as f32 * 0.456).cos()
    });
    deflate(&mut v, found);
    normalize(&mut v);

    for iter in 0..PCA_MAX_ITERS {
        let scores = centered.dot(&v);
        let mut next = centered.t().dot(&scores);
        deflate(&mut next, found);
        if !normalize(&mut next) {
            debug!("axis {} has no remaining variance", seed);
            break;
        }
        let delta: f32 = (&next - &v).mapv(f32::abs).sum();
        v = next;
        if delta < PCA_TOLERANCE {
            debug!("axis {} converged after {} iterations", seed, iter + 1);
            break;
        }
    }

    // Fix the sign so repeated fits agree
    let pivot = v
        .iter()
        .copied()
        .fold(0.0f32, |acc, c| if c.abs() > acc.abs() { c } else { acc });
    if pivot < 0.0 {
        v.mapv_inplace(|c| -c);
    }
    v
}

fn deflate(v: &mut Array1<f32>, found: &[Array1<f32>]) {
    for axis in found {
        let overlap = v.dot(axis);
        v.scaled_add(-overlap, axis);
    }
}

/// Scale to unit length; false if the vector is (numerically) zero.
fn normalize(v: &mut Array1<f32>) -> bool {
    let norm = v.dot(&*v).sqrt();
    if norm <= f32::EPSILON {
        return false;
    }
    v.mapv_inplace(|c| c / norm);
    true
}

/// Hands back coordinates computed elsewhere.
///
/// Useful for laying out the output of an external UMAP run, and as a
/// deterministic stand-in for a real reducer. The first `n_points` stored
/// tuples are returned for a fit over `n_points` rows.
#[derive(Debug, Clone)]
pub struct PrecomputedReducer {
    points: Projection,
}

impl PrecomputedReducer {
    pub fn new(points: Projection) -> Self {
        Self { points }
    }

    /// Load `[[x, y], ...]` or `[[x, y, z], ...]` from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let rows: Vec<Vec<f32>> = serde_json::from_slice(&bytes)?;
        Self::from_rows(rows)
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dims = rows.first().map_or(2, Vec::len);
        if let Some(i) = rows.iter().position(|r| r.len() != dims) {
            return Err(LayoutError::Reduction(format!(
                "precomputed point {} has {} components, expected {}",
                i,
                rows[i].len(),
                dims
            )));
        }
        let coords = rows.into_iter().flatten().collect();
        let points = Projection::new(dims, coords).map_err(LayoutError::Reduction)?;
        Ok(Self { points })
    }
}

impl DimensionReducer for PrecomputedReducer {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn fit_transform(
        &mut self,
        _data: &[f32],
        n_points: usize,
        _input_dims: usize,
        _params: &ReductionParams,
    ) -> std::result::Result<Projection, String> {
        if n_points > self.points.len() {
            return Err(format!(
                "only {} precomputed points for {} inputs",
                self.points.len(),
                n_points
            ));
        }
        let dims = self.points.dims();
        Projection::new(dims, self.points.as_flat()[..n_points * dims].to_vec())
    }
}

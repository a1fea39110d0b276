//! One-shot layout pipeline
//!
//! decode -> reduce -> normalize -> (grid assign) -> publish. Every stage
//! failure aborts the run and nothing is published.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::decode::decode;
use crate::error::{LayoutError, Result};
use crate::grid;
use crate::layout::{GridLayout, LayoutResult, ScatterLayout};
use crate::normalize;
use crate::reduce::{DimensionReducer, ReductionAdapter};
use crate::store::LayoutStore;
use crate::types::EmbeddingBatch;

/// A handle for abandoning a layout run.
///
/// Clones share the same flag, so one can be kept by the UI while the
/// pipeline polls another between stages.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(LayoutError::Cancelled);
        }
        Ok(())
    }
}

/// Configured pipeline bound to one reduction backend.
pub struct LayoutPipeline {
    config: LayoutConfig,
    adapter: ReductionAdapter<Box<dyn DimensionReducer>>,
}

impl LayoutPipeline {
    /// Validates `config` up front so a bad parameter never reaches the reducer.
    pub fn new(config: LayoutConfig, reducer: Box<dyn DimensionReducer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            adapter: ReductionAdapter::new(reducer),
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Decode a raw embeddings buffer and lay it out.
    pub fn run(&mut self, buffer: &[u8], cancel: &CancellationToken) -> Result<LayoutResult> {
        cancel.check()?;
        let batch = decode(buffer, self.config.embedding_dims)?;
        info!(
            "decoded {} embeddings of dimension {}",
            batch.len(),
            batch.dims()
        );
        self.run_batch(&batch, cancel)
    }

    /// Lay out an already decoded batch.
    pub fn run_batch(
        &mut self,
        batch: &EmbeddingBatch,
        cancel: &CancellationToken,
    ) -> Result<LayoutResult> {
        cancel.check()?;
        if batch.dims() != self.config.embedding_dims {
            return Err(LayoutError::InvalidConfig(format!(
                "batch has dimension {}, configured for {}",
                batch.dims(),
                self.config.embedding_dims
            )));
        }

        let total = self.config.effective_total();
        let grid_spec = self.config.grid_spec();

        // Fail before the slow reduction if the grid can never be filled
        if let Some(spec) = &grid_spec {
            let available = total.min(batch.len());
            if spec.cell_count() > available {
                return Err(LayoutError::InsufficientPoints {
                    cells: spec.cell_count(),
                    points: available,
                });
            }
        }

        let start = Instant::now();
        let reduced = self
            .adapter
            .reduce(batch, total, &self.config.reduction)?;
        cancel.check()?;

        let result = match grid_spec {
            None => {
                let centered = normalize::center(&reduced);
                LayoutResult::Scatter(ScatterLayout::new(centered))
            }
            Some(spec) => {
                let points = normalize::fit_rect(&reduced, self.config.canvas)?;
                cancel.check()?;
                debug!(
                    "snapping {} points onto {}x{} grid",
                    points.len(),
                    spec.rows,
                    spec.cols
                );
                let cells = grid::assign(&points, &spec)?;
                LayoutResult::Grid(GridLayout::new(spec, cells))
            }
        };
        cancel.check()?;

        info!(
            "layout complete: {} items via {} in {}ms",
            result.len(),
            self.adapter.reducer_name(),
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Run the pipeline on a blocking worker and publish the result into `store`.
///
/// The store is only touched after a complete, uncancelled run; the handle
/// resolves to the published generation.
pub fn spawn_layout(
    mut pipeline: LayoutPipeline,
    buffer: Vec<u8>,
    store: Arc<LayoutStore>,
    cancel: CancellationToken,
) -> JoinHandle<Result<u64>> {
    tokio::task::spawn_blocking(move || {
        let result = pipeline.run(&buffer, &cancel)?;
        cancel.check()?;
        Ok(store.publish(result))
    })
}

//! Published layout handoff
//!
//! One writer (the pipeline) and any number of readers (the render loop).
//! A result only becomes visible once it is complete, and it is swapped in
//! as a whole.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::layout::LayoutResult;

#[derive(Debug, Default)]
struct Published {
    generation: u64,
    result: Option<Arc<LayoutResult>>,
}

/// Holds the most recently published layout.
#[derive(Debug, Default)]
pub struct LayoutStore {
    state: RwLock<Published>,
}

impl LayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current layout, returning its generation number.
    pub fn publish(&self, result: LayoutResult) -> u64 {
        let items = result.len();
        let mut state = self.state.write();
        state.generation += 1;
        state.result = Some(Arc::new(result));
        info!(
            "published layout generation {} ({} items)",
            state.generation, items
        );
        state.generation
    }

    /// Current layout, if one has been published.
    pub fn latest(&self) -> Option<Arc<LayoutResult>> {
        self.state.read().result.clone()
    }

    /// Generation of the current layout; 0 before the first publish.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }
}

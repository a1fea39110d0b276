//! End-to-end layout runs with a fixed stand-in reducer

use std::collections::HashSet;
use std::sync::Arc;

use mosaic_core::decode::encode;
use mosaic_core::{
    spawn_layout, CancellationToken, LayoutConfig, LayoutError, LayoutPipeline, LayoutResult,
    LayoutStore, PcaReducer, PrecomputedReducer, Projection,
};
use pretty_assertions::assert_eq;

const DIMS: usize = 4;

/// 16 synthetic embeddings, D=4
fn embedding_bytes(n: usize) -> Vec<u8> {
    let values: Vec<f32> = (0..n * DIMS).map(|i| (i as f32 * 0.3).sin()).collect();
    encode(&values)
}

/// 16 known 2D points, a jittered 4x4 lattice listed in scrambled order
fn known_points() -> Projection {
    let mut points = Vec::new();
    for k in 0..16 {
        let slot = (k * 7) % 16;
        let (row, col) = (slot / 4, slot % 4);
        points.push([col as f32 * 3.0 + 0.1 * k as f32, row as f32 * 3.0]);
    }
    Projection::from_points(&points)
}

fn grid_config() -> LayoutConfig {
    let mut config = LayoutConfig::grid(4, 4);
    config.embedding_dims = DIMS;
    config.reduction.n_neighbors = 5;
    config
}

#[test]
fn test_grid_uses_every_point_once() {
    let reducer = PrecomputedReducer::new(known_points());
    let mut pipeline = LayoutPipeline::new(grid_config(), Box::new(reducer)).unwrap();

    let result = pipeline
        .run(&embedding_bytes(16), &CancellationToken::new())
        .unwrap();
    let grid = result.as_grid().expect("grid layout");

    assert_eq!(grid.cells().len(), 16);
    let used: HashSet<usize> = grid.item_indices().collect();
    assert_eq!(used, (0..16).collect::<HashSet<_>>());
}

#[test]
fn test_grid_lattice_maps_to_own_cells() {
    let reducer = PrecomputedReducer::new(known_points());
    let mut pipeline = LayoutPipeline::new(grid_config(), Box::new(reducer)).unwrap();
    let result = pipeline
        .run(&embedding_bytes(16), &CancellationToken::new())
        .unwrap();
    let grid = result.as_grid().unwrap();

    // Point k was generated for lattice slot (k * 7) % 16
    for k in 0..16 {
        let slot = (k * 7) % 16;
        let cell = grid.cell(slot / 4, slot % 4).unwrap();
        assert_eq!(cell.index, k, "slot {} should hold point {}", slot, k);
    }
}

#[test]
fn test_grid_is_reproducible() {
    let run = || {
        let reducer = PrecomputedReducer::new(known_points());
        let mut pipeline = LayoutPipeline::new(grid_config(), Box::new(reducer)).unwrap();
        pipeline
            .run(&embedding_bytes(16), &CancellationToken::new())
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_scatter_3d_centered() {
    let mut config = LayoutConfig::default();
    config.embedding_dims = DIMS;
    config.total_images = Some(20);
    config.reduction.n_components = 3;
    config.reduction.n_neighbors = 5;

    let mut pipeline = LayoutPipeline::new(config, Box::new(PcaReducer::new())).unwrap();
    let result = pipeline
        .run(&embedding_bytes(32), &CancellationToken::new())
        .unwrap();

    let LayoutResult::Scatter(scatter) = result else {
        panic!("expected scatter layout");
    };
    assert_eq!(scatter.len(), 20);
    assert_eq!(scatter.dims(), 3);

    for axis in 0..3 {
        let values: Vec<f32> = scatter.positions.iter().map(|p| p[axis]).collect();
        let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(((lo + hi) / 2.0).abs() < 1e-4, "axis {} not centered", axis);
    }
}

#[test]
fn test_reducer_failure_publishes_nothing() {
    let store = Arc::new(LayoutStore::new());
    // Only 8 precomputed points for 16 inputs
    let reducer = PrecomputedReducer::new(Projection::from_points(&[[0.0f32, 0.0]; 8]));
    let pipeline = LayoutPipeline::new(grid_config(), Box::new(reducer)).unwrap();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();
    let outcome = runtime
        .block_on(spawn_layout(
            pipeline,
            embedding_bytes(16),
            store.clone(),
            CancellationToken::new(),
        ))
        .unwrap();

    assert!(matches!(outcome, Err(LayoutError::Reduction(_))));
    assert!(store.latest().is_none());
    assert_eq!(store.generation(), 0);
}

#[tokio::test]
async fn test_background_run_publishes() {
    let store = Arc::new(LayoutStore::new());
    let reducer = PrecomputedReducer::new(known_points());
    let pipeline = LayoutPipeline::new(grid_config(), Box::new(reducer)).unwrap();

    let generation = spawn_layout(
        pipeline,
        embedding_bytes(16),
        store.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(generation, 1);
    let published = store.latest().unwrap();
    assert_eq!(published.len(), 16);
}

#[tokio::test]
async fn test_cancelled_run_publishes_nothing() {
    let store = Arc::new(LayoutStore::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let pipeline =
        LayoutPipeline::new(grid_config(), Box::new(PrecomputedReducer::new(known_points())))
            .unwrap();
    let outcome = spawn_layout(pipeline, embedding_bytes(16), store.clone(), cancel)
        .await
        .unwrap();

    assert!(matches!(outcome, Err(LayoutError::Cancelled)));
    assert!(store.latest().is_none());
}

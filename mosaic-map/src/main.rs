//! Mosaic Map - Main Entry Point
//!
//! Lays out an embeddings file as a centered scatter plot or a snapped grid
//! and writes the result as JSON for a renderer.
//!
//! Usage:
//!     mosaic-map --embeddings data/embeddings.bin --photos data/photo.json
//!     mosaic-map --embeddings data/embeddings.bin --grid 24x24 --output grid.json
//!     mosaic-map --embeddings data/embeddings.bin --reducer precomputed --coords umap.json

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use mosaic_core::{
    spawn_layout, CancellationToken, DimensionReducer, LayoutConfig, LayoutMode, LayoutPipeline,
    LayoutStore, PcaReducer, PhotoCatalog, PrecomputedReducer,
};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::output::{default_thumb_size, item_images, LayoutDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReducerKind {
    /// Native principal component projection
    Pca,
    /// Coordinates computed elsewhere (requires --coords)
    Precomputed,
}

#[derive(Parser, Debug)]
#[command(name = "mosaic-map")]
#[command(about = "Lay out image embeddings as a scatter plot or a grid")]
#[command(version)]
struct Args {
    /// Flat little-endian f32 embeddings file
    #[arg(short, long)]
    embeddings: PathBuf,

    /// Photo metadata JSON (array of records with a `url`)
    #[arg(long)]
    photos: Option<PathBuf>,

    /// Layout configuration JSON; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Floats per embedding vector
    #[arg(long)]
    dims: Option<usize>,

    /// Only lay out the first N embeddings
    #[arg(short = 'n', long)]
    total: Option<usize>,

    /// Output components for scatter mode (2 or 3)
    #[arg(long)]
    components: Option<usize>,

    /// Neighborhood size passed to the reducer
    #[arg(long)]
    neighbors: Option<usize>,

    /// Minimum distance passed to the reducer
    #[arg(long)]
    min_dist: Option<f32>,

    /// Snap onto a ROWSxCOLS grid instead of scattering
    #[arg(long, value_parser = parse_grid)]
    grid: Option<(usize, usize)>,

    /// Grid cell size in pixels (defaults to canvas width / cols)
    #[arg(long)]
    cell_size: Option<f32>,

    /// Reduction backend
    #[arg(long, value_enum, default_value = "pca")]
    reducer: ReducerKind,

    /// Precomputed coordinates JSON for --reducer precomputed
    #[arg(long)]
    coords: Option<PathBuf>,

    /// Thumbnail edge in pixels (defaults to 50 for scatter, 100 for grid)
    #[arg(long)]
    thumb_size: Option<u32>,

    /// Write the layout here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_grid(s: &str) -> Result<(usize, usize), String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got '{}'", s))?;
    let rows = rows
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad row count '{}': {}", rows, e))?;
    let cols = cols
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad column count '{}': {}", cols, e))?;
    Ok((rows, cols))
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied.
    fn layout_config(&self) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::from_json_file(path)?,
            None => LayoutConfig::default(),
        };

        if let Some(dims) = self.dims {
            config.embedding_dims = dims;
        }
        if let Some(total) = self.total {
            config.total_images = Some(total);
        }
        if let Some(components) = self.components {
            config.reduction.n_components = components;
        }
        if let Some(neighbors) = self.neighbors {
            config.reduction.n_neighbors = neighbors;
        }
        if let Some(min_dist) = self.min_dist {
            config.reduction.min_dist = min_dist;
        }
        if let Some((rows, cols)) = self.grid {
            config.mode = LayoutMode::Grid {
                rows,
                cols,
                cell_size: self.cell_size,
            };
        } else if let (Some(size), LayoutMode::Grid { cell_size, .. }) =
            (self.cell_size, &mut config.mode)
        {
            *cell_size = Some(size);
        }

        Ok(config)
    }

    fn reducer(&self) -> Result<Box<dyn DimensionReducer>, Box<dyn std::error::Error>> {
        match self.reducer {
            ReducerKind::Pca => Ok(Box::new(PcaReducer::new())),
            ReducerKind::Precomputed => {
                let path = self
                    .coords
                    .as_ref()
                    .ok_or("--reducer precomputed requires --coords")?;
                Ok(Box::new(PrecomputedReducer::from_json_file(path)?))
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: mosaic-map panicked");
        eprintln!(
            "  Location: {}",
            panic_info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        eprintln!(
            "  Message: {}",
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .unwrap_or(&"<no message>")
        );
    }));

    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays clean for the JSON document
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!("Starting mosaic-map");
    info!("  Version: {}", env!("CARGO_PKG_VERSION"));

    let config = args.layout_config()?;
    let pipeline = LayoutPipeline::new(config, args.reducer()?)?;
    info!(
        "Laying out up to {} items ({:?})",
        pipeline.config().effective_total(),
        pipeline.config().mode
    );

    let catalog = match &args.photos {
        Some(path) => Some(PhotoCatalog::from_json_file(path)?),
        None => None,
    };

    let buffer = tokio::fs::read(&args.embeddings)
        .await
        .map_err(|e| format!("failed to read '{}': {}", args.embeddings.display(), e))?;
    info!(
        "Read {} bytes from {}",
        buffer.len(),
        args.embeddings.display()
    );

    let store = Arc::new(LayoutStore::new());
    let cancel = CancellationToken::new();
    let mut handle = spawn_layout(pipeline, buffer, store.clone(), cancel.clone());

    let generation = tokio::select! {
        joined = &mut handle => joined??,
        _ = shutdown_signal() => {
            cancel.cancel();
            // The worker notices at its next stage boundary
            let _ = handle.await;
            return Err("layout cancelled".into());
        }
    };

    let layout = store.latest().ok_or("layout was not published")?;

    let images = match &catalog {
        Some(catalog) => {
            catalog.ensure_covers(layout.len())?;
            let size = args.thumb_size.unwrap_or_else(|| default_thumb_size(&layout));
            item_images(&layout, catalog, size)
        }
        None => Vec::new(),
    };

    let document = LayoutDocument {
        generation,
        layout: &layout,
        images,
    };
    let json = serde_json::to_vec_pretty(&document)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &json).await?;
            info!("Wrote layout for {} items to {}", layout.len(), path.display());
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            stdout.write_all(b"\n")?;
        }
    }

    if layout.is_empty() {
        warn!("Layout is empty");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, cancelling layout");
        }
        _ = terminate => {
            info!("Received terminate signal, cancelling layout");
        }
    }
}

//! JSON document written for the renderer

use mosaic_core::{LayoutResult, PhotoCatalog};
use serde::Serialize;

/// Thumbnail edge used by the scatter view.
pub const SCATTER_THUMB_SIZE: u32 = 50;
/// Thumbnail edge used by the grid view.
pub const GRID_THUMB_SIZE: u32 = 100;

#[derive(Debug, Serialize)]
pub struct ItemImage {
    pub index: usize,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct LayoutDocument<'a> {
    pub generation: u64,
    pub layout: &'a LayoutResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ItemImage>,
}

pub fn default_thumb_size(layout: &LayoutResult) -> u32 {
    match layout {
        LayoutResult::Scatter(_) => SCATTER_THUMB_SIZE,
        LayoutResult::Grid(_) => GRID_THUMB_SIZE,
    }
}

/// Thumbnail locators for every item the layout places, in placement order.
pub fn item_images(layout: &LayoutResult, catalog: &PhotoCatalog, size: u32) -> Vec<ItemImage> {
    let indices: Vec<usize> = match layout {
        LayoutResult::Scatter(s) => (0..s.len()).collect(),
        LayoutResult::Grid(g) => g.item_indices().collect(),
    };
    indices
        .into_iter()
        .filter_map(|index| {
            catalog
                .thumbnail_url(index, size)
                .map(|url| ItemImage { index, url })
        })
        .collect()
}

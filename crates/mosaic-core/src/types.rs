use serde::Serialize;

/// Decoded embedding vectors, stored flat.
///
/// Every vector has the same length `dims`; index `i` lines up with record
/// `i` of the photo catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingBatch {
    data: Vec<f32>,
    dims: usize,
}

impl EmbeddingBatch {
    /// Wrap flat data. `data.len()` must be a multiple of `dims`.
    pub(crate) fn from_flat(data: Vec<f32>, dims: usize) -> Self {
        debug_assert!(dims > 0 && data.len() % dims == 0);
        Self { data, dims }
    }

    /// Vector length shared by the whole batch.
    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Vector `index`, or `None` past the end.
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dims)?;
        let end = start.checked_add(self.dims)?;
        self.data.get(start..end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dims)
    }

    /// Flat data for the first `n` vectors (all of them if `n` exceeds the batch).
    pub fn head(&self, n: usize) -> &[f32] {
        let n = n.min(self.len());
        &self.data[..n * self.dims]
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}

/// Low-dimensional coordinates, one tuple of `dims` components per item.
///
/// Used both for raw reducer output and for centered scatter positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    dims: usize,
    coords: Vec<f32>,
}

impl Projection {
    /// Build from flat coordinates.
    ///
    /// Fails if `dims` is zero or `coords` is not a whole number of tuples.
    pub fn new(dims: usize, coords: Vec<f32>) -> Result<Self, String> {
        if dims == 0 {
            return Err("projection must have at least one component".to_string());
        }
        if coords.len() % dims != 0 {
            return Err(format!(
                "{} coordinates do not split into {}-component points",
                coords.len(),
                dims
            ));
        }
        Ok(Self { dims, coords })
    }

    pub(crate) fn from_flat_unchecked(dims: usize, coords: Vec<f32>) -> Self {
        debug_assert!(dims > 0 && coords.len() % dims == 0);
        Self { dims, coords }
    }

    /// Build from fixed-size tuples such as `[f32; 2]`.
    pub fn from_points<const K: usize>(points: &[[f32; K]]) -> Self {
        Self {
            dims: K,
            coords: points.iter().flatten().copied().collect(),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.coords.len() / self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dims)?;
        let end = start.checked_add(self.dims)?;
        self.coords.get(start..end)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.coords.chunks_exact(self.dims)
    }

    pub fn as_flat(&self) -> &[f32] {
        &self.coords
    }
}

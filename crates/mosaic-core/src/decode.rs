//! Embedding file decoding
//!
//! The embeddings file is a flat run of little-endian IEEE-754 `f32` values,
//! `dims` floats per image, no header.

use std::path::Path;

use tracing::debug;

use crate::error::{LayoutError, Result};
use crate::types::EmbeddingBatch;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Split a raw buffer into `dims`-long vectors.
///
/// The buffer must hold a whole number of vectors; a remainder means the file
/// is corrupt or was written with a different dimension. Values are passed
/// through untouched, NaN and infinities included.
pub fn decode(buffer: &[u8], dims: usize) -> Result<EmbeddingBatch> {
    if dims == 0 {
        return Err(LayoutError::InvalidConfig(
            "embedding dimension must be positive".to_string(),
        ));
    }

    let stride = dims
        .checked_mul(F32_BYTES)
        .ok_or_else(|| LayoutError::InvalidConfig(format!("embedding dimension {} too large", dims)))?;
    if buffer.len() % stride != 0 {
        return Err(LayoutError::MalformedInput {
            len: buffer.len(),
            dims,
        });
    }

    let data: Vec<f32> = buffer
        .chunks_exact(F32_BYTES)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    debug!(
        "decoded {} vectors of dimension {}",
        data.len() / dims,
        dims
    );
    Ok(EmbeddingBatch::from_flat(data, dims))
}

/// Read and decode an embeddings file.
pub fn decode_file(path: impl AsRef<Path>, dims: usize) -> Result<EmbeddingBatch> {
    let bytes = std::fs::read(path.as_ref())?;
    decode(&bytes, dims)
}

/// Little-endian encoding of flat `f32` data, the inverse of [`decode`].
pub fn encode(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|f| f.to_le_bytes()).collect()
}

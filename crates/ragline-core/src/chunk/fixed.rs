//! Fixed-size strategy: recursive character splitting with overlap.

use crate::models::{Chunk, ChunkStrategy};

use super::splitter::split_recursive;

pub(crate) const FIXED_CHUNK_SIZE: usize = 500;
pub(crate) const FIXED_OVERLAP: usize = 50;

pub(crate) fn split_fixed(content: &str) -> Vec<Chunk> {
    split_recursive(content, FIXED_CHUNK_SIZE, FIXED_OVERLAP)
        .into_iter()
        .map(|text| Chunk::new(text, ChunkStrategy::Fixed))
        .collect()
}

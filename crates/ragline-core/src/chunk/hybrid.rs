//! Hybrid strategy: markdown structure first, then semantic re-splits.
//!
//! Runs the markdown strategy (including its fixed fallback), then
//! breaks any chunk over the size threshold into paragraph-boundary
//! pieces. Every emitted chunk is labelled `hybrid`; re-split chunks
//! keep the parent section's headers under `original_headers`.

use crate::models::{Chunk, ChunkStrategy};

use super::semantic::split_semantic;

/// Markdown chunks above this size go through the semantic re-split.
const RESPLIT_THRESHOLD: usize = 800;

pub(crate) fn split_hybrid(content: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for mut chunk in super::chunk(content, ChunkStrategy::Markdown) {
        if chunk.metadata.chunk_size > RESPLIT_THRESHOLD {
            let parent_headers = chunk.metadata.headers.clone().unwrap_or_default();
            for mut sub in split_semantic(&chunk.text) {
                sub.metadata.strategy = ChunkStrategy::Hybrid;
                sub.metadata.original_headers = Some(parent_headers.clone());
                chunks.push(sub);
            }
        } else {
            chunk.metadata.strategy = ChunkStrategy::Hybrid;
            chunks.push(chunk);
        }
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_chunks_are_labelled_hybrid() {
        let doc = "# A\n\nShort body.\n\n## B\n\nAnother short body.";
        let chunks = split_hybrid(doc);
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.strategy, ChunkStrategy::Hybrid);
        }
    }

    #[test]
    fn test_small_chunks_pass_through_with_headers() {
        let chunks = split_hybrid("# A\n\nHello world.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "# A\n\nHello world.");
        let headers = chunks[0].metadata.headers.as_ref().unwrap();
        assert_eq!(headers.h1.as_deref(), Some("A"));
        assert!(chunks[0].metadata.original_headers.is_none());
    }

    #[test]
    fn test_oversized_chunks_are_resplit_on_paragraphs() {
        // A section body of exactly 800 chars survives the markdown
        // pass whole; the heading trail pushes the chunk past 800 and
        // triggers the paragraph re-split.
        let p1 = "x".repeat(399);
        let p2 = "y".repeat(399);
        let doc = format!("# Big\n\n{}\n\n{}", p1, p2);
        let chunks = split_hybrid(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("# Big\n\n{}", p1));
        assert_eq!(chunks[1].text, p2);
        for chunk in &chunks {
            assert_eq!(chunk.metadata.strategy, ChunkStrategy::Hybrid);
            let parents = chunk.metadata.original_headers.as_ref().unwrap();
            assert_eq!(parents.h1.as_deref(), Some("Big"));
            assert!(chunk.metadata.paragraphs.is_some());
        }
    }

    #[test]
    fn test_no_headings_falls_back_through_markdown() {
        let chunks = split_hybrid("plain prose with no markdown structure at all");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.strategy, ChunkStrategy::Hybrid);
        assert!(chunks[0].metadata.headers.is_none());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(split_hybrid("").is_empty());
    }
}

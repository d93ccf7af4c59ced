//! Semantic strategy: paragraph-boundary grouping.
//!
//! Paragraphs (blank-line separated, trimmed) are greedily packed into
//! chunks while the joined text stays under the size ceiling. Chunk
//! boundaries always fall on paragraph boundaries; a single paragraph
//! at or over the ceiling becomes its own oversized chunk rather than
//! being split mid-paragraph.

use crate::models::{Chunk, ChunkStrategy};

use super::splitter::char_len;

/// Joined chunk text must stay strictly under this many characters.
const SEMANTIC_MAX_CHUNK: usize = 600;

pub(crate) fn split_semantic(content: &str) -> Vec<Chunk> {
    let paragraphs: Vec<&str> = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;
    for para in paragraphs {
        let para_len = char_len(para);
        let joined_len = if current.is_empty() {
            para_len
        } else {
            current_len + 2 + para_len
        };
        if joined_len < SEMANTIC_MAX_CHUNK {
            current.push(para);
            current_len = joined_len;
        } else {
            if !current.is_empty() {
                chunks.push(paragraph_chunk(&current));
            }
            current = vec![para];
            current_len = para_len;
        }
    }
    if !current.is_empty() {
        chunks.push(paragraph_chunk(&current));
    }
    chunks
}

fn paragraph_chunk(paragraphs: &[&str]) -> Chunk {
    let mut chunk = Chunk::new(paragraphs.join("\n\n"), ChunkStrategy::Semantic);
    chunk.metadata.paragraphs = Some(paragraphs.len());
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_paragraphs_merge_into_one_chunk() {
        let chunks = split_semantic("first paragraph\n\nsecond paragraph\n\nthird");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "first paragraph\n\nsecond paragraph\n\nthird");
        assert_eq!(chunks[0].metadata.paragraphs, Some(3));
        assert_eq!(chunks[0].metadata.strategy, ChunkStrategy::Semantic);
        assert_eq!(chunks[0].metadata.chunk_size, chunks[0].text.chars().count());
    }

    #[test]
    fn test_boundaries_fall_on_paragraphs() {
        let para = "x".repeat(250);
        let text = vec![para.as_str(); 4].join("\n\n");
        let chunks = split_semantic(&text);
        // 250 + 2 + 250 = 502 < 600, adding a third would reach 754.
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.text, format!("{}\n\n{}", para, para));
            assert_eq!(chunk.metadata.paragraphs, Some(2));
        }
    }

    #[test]
    fn test_oversized_paragraph_is_isolated() {
        let big = "y".repeat(700);
        let text = format!("small one\n\n{}\n\nsmall two", big);
        let chunks = split_semantic(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "small one");
        assert_eq!(chunks[1].text, big);
        assert_eq!(chunks[1].metadata.chunk_size, 700);
        assert_eq!(chunks[2].text, "small two");
    }

    #[test]
    fn test_threshold_is_strict() {
        // 300 + 2 + 298 = 600, not under the ceiling, so they split.
        let a = "a".repeat(300);
        let b = "b".repeat(298);
        let chunks = split_semantic(&format!("{}\n\n{}", a, b));
        assert_eq!(chunks.len(), 2);

        // 300 + 2 + 297 = 599 stays together.
        let c = "c".repeat(297);
        let chunks = split_semantic(&format!("{}\n\n{}", a, c));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.chunk_size, 599);
    }

    #[test]
    fn test_blank_runs_and_padding_are_normalized() {
        let chunks = split_semantic("  first  \n\n\n\nsecond\n\n\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "first\n\nsecond");
    }

    #[test]
    fn test_whitespace_only_input_yields_nothing() {
        assert!(split_semantic("").is_empty());
        assert!(split_semantic("\n\n  \n\n").is_empty());
    }
}

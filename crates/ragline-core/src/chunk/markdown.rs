//! Markdown structure strategy.
//!
//! Splits a document into sections at `#`, `##`, and `###` headings,
//! tracking the active heading stack so every chunk carries its full
//! heading trail. Deeper headings (`####` and below) and headings
//! inside fenced code blocks are treated as body text. Section bodies
//! larger than the re-split threshold are split again with the
//! recursive splitter; every resulting chunk still starts with the
//! section's heading trail.
//!
//! A document containing no recognized headings produces no chunks
//! here; the caller falls back to the fixed strategy.

use crate::models::{Chunk, ChunkStrategy, Headers};

use super::splitter::{char_len, split_recursive};

/// Section bodies longer than this are re-split.
const RESPLIT_THRESHOLD: usize = 800;
const RESPLIT_CHUNK_SIZE: usize = 600;
const RESPLIT_OVERLAP: usize = 100;

struct Section {
    headers: Headers,
    body: String,
}

pub(crate) fn split_markdown(content: &str) -> Vec<Chunk> {
    let Some(sections) = parse_sections(content) else {
        return Vec::new();
    };

    let mut chunks = Vec::new();
    for section in sections {
        let trail = section.headers.trail();
        if char_len(&section.body) > RESPLIT_THRESHOLD {
            for piece in split_recursive(&section.body, RESPLIT_CHUNK_SIZE, RESPLIT_OVERLAP) {
                chunks.push(section_chunk(&trail, &section.headers, piece));
            }
        } else {
            let body = section.body.clone();
            chunks.push(section_chunk(&trail, &section.headers, body));
        }
    }
    chunks
}

fn section_chunk(trail: &Option<String>, headers: &Headers, body: String) -> Chunk {
    let text = match trail {
        Some(trail) => format!("{}\n\n{}", trail, body),
        None => body,
    };
    let mut chunk = Chunk::new(text, ChunkStrategy::Markdown);
    chunk.metadata.headers = Some(headers.clone());
    chunk
}

/// Walk the document line by line, maintaining the active heading stack
/// and collecting each section's body. Returns `None` when no heading
/// was seen anywhere, which signals the fixed fallback.
fn parse_sections(content: &str) -> Option<Vec<Section>> {
    let mut sections = Vec::new();
    let mut active = Headers::default();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut saw_heading = false;
    let mut in_fence = false;

    let mut flush = |headers: &Headers, lines: &mut Vec<&str>| {
        let body = lines.join("\n").trim().to_string();
        lines.clear();
        if !body.is_empty() {
            sections.push(Section {
                headers: headers.clone(),
                body,
            });
        }
    };

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            body_lines.push(line);
            continue;
        }
        if !in_fence {
            if let Some((level, text)) = parse_heading(line) {
                saw_heading = true;
                flush(&active, &mut body_lines);
                match level {
                    1 => {
                        active.h1 = Some(text.to_string());
                        active.h2 = None;
                        active.h3 = None;
                    }
                    2 => {
                        active.h2 = Some(text.to_string());
                        active.h3 = None;
                    }
                    _ => active.h3 = Some(text.to_string()),
                }
                continue;
            }
        }
        body_lines.push(line);
    }
    flush(&active, &mut body_lines);

    if saw_heading {
        Some(sections)
    } else {
        None
    }
}

/// Recognize `# `, `## `, and `### ` headings. A marker without a
/// trailing space, or with more than three `#`, is body text.
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    for (prefix, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some((level, rest.trim()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_carry_heading_trails() {
        let chunks = split_markdown("# A\n\nHello world.\n\n## B\n\nMore text here.");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "# A\n\nHello world.");
        assert_eq!(chunks[1].text, "# A\n## B\n\nMore text here.");

        let headers = chunks[1].metadata.headers.as_ref().unwrap();
        assert_eq!(headers.h1.as_deref(), Some("A"));
        assert_eq!(headers.h2.as_deref(), Some("B"));
        assert_eq!(headers.h3, None);
        assert_eq!(chunks[1].metadata.strategy, ChunkStrategy::Markdown);
        assert_eq!(chunks[1].metadata.chunk_size, chunks[1].text.chars().count());
    }

    #[test]
    fn test_no_headings_produces_no_chunks() {
        assert!(split_markdown("plain text without any headings").is_empty());
        assert!(split_markdown("").is_empty());
    }

    #[test]
    fn test_headings_without_body_produce_no_chunks() {
        assert!(split_markdown("# A\n## B").is_empty());
    }

    #[test]
    fn test_preamble_has_no_trail() {
        let chunks = split_markdown("intro before any heading\n\n# A\n\nbody");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "intro before any heading");
        assert!(chunks[0].metadata.headers.as_ref().unwrap().is_empty());
        assert_eq!(chunks[1].text, "# A\n\nbody");
    }

    #[test]
    fn test_new_h1_resets_deeper_levels() {
        let chunks = split_markdown("# A\n\nx\n\n### D\n\ny\n\n# C\n\nz");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, "# A\n### D\n\ny");
        assert_eq!(chunks[2].text, "# C\n\nz");
        let last = chunks[2].metadata.headers.as_ref().unwrap();
        assert_eq!(last.h1.as_deref(), Some("C"));
        assert!(last.h2.is_none() && last.h3.is_none());
    }

    #[test]
    fn test_fenced_code_is_not_a_boundary() {
        let doc = "# A\n\nbefore\n\n```\n# not a heading\n```\n\nafter";
        let chunks = split_markdown(doc);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("# not a heading"));
        assert!(chunks[0].text.contains("after"));
    }

    #[test]
    fn test_deep_headings_are_body_text() {
        let chunks = split_markdown("# A\n\n#### deep\n\nbody");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("#### deep"));
    }

    #[test]
    fn test_large_section_is_resplit_keeping_trail() {
        let body = "A sentence that fills the section with text. ".repeat(30);
        let doc = format!("# Big\n\n{}", body.trim());
        let chunks = split_markdown(&doc);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.starts_with("# Big\n\n"));
            let headers = chunk.metadata.headers.as_ref().unwrap();
            assert_eq!(headers.h1.as_deref(), Some("Big"));
        }
    }

    #[test]
    fn test_small_section_is_kept_whole() {
        let body = "short body under the threshold";
        let chunks = split_markdown(&format!("# A\n\n{}", body));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, format!("# A\n\n{}", body));
    }
}

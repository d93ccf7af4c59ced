//! Recursive character splitter.
//!
//! Splits text into chunks of at most `chunk_size` characters by trying
//! a ranked list of separators, preferring paragraph breaks over line
//! breaks over sentence and clause boundaries, and falling back to
//! single characters so any input terminates. Separators stay attached
//! to the piece they terminate, so concatenating the pieces of a split
//! reproduces the input exactly.
//!
//! All sizes are Unicode scalar counts (`chars().count()`), not bytes.

/// Separator preference order. The final empty separator splits into
/// single characters and always applies.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", ", ", " ", ""];

/// Split `text` into chunks of at most `chunk_size` characters, with up
/// to `overlap` characters repeated from the end of each chunk at the
/// start of the next. Whitespace-only chunks are dropped, so blank or
/// whitespace-only input produces no chunks.
pub(crate) fn split_recursive(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < chunk_size);
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    split_level(text, &SEPARATORS, chunk_size, overlap, &mut chunks);
    chunks
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// One recursion level: split on the best separator for this text,
/// merge the small pieces, and recurse into oversized ones with the
/// remaining separators.
fn split_level(
    text: &str,
    separators: &[&str],
    chunk_size: usize,
    overlap: usize,
    out: &mut Vec<String>,
) {
    let chosen = separators
        .iter()
        .position(|sep| sep.is_empty() || text.contains(sep))
        .unwrap_or(separators.len() - 1);
    let separator = separators[chosen];
    let remaining = &separators[chosen + 1..];

    let mut small: Vec<&str> = Vec::new();
    for piece in split_keep_separator(text, separator) {
        if char_len(piece) < chunk_size {
            small.push(piece);
        } else {
            if !small.is_empty() {
                merge_pieces(&small, chunk_size, overlap, out);
                small.clear();
            }
            if remaining.is_empty() {
                // Single characters only reach here when chunk_size <= 1.
                push_chunk(piece.to_string(), out);
            } else {
                split_level(piece, remaining, chunk_size, overlap, out);
            }
        }
    }
    if !small.is_empty() {
        merge_pieces(&small, chunk_size, overlap, out);
    }
}

/// Split on `separator`, keeping each occurrence attached to the piece
/// it terminates. An empty separator yields one piece per character.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    if separator.is_empty() {
        let mut indices = text.char_indices().peekable();
        while let Some((start, _)) = indices.next() {
            let end = indices.peek().map_or(text.len(), |(next, _)| *next);
            pieces.push(&text[start..end]);
        }
        return pieces;
    }
    let mut start = 0;
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(separator) {
        let end = search_from + found + separator.len();
        pieces.push(&text[start..end]);
        start = end;
        search_from = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Greedily pack pieces into chunks of at most `chunk_size` characters.
/// When a chunk is emitted, trailing whole pieces totalling at most
/// `overlap` characters are kept to seed the next chunk.
fn merge_pieces(pieces: &[&str], chunk_size: usize, overlap: usize, out: &mut Vec<String>) {
    let mut window: Vec<&str> = Vec::new();
    let mut total = 0;
    for &piece in pieces {
        let len = char_len(piece);
        if total + len > chunk_size && !window.is_empty() {
            push_chunk(window.concat(), out);
            while total > overlap || (total + len > chunk_size && total > 0) {
                total -= char_len(window.remove(0));
            }
        }
        window.push(piece);
        total += len;
    }
    if !window.is_empty() {
        push_chunk(window.concat(), out);
    }
}

fn push_chunk(chunk: String, out: &mut Vec<String>) {
    if !chunk.trim().is_empty() {
        out.push(chunk);
    }
}

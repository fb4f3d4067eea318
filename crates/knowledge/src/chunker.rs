//! Text chunking with configurable size and overlap.

use crate::types::ChunkCandidate;

/// Chunk text into overlapping segments of at most `chunk_size` bytes.
///
/// Boundaries are moved to the nearest UTF-8 character boundary. The last
/// chunk always ends at the end of the text, so no short tail is emitted
/// that the previous chunk's overlap already covers.
pub fn chunk_text(
    source_id: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<ChunkCandidate> {
    if text.trim().is_empty() {
        return vec![];
    }

    let chunk_size = chunk_size.max(1);
    let step = if chunk_size > overlap {
        chunk_size - overlap
    } else {
        chunk_size
    };

    let mut chunks = Vec::new();
    let mut position = 0u32;
    let mut start = 0;

    loop {
        let mut end = (start + chunk_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // chunk_size smaller than a single character
            end = text[start..]
                .chars()
                .next()
                .map_or(text.len(), |c| start + c.len_utf8());
        }

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(ChunkCandidate {
                source_id: source_id.to_string(),
                position,
                text: piece.to_string(),
                metadata: serde_json::json!({
                    "start": start,
                    "end": end,
                }),
            });
            position += 1;
        }

        if end >= text.len() {
            break;
        }

        let mut next_start = (start + step).max(start + 1);
        while next_start < text.len() && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        start = next_start;
    }

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

//! Splitting page text into overlapping passages

/// Passage chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    /// Byte offset of the chunk within its page
    pub position: usize,
}

/// Preferred cut points, strongest first
const BREAKS: [&str; 4] = ["\n\n", ". ", "\n", " "];

/// Cuts are only looked for in the tail of a window, from this percentage on
const BREAK_SEARCH_FROM_PCT: usize = 70;

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0)
}

fn ceil_char_boundary(s: &str, index: usize) -> usize {
    (index..s.len())
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(s.len())
}

/// End of the passage starting at `start`, cut at the best break in the window tail
fn passage_end(content: &str, start: usize, chunk_size: usize) -> usize {
    let mut end = floor_char_boundary(content, start + chunk_size);
    if end <= start {
        // a single char wider than the window
        end = ceil_char_boundary(content, start + 1);
    }
    if end == content.len() {
        return end;
    }

    let tail_start = ceil_char_boundary(content, start + chunk_size * BREAK_SEARCH_FROM_PCT / 100);
    if tail_start >= end {
        return end;
    }
    let tail = &content[tail_start..end];
    BREAKS
        .iter()
        .find_map(|sep| tail.rfind(sep).map(|pos| tail_start + pos + sep.len()))
        .unwrap_or(end)
}

/// Split text into passages of at most `chunk_size` bytes, each starting
/// `overlap` bytes before the previous one ended.
///
/// Blank input yields no passages. An overlap at least as large as the chunk
/// size still makes progress.
pub fn chunk_text(content: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    let chunk_size = chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < content.len() {
        let end = passage_end(content, start, chunk_size);

        let text = content[start..end].trim();
        if !text.is_empty() {
            chunks.push(Chunk {
                text: text.to_string(),
                position: start,
            });
        }
        if end >= content.len() {
            break;
        }

        let rewound = ceil_char_boundary(content, end.saturating_sub(overlap));
        start = if rewound > start { rewound } else { end };
    }
    chunks
}

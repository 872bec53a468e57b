//! Splitting replies into transport-sized segments.

/// Split `text` into segments of at most `max_len` characters.
///
/// Tries to break after a newline, then after any other whitespace, and
/// hard-cuts only when a single word is longer than `max_len`. Whitespace
/// leading a window stays attached to the text after it, so a segment is
/// whitespace-only only when a whitespace run fills a whole window. Nothing
/// is trimmed: concatenating the segments yields `text` again.
pub fn split(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    loop {
        // Byte offset of the first character past the limit, if any.
        let Some((limit, next)) = remaining.char_indices().nth(max_len) else {
            chunks.push(remaining.to_string());
            break;
        };

        let split_at = if next.is_whitespace() {
            limit
        } else {
            let window = &remaining[..limit];
            let lead = window.len() - window.trim_start().len();
            let body = &window[lead..];
            break_after(body, |c| c == '\n')
                .or_else(|| break_after(body, char::is_whitespace))
                .map_or(limit, |at| lead + at)
        };

        chunks.push(remaining[..split_at].to_string());
        remaining = &remaining[split_at..];
    }

    chunks
}

/// Byte offset just past the last character in `window` matching `pred`.
fn break_after(window: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    window
        .char_indices()
        .rev()
        .find(|&(_, c)| pred(c))
        .map(|(i, c)| i + c.len_utf8())
}

//! Character-based text measurement and slicing.
//!
//! Chunk bounds are expressed in `char`s so slices never split a UTF-8 sequence.

/// Length in Unicode scalar values.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` after at most `max_chars` characters.
pub fn split_at_char(text: &str, max_chars: usize) -> (&str, &str) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text.split_at(idx),
        None => (text, ""),
    }
}

/// Keep the first `max_chars` characters, appending `marker` when anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    let (head, rest) = split_at_char(text, max_chars);
    if rest.is_empty() {
        text.to_string()
    } else {
        format!("{head}{marker}")
    }
}

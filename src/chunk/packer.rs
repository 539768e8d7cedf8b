//! Size-bounded packing of file units into chunks.

use crate::domain::FileRecord;
use crate::utils::{char_len, split_at_char};

pub struct ChunkPacker {
    max_chunk_chars: usize,
}

impl ChunkPacker {
    /// `max_chunk_chars` of zero is treated as one so slicing always advances.
    pub fn new(max_chunk_chars: usize) -> Self {
        Self { max_chunk_chars: max_chunk_chars.max(1) }
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    /// Pack files in order. Every character of every formatted unit lands in exactly one chunk.
    pub fn pack(&self, files: &[FileRecord]) -> Vec<String> {
        let max = self.max_chunk_chars;
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for file in files {
            let unit = format_unit(file);
            let unit_len = char_len(&unit);

            if unit_len > max {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                self.split_oversized(&file.path, &unit, &mut chunks);
            } else if current_len + unit_len > max {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                current = unit;
                current_len = unit_len;
            } else {
                current.push_str(&unit);
                current_len += unit_len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        tracing::debug!(
            "Packed {} files into {} chunks (max {} chars)",
            files.len(),
            chunks.len(),
            max
        );
        chunks
    }

    fn split_oversized(&self, path: &str, unit: &str, out: &mut Vec<String>) {
        let max = self.max_chunk_chars;
        let header = continuation_header(path);
        let header_len = char_len(&header);

        let (first, mut rest) = split_at_char(unit, max);
        out.push(first.to_string());

        while !rest.is_empty() {
            if header_len < max {
                let (piece, remaining) = split_at_char(rest, max - header_len);
                out.push(format!("{header}{piece}"));
                rest = remaining;
            } else {
                let (piece, remaining) = split_at_char(rest, max);
                out.push(piece.to_string());
                rest = remaining;
            }
        }
    }
}

/// `// File: <path>\n<content>\n\n`
pub fn format_unit(file: &FileRecord) -> String {
    format!("// File: {}\n{}\n\n", file.path, file.content)
}

pub fn continuation_header(path: &str) -> String {
    format!("// File: {path} (Continuation)\n")
}

/// Remove a leading continuation header, if the chunk starts with one.
pub fn strip_continuation_header(chunk: &str) -> &str {
    let Some(rest) = chunk.strip_prefix("// File: ") else {
        return chunk;
    };
    match rest.split_once('\n') {
        Some((header, body)) if header.ends_with(" (Continuation)") => body,
        _ => chunk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn file(path: &str, content: &str) -> FileRecord {
        FileRecord::new(path, content)
    }

    fn formatted_stream(files: &[FileRecord]) -> String {
        files.iter().map(format_unit).collect()
    }

    fn reassemble(chunks: &[String]) -> String {
        chunks.iter().map(|c| strip_continuation_header(c)).collect()
    }

    #[test]
    fn test_small_files_share_one_chunk() {
        let files = vec![file("a.js", "console.log('a')"), file("b.js", "console.log('b')")];
        let chunks = ChunkPacker::new(1_000).pack(&files);
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0],
            "// File: a.js\nconsole.log('a')\n\n// File: b.js\nconsole.log('b')\n\n"
        );
    }

    #[test]
    fn test_overflow_starts_new_chunk() {
        let files = vec![file("a.rs", &"a".repeat(40)), file("b.rs", &"b".repeat(40))];
        let unit_len = char_len(&format_unit(&files[0]));
        let chunks = ChunkPacker::new(unit_len + 5).pack(&files);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("// File: a.rs\n"));
        assert!(chunks[1].starts_with("// File: b.rs\n"));
    }

    #[test]
    fn test_oversized_file_is_sliced_with_continuation_headers() {
        let files = vec![file("small.md", "hi"), file("big.py", &"x".repeat(300))];
        let chunks = ChunkPacker::new(100).pack(&files);

        assert!(chunks.len() > 3);
        assert_eq!(chunks[0], "// File: small.md\nhi\n\n");
        assert!(chunks[1].starts_with("// File: big.py\n"));
        for chunk in &chunks[2..] {
            assert!(chunk.starts_with("// File: big.py (Continuation)\n"), "{chunk}");
        }
        assert_eq!(reassemble(&chunks), formatted_stream(&files));
    }

    #[test]
    fn test_header_longer_than_bound_is_omitted() {
        let long_path = format!("{}/deep.rs", "nested".repeat(10));
        let files = vec![file(&long_path, &"y".repeat(50))];
        let chunks = ChunkPacker::new(20).pack(&files);

        assert!(chunks.iter().all(|c| !c.contains("(Continuation)")));
        assert_eq!(chunks.concat(), formatted_stream(&files));
    }

    #[test]
    fn test_chunks_never_exceed_bound_and_lose_nothing() {
        let files = vec![
            file("src/lib.rs", &"pub fn a() {}\n".repeat(30)),
            file("README.md", "# Title\n"),
            file("src/日本.rs", &"// コメント\n".repeat(25)),
            file("empty.json", ""),
            file("web/app.tsx", &"const x = 1;\n".repeat(80)),
        ];
        let expected = formatted_stream(&files);

        for max in [1, 7, 33, 64, 150, 1_000, 100_000] {
            let chunks = ChunkPacker::new(max).pack(&files);
            for chunk in &chunks {
                assert!(char_len(chunk) <= max, "chunk of {} chars exceeds {max}", char_len(chunk));
                assert!(!chunk.is_empty());
            }
            assert_eq!(reassemble(&chunks), expected, "completeness at max={max}");
        }
    }

    #[test]
    fn test_zero_bound_is_clamped() {
        let chunks = ChunkPacker::new(0).pack(&[file("a", "b")]);
        assert!(chunks.iter().all(|c| char_len(c) == 1));
        assert_eq!(chunks.concat(), "// File: a\nb\n\n");
    }

    #[test]
    fn test_no_files_no_chunks() {
        assert!(ChunkPacker::new(10).pack(&[]).is_empty());
    }

    #[test]
    fn test_strip_continuation_header_leaves_plain_chunks() {
        assert_eq!(strip_continuation_header("// File: a.rs\nfn a() {}"), "// File: a.rs\nfn a() {}");
        assert_eq!(strip_continuation_header("// File: a.rs (Continuation)\nrest"), "rest");
        assert_eq!(strip_continuation_header("raw slice"), "raw slice");
    }
}

//! Packing fetched files into size-bounded, self-describing chunks

use crate::domain::FileRecord;
use crate::utils::char_len;
use serde::Serialize;

pub mod packer;

pub use packer::{continuation_header, format_unit, strip_continuation_header, ChunkPacker};

/// Partition `files` into ordered chunks of at most `max_chunk_chars` characters.
pub fn pack(files: &[FileRecord], max_chunk_chars: usize) -> Vec<String> {
    ChunkPacker::new(max_chunk_chars).pack(files)
}

/// Summary of a packing run, used by the `chunks` preview command.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPlan {
    pub file_count: usize,
    pub truncated_files: Vec<String>,
    pub total_chars: usize,
    pub max_chunk_chars: usize,
    pub chunk_sizes: Vec<usize>,
    /// The source host returned a partial file listing.
    pub tree_truncated: bool,
}

impl ChunkPlan {
    pub fn new(files: &[FileRecord], chunks: &[String], max_chunk_chars: usize) -> Self {
        let chunk_sizes: Vec<usize> = chunks.iter().map(|c| char_len(c)).collect();
        Self {
            file_count: files.len(),
            truncated_files: files
                .iter()
                .filter(|f| f.is_truncated())
                .map(|f| f.path.clone())
                .collect(),
            total_chars: chunk_sizes.iter().sum(),
            max_chunk_chars,
            chunk_sizes,
            tree_truncated: false,
        }
    }

    pub fn with_tree_truncated(mut self, truncated: bool) -> Self {
        self.tree_truncated = truncated;
        self
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_sizes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TRUNCATION_MARKER;

    #[test]
    fn test_plan_summarizes_chunks() {
        let files = vec![
            FileRecord::new("a.rs", "fn a() {}"),
            FileRecord::new("b.rs", format!("fn b() {{{TRUNCATION_MARKER}")),
        ];
        let chunks = pack(&files, 30);
        let plan = ChunkPlan::new(&files, &chunks, 30);

        assert_eq!(plan.file_count, 2);
        assert_eq!(plan.truncated_files, vec!["b.rs".to_string()]);
        assert_eq!(plan.chunk_count(), chunks.len());
        assert!(plan.chunk_sizes.iter().all(|&s| s <= 30));
        assert_eq!(plan.total_chars, chunks.iter().map(|c| char_len(c)).sum::<usize>());
        assert!(!plan.tree_truncated);
    }

    #[test]
    fn test_plan_records_truncated_listing() {
        let files = vec![FileRecord::new("a.rs", "fn a() {}")];
        let chunks = pack(&files, 100);
        let plan = ChunkPlan::new(&files, &chunks, 100).with_tree_truncated(true);

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["tree_truncated"], true);
    }
}

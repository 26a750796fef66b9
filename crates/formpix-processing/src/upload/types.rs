//! Types for the intake pipeline.

use formpix_core::{CompressedFile, FileId, SkipReason};

/// Outcome of one batch submission.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Files accepted in this batch, in selection order.
    pub accepted: Vec<CompressedFile>,
    /// Every file of the batch that did not reach the accepted set.
    pub skipped: Vec<SkipReason>,
    /// Files withdrawn while compressing; their results were discarded.
    pub withdrawn: Vec<FileId>,
    /// Session total after the batch was applied.
    pub running_total: u64,
}

impl BatchReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// Consolidated notice for the skipped files, e.g.
    /// `2 files were skipped: notes.txt (not an image), huge.jpg (file too large)`.
    pub fn skip_notice(&self) -> Option<String> {
        if self.skipped.is_empty() {
            return None;
        }

        let list = self
            .skipped
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let count = self.skipped.len();
        let notice = if count == 1 {
            format!("1 file was skipped: {}", list)
        } else {
            format!("{} files were skipped: {}", count, list)
        };
        Some(notice)
    }
}

//! Cumulative size budget for a form session.

use std::collections::HashMap;

use formpix_core::{CompressedFile, FileId, IntakeConfig, IntakeError, SkipKind, SkipReason};

/// Files accepted so far in one form session.
///
/// `running_total` always equals the sum of `byte_size()` over `accepted`;
/// only [`BudgetAccumulator::offer`] and the removal methods mutate either.
#[derive(Debug, Default)]
pub struct SessionState {
    accepted: Vec<CompressedFile>,
    running_total: u64,
    /// Files handed to the compressor whose result is still wanted, with
    /// the number of outstanding submissions of each.
    pending: HashMap<FileId, usize>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> &[CompressedFile] {
        &self.accepted
    }

    pub fn running_total(&self) -> u64 {
        self.running_total
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Remove the accepted file at `index`. Out of range leaves the state unchanged.
    pub fn remove(&mut self, index: usize) -> Result<CompressedFile, IntakeError> {
        if index >= self.accepted.len() {
            return Err(IntakeError::IndexOutOfRange {
                index,
                len: self.accepted.len(),
            });
        }

        let removed = self.accepted.remove(index);
        self.running_total -= removed.byte_size();
        Ok(removed)
    }

    pub fn remove_by_id(&mut self, id: FileId) -> Option<CompressedFile> {
        let index = self.accepted.iter().position(|f| f.id == id)?;
        self.remove(index).ok()
    }

    pub fn mark_pending(&mut self, id: FileId) {
        *self.pending.entry(id).or_insert(0) += 1;
    }

    /// Claim one outstanding result for `id`. Returns false when the file was
    /// withdrawn (or the session reset) while it was being compressed.
    pub fn take_pending(&mut self, id: FileId) -> bool {
        match self.pending.get_mut(&id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.pending.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Drop every outstanding result for `id`.
    pub fn withdraw(&mut self, id: FileId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: FileId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn reset(&mut self) {
        self.accepted.clear();
        self.running_total = 0;
        self.pending.clear();
    }
}

/// Final admission check for compressed files.
#[derive(Debug, Clone, Copy)]
pub struct BudgetAccumulator {
    max_compressed_file_size: Option<u64>,
    max_total_size: u64,
}

impl BudgetAccumulator {
    pub fn new(max_compressed_file_size: Option<u64>, max_total_size: u64) -> Self {
        Self {
            max_compressed_file_size,
            max_total_size,
        }
    }

    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(config.max_compressed_file_size, config.max_total_size)
    }

    pub fn max_total_size(&self) -> u64 {
        self.max_total_size
    }

    /// Append `file` to `state` if it fits, returning its index.
    ///
    /// The per-file cap is checked before the session total. A rejected file
    /// leaves `state` untouched. The skip record names the compressed file;
    /// [`crate::IntakeSession`] replaces it with the selected name.
    pub fn offer(
        &self,
        state: &mut SessionState,
        file: CompressedFile,
    ) -> Result<usize, SkipReason> {
        let size = file.byte_size();

        if let Some(max) = self.max_compressed_file_size {
            if size > max {
                return Err(SkipReason::new(file.name, SkipKind::StillTooLargeAfterCompression)
                    .with_detail(format!("{} bytes exceeds the {} byte limit", size, max)));
            }
        }

        let new_total = match state.running_total.checked_add(size) {
            Some(total) if total <= self.max_total_size => total,
            _ => {
                return Err(SkipReason::new(file.name, SkipKind::WouldExceedBudget).with_detail(
                    format!(
                        "{} + {} bytes exceeds the {} byte total",
                        state.running_total, size, self.max_total_size
                    ),
                ));
            }
        };

        state.accepted.push(file);
        state.running_total = new_total;
        Ok(state.accepted.len() - 1)
    }
}

//! Intake pipeline: validate → compress → budget.
//!
//! [`IntakeSession`] is the caller-facing entry point. A batch is screened by
//! the [`IntakeValidator`] in selection order, admitted files are compressed
//! concurrently (bounded by `max_concurrent_compressions`), and the results are
//! offered to the [`BudgetAccumulator`] in selection order under a single lock
//! acquisition.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};

use formpix_core::{
    CompressedFile, FileId, IntakeConfig, IntakeError, RawFile, SkipKind, SkipReason,
};

use super::types::BatchReport;
use crate::budget::{BudgetAccumulator, SessionState};
use crate::compression::{CompressionError, Compressor};
use crate::traits::ImageCompression;
use crate::validator::IntakeValidator;

/// Result of compressing one admitted file, tagged with its source.
struct CompressionOutcome {
    id: FileId,
    name: String,
    result: Result<CompressedFile, CompressionError>,
}

/// Attachments of one form session.
pub struct IntakeSession {
    config: IntakeConfig,
    validator: IntakeValidator,
    budget: BudgetAccumulator,
    compressor: Arc<dyn ImageCompression>,
    limiter: Semaphore,
    state: Mutex<SessionState>,
}

impl IntakeSession {
    pub fn new(config: IntakeConfig) -> Result<Self, IntakeError> {
        let compressor = Arc::new(Compressor::from_config(&config));
        Self::with_compressor(config, compressor)
    }

    pub fn with_compressor(
        config: IntakeConfig,
        compressor: Arc<dyn ImageCompression>,
    ) -> Result<Self, IntakeError> {
        config.validate()?;

        Ok(Self {
            validator: IntakeValidator::from_config(&config),
            budget: BudgetAccumulator::from_config(&config),
            limiter: Semaphore::new(config.max_concurrent_compressions),
            state: Mutex::new(SessionState::new()),
            compressor,
            config,
        })
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Run a batch of user-selected files through the pipeline.
    ///
    /// Never fails as a whole: every file ends up accepted, skipped or withdrawn.
    #[tracing::instrument(skip(self, files), fields(batch.size = files.len()))]
    pub async fn submit_batch(&self, files: Vec<RawFile>) -> BatchReport {
        let (admitted, mut skipped) = self.validator.screen_batch(files);

        {
            let mut state = self.state.lock().await;
            for file in &admitted {
                state.mark_pending(file.id);
            }
        }

        let outcomes = join_all(admitted.into_iter().map(|file| self.compress_one(file))).await;

        let mut accepted = Vec::new();
        let mut withdrawn = Vec::new();

        let mut state = self.state.lock().await;
        for outcome in outcomes {
            if !state.take_pending(outcome.id) {
                tracing::debug!(file.name = %outcome.name, "Discarding result of withdrawn file");
                withdrawn.push(outcome.id);
                continue;
            }

            let compressed = match outcome.result {
                Ok(compressed) => compressed,
                Err(e) => {
                    tracing::warn!(
                        file.name = %outcome.name,
                        error = %e,
                        "Image compression failed"
                    );
                    skipped.push(
                        SkipReason::new(outcome.name, SkipKind::CompressionFailed)
                            .with_detail(e.to_string()),
                    );
                    continue;
                }
            };

            let size = compressed.byte_size();
            match self.budget.offer(&mut state, compressed) {
                Ok(index) => {
                    tracing::debug!(
                        file.name = %outcome.name,
                        file.size = size,
                        running_total = state.running_total(),
                        "File accepted"
                    );
                    accepted.push(state.accepted()[index].clone());
                }
                Err(mut skip) => {
                    // Report under the name the user selected.
                    skip.file_name = outcome.name;
                    tracing::debug!(
                        file.name = %skip.file_name,
                        file.size = size,
                        reason = skip.reason.as_str(),
                        running_total = state.running_total(),
                        "File rejected by budget"
                    );
                    skipped.push(skip);
                }
            }
        }
        let running_total = state.running_total();
        drop(state);

        tracing::info!(
            accepted = accepted.len(),
            skipped = skipped.len(),
            withdrawn = withdrawn.len(),
            running_total = running_total,
            "Batch processed"
        );

        BatchReport {
            accepted,
            skipped,
            withdrawn,
            running_total,
        }
    }

    async fn compress_one(&self, file: RawFile) -> CompressionOutcome {
        let id = file.id;
        let name = file.name.clone();

        let result = match self.limiter.acquire().await {
            Ok(permit) => {
                let result = self.compressor.compress(file).await;
                drop(permit);
                result
            }
            Err(e) => Err(CompressionError::Worker(e.to_string())),
        };

        CompressionOutcome { id, name, result }
    }

    /// Cancel a file that is still being compressed. Its result will be
    /// discarded. Returns false if the file is not in flight.
    pub async fn withdraw(&self, id: FileId) -> bool {
        let withdrawn = self.state.lock().await.withdraw(id);
        if withdrawn {
            tracing::debug!(file.id = %id, "File withdrawn");
        }
        withdrawn
    }

    pub async fn remove_accepted(&self, index: usize) -> Result<CompressedFile, IntakeError> {
        let mut state = self.state.lock().await;
        let removed = state.remove(index)?;
        tracing::debug!(
            file.name = %removed.name,
            file.size = removed.byte_size(),
            running_total = state.running_total(),
            "Accepted file removed"
        );
        Ok(removed)
    }

    pub async fn remove_by_id(&self, id: FileId) -> Option<CompressedFile> {
        self.state.lock().await.remove_by_id(id)
    }

    /// Remove every accepted file in `ids` under one lock, returning how many
    /// were still present. Files accepted since `ids` was taken are kept.
    pub async fn remove_files(&self, ids: &[FileId]) -> usize {
        let mut state = self.state.lock().await;
        let removed = ids
            .iter()
            .filter(|id| state.remove_by_id(**id).is_some())
            .count();
        tracing::debug!(
            removed = removed,
            running_total = state.running_total(),
            "Accepted files removed"
        );
        removed
    }

    /// Snapshot of the accepted files, in acceptance order.
    pub async fn accepted_files(&self) -> Vec<CompressedFile> {
        self.state.lock().await.accepted().to_vec()
    }

    pub async fn running_total(&self) -> u64 {
        self.state.lock().await.running_total()
    }

    pub async fn is_pending(&self, id: FileId) -> bool {
        self.state.lock().await.is_pending(id)
    }

    /// Clear accepted files, the running total and in-flight work.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
        tracing::debug!("Intake session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let config = IntakeConfig {
            target_quality: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            IntakeSession::new(config),
            Err(IntakeError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let session = IntakeSession::new(IntakeConfig::default()).unwrap();
        let report = session.submit_batch(Vec::new()).await;

        assert!(report.accepted.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(report.running_total, 0);
        assert_eq!(report.skip_notice(), None);
    }

    #[tokio::test]
    async fn test_remove_from_empty_session() {
        let session = IntakeSession::new(IntakeConfig::default()).unwrap();
        let err = session.remove_accepted(0).await.unwrap_err();
        assert!(matches!(err, IntakeError::IndexOutOfRange { index: 0, len: 0 }));
        assert!(!session.withdraw(FileId::new()).await);
    }
}

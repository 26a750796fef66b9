//! Trait seams for the intake pipeline.

use async_trait::async_trait;
use formpix_core::{CompressedFile, RawFile};

use crate::compression::CompressionError;

/// Turns one admitted file into its compressed replacement.
///
/// Each call is independent: a failure for one file has no effect on
/// any other call, and implementations must not touch session state.
#[async_trait]
pub trait ImageCompression: Send + Sync {
    async fn compress(&self, file: RawFile) -> Result<CompressedFile, CompressionError>;
}

use formpix_core::{IntakeConfig, RawFile, SkipKind, SkipReason};

/// Intake screening errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Not an image: {media_type:?}")]
    NotAnImage { media_type: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    RawTooLarge { size: u64, max: u64 },
}

impl ValidationError {
    pub fn skip_kind(&self) -> SkipKind {
        match self {
            ValidationError::NotAnImage { .. } => SkipKind::NotAnImage,
            ValidationError::RawTooLarge { .. } => SkipKind::RawTooLarge,
        }
    }
}

/// Intake validator
///
/// Decides whether a selected file may go to the compressor. Pure: it never
/// looks at session state and never touches the payload beyond its length.
#[derive(Debug, Clone)]
pub struct IntakeValidator {
    max_raw_file_size: u64,
}

impl IntakeValidator {
    pub fn new(max_raw_file_size: u64) -> Self {
        Self { max_raw_file_size }
    }

    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(config.max_raw_file_size)
    }

    /// Validate media type
    pub fn validate_media_type(&self, file: &RawFile) -> Result<(), ValidationError> {
        if !file.is_image() {
            return Err(ValidationError::NotAnImage {
                media_type: file.media_type.clone(),
            });
        }
        Ok(())
    }

    /// Validate file size. Zero-byte files pass here and fail at decode.
    pub fn validate_file_size(&self, file: &RawFile) -> Result<(), ValidationError> {
        let size = file.byte_size();
        if size > self.max_raw_file_size {
            return Err(ValidationError::RawTooLarge {
                size,
                max: self.max_raw_file_size,
            });
        }
        Ok(())
    }

    pub fn validate(&self, file: &RawFile) -> Result<(), ValidationError> {
        self.validate_media_type(file)?;
        self.validate_file_size(file)?;
        Ok(())
    }

    /// Screen a whole selection in order. A rejection never stops the rest of
    /// the batch from being screened.
    pub fn screen_batch(&self, files: Vec<RawFile>) -> (Vec<RawFile>, Vec<SkipReason>) {
        let mut admitted = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();

        for file in files {
            match self.validate(&file) {
                Ok(()) => {
                    tracing::debug!(
                        file.name = %file.name,
                        file.size = file.byte_size(),
                        "File admitted to compression"
                    );
                    admitted.push(file);
                }
                Err(e) => {
                    tracing::debug!(file.name = %file.name, error = %e, "File rejected at intake");
                    skipped.push(SkipReason::new(file.name, e.skip_kind()));
                }
            }
        }

        (admitted, skipped)
    }
}

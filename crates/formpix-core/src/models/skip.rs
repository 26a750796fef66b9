use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a file did not reach the accepted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    NotAnImage,
    RawTooLarge,
    StillTooLargeAfterCompression,
    WouldExceedBudget,
    CompressionFailed,
}

impl SkipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipKind::NotAnImage => "not_an_image",
            SkipKind::RawTooLarge => "raw_too_large",
            SkipKind::StillTooLargeAfterCompression => "still_too_large_after_compression",
            SkipKind::WouldExceedBudget => "would_exceed_budget",
            SkipKind::CompressionFailed => "compression_failed",
        }
    }

    /// Short phrase used in the consolidated skip notice.
    pub fn describe(&self) -> &'static str {
        match self {
            SkipKind::NotAnImage => "not an image",
            SkipKind::RawTooLarge => "file too large",
            SkipKind::StillTooLargeAfterCompression => "still too large after compression",
            SkipKind::WouldExceedBudget => "total attachment size limit reached",
            SkipKind::CompressionFailed => "could not be processed",
        }
    }
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Per-file rejection record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    pub file_name: String,
    pub reason: SkipKind,
    /// Underlying decode/encode error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SkipReason {
    pub fn new(file_name: impl Into<String>, reason: SkipKind) -> Self {
        Self {
            file_name: file_name.into(),
            reason,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SkipKind::StillTooLargeAfterCompression).unwrap();
        assert_eq!(json, "\"still_too_large_after_compression\"");
        assert_eq!(
            SkipKind::StillTooLargeAfterCompression.as_str(),
            "still_too_large_after_compression"
        );
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::new("notes.txt", SkipKind::NotAnImage);
        assert_eq!(reason.to_string(), "notes.txt (not an image)");
    }

    #[test]
    fn test_detail_omitted_when_absent() {
        let reason = SkipReason::new("a.jpg", SkipKind::WouldExceedBudget);
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["reason"], "would_exceed_budget");
        assert!(json.get("detail").is_none());

        let reason =
            SkipReason::new("b.jpg", SkipKind::CompressionFailed).with_detail("bad huffman table");
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["detail"], "bad huffman table");
    }
}

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::IMAGE_MEDIA_TYPE_PREFIX;

/// Identity of a user-selected file, carried over to its compressed replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A file as selected by the user, before validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub id: FileId,
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            id: FileId::new(),
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the declared media type follows the `image/` convention.
    pub fn is_image(&self) -> bool {
        let media_type = self.media_type.trim();
        media_type.len() > IMAGE_MEDIA_TYPE_PREFIX.len()
            && media_type
                .get(..IMAGE_MEDIA_TYPE_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_MEDIA_TYPE_PREFIX))
    }
}

/// Re-encoded, size-reduced replacement for an accepted raw file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedFile {
    /// Id of the raw file this was produced from.
    pub id: FileId,
    pub name: String,
    pub media_type: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Bytes,
}

impl CompressedFile {
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size_follows_payload() {
        let file = RawFile::new("photo.jpg", "image/jpeg", vec![0u8; 1234]);
        assert_eq!(file.byte_size(), 1234);

        let empty = RawFile::new("empty.png", "image/png", Vec::new());
        assert_eq!(empty.byte_size(), 0);
    }

    #[test]
    fn test_is_image() {
        assert!(RawFile::new("a.jpg", "image/jpeg", Vec::new()).is_image());
        assert!(RawFile::new("a.png", "IMAGE/PNG", Vec::new()).is_image());
        assert!(!RawFile::new("a.txt", "text/plain", Vec::new()).is_image());
        assert!(!RawFile::new("a", "", Vec::new()).is_image());
        assert!(!RawFile::new("a", "image/", Vec::new()).is_image());
        assert!(!RawFile::new("a", "imagery/png", Vec::new()).is_image());
    }

    #[test]
    fn test_file_ids_are_unique() {
        let a = RawFile::new("a.jpg", "image/jpeg", Vec::new());
        let b = RawFile::new("a.jpg", "image/jpeg", Vec::new());
        assert_ne!(a.id, b.id);
    }
}

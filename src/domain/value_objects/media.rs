//! Media kinds and the MIME types accepted for each.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an uploaded object. Determines the storage key prefix,
/// the MIME allow-list and the size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/avif", "avif"),
];

const AUDIO_TYPES: &[(&str, &str)] = &[
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "m4a"),
    ("audio/x-m4a", "m4a"),
    ("audio/aac", "aac"),
    ("audio/flac", "flac"),
    ("audio/x-flac", "flac"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/ogg", "ogg"),
];

impl MediaKind {
    /// Storage key prefix for this kind.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Audio => "audio",
        }
    }

    fn allowed(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Image => IMAGE_TYPES,
            Self::Audio => AUDIO_TYPES,
        }
    }

    /// File extension for an accepted MIME type, `None` if not accepted.
    ///
    /// Parameters such as `; charset=...` are ignored.
    pub fn extension_for(&self, content_type: &str) -> Option<&'static str> {
        let essence = mime_essence(content_type);
        self.allowed()
            .iter()
            .find(|(mime, _)| *mime == essence)
            .map(|(_, ext)| *ext)
    }

    /// Whether the MIME type is accepted for this kind.
    pub fn accepts(&self, content_type: &str) -> bool {
        self.extension_for(content_type).is_some()
    }

    /// Whether a storage key was issued for this kind.
    pub fn owns_key(&self, key: &str) -> bool {
        key.strip_prefix(self.key_prefix())
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| !rest.is_empty() && !rest.contains(".."))
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased MIME type without parameters.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(MediaKind::Image, "image/jpeg", Some("jpg"))]
    #[test_case(MediaKind::Image, "IMAGE/PNG", Some("png"))]
    #[test_case(MediaKind::Image, "image/svg+xml", None)]
    #[test_case(MediaKind::Audio, "audio/mpeg", Some("mp3"))]
    #[test_case(MediaKind::Audio, "audio/flac; rate=44100", Some("flac"))]
    #[test_case(MediaKind::Audio, "video/mp4", None)]
    #[test_case(MediaKind::Audio, "image/png", None)]
    fn test_extension_for(kind: MediaKind, mime: &str, expected: Option<&str>) {
        assert_eq!(kind.extension_for(mime), expected);
    }

    #[test]
    fn test_owns_key() {
        assert!(MediaKind::Image.owns_key("images/2024/05/abc.png"));
        assert!(!MediaKind::Image.owns_key("audio/2024/05/abc.mp3"));
        assert!(!MediaKind::Image.owns_key("images/"));
        assert!(!MediaKind::Image.owns_key("imagesx/a.png"));
        assert!(!MediaKind::Audio.owns_key("audio/../secret"));
    }

    #[test]
    fn test_serde_lowercase() {
        let kind: MediaKind = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(kind, MediaKind::Audio);
        assert_eq!(serde_json::to_string(&MediaKind::Image).unwrap(), "\"image\"");
    }
}

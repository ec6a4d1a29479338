//! Asset kind classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse media category derived from an asset's MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// `image/*`
    Image,
    /// `video/*`
    Video,
    /// `audio/*`
    Audio,
    /// PDFs, office documents and plain text.
    Document,
    /// Anything else.
    Unknown,
}

impl AssetKind {
    /// Classify a MIME type string.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        match mime.split('/').next().unwrap_or_default() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Document,
            "application"
                if mime == "application/pdf"
                    || mime == "application/msword"
                    || mime.contains("officedocument")
                    || mime.contains("opendocument") =>
            {
                Self::Document
            }
            _ => Self::Unknown,
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

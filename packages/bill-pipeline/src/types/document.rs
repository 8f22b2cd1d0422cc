//! Input documents handed to the Extractor.

use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DocumentError, DocumentResult};

/// Media types the delegate can read inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl MediaType {
    /// All recognized media types.
    pub const ALL: [MediaType; 5] = [
        MediaType::Pdf,
        MediaType::Png,
        MediaType::Jpeg,
        MediaType::Gif,
        MediaType::Webp,
    ];

    /// MIME string sent to the delegate.
    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Page images travel as image blocks; everything else as a document.
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Parse a MIME string, ignoring parameters and case.
    pub fn from_mime(mime: &str) -> DocumentResult<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(Self::Jpeg),
            "image/gif" => Ok(Self::Gif),
            "image/webp" => Ok(Self::Webp),
            _ => Err(DocumentError::UnsupportedMediaType(mime.to_string())),
        }
    }

    /// Guess from a file extension.
    pub fn from_path(path: &Path) -> DocumentResult<Self> {
        let guess = mime_guess::from_path(path);
        guess
            .iter_raw()
            .find_map(|mime| Self::from_mime(mime).ok())
            .ok_or_else(|| DocumentError::UnsupportedMediaType(path.display().to_string()))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

impl FromStr for MediaType {
    type Err = DocumentError;

    /// Accepts a short name (`pdf`, `jpg`, ...) or a MIME string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::Webp),
            _ => Self::from_mime(s),
        }
    }
}

/// Opaque bill payload plus its declared media type.
///
/// Construction validates the payload, so every `RawDocument` in circulation
/// is non-empty with a recognized media type. The bytes are reference-counted
/// and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Bytes,
    media_type: MediaType,
}

impl RawDocument {
    /// Wrap a payload.
    pub fn new(bytes: impl Into<Bytes>, media_type: MediaType) -> DocumentResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Self { bytes, media_type })
    }

    /// Wrap a payload with a MIME string (e.g. from an upload form).
    pub fn with_mime(bytes: impl Into<Bytes>, mime: &str) -> DocumentResult<Self> {
        Self::new(bytes, MediaType::from_mime(mime)?)
    }

    /// Read a file, taking the media type from `media_type` or the extension.
    pub async fn load(path: impl AsRef<Path>, media_type: Option<MediaType>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let media_type = match media_type {
            Some(media_type) => media_type,
            None => MediaType::from_path(path)?,
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DocumentError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::new(bytes, media_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Payload size in bytes (always > 0).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

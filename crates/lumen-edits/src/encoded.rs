//! Images in their encoded string form (`data:<mime>;base64,<payload>`).
//!
//! The source image, every rendered working image, and every request
//! body carry images this way. The string is reference-counted so
//! snapshots handed to requests and UI components are cheap to clone.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// MIME type assumed when a data URL's format cannot be mapped back to
/// a file extension.
pub const DEFAULT_MIME: &str = "image/png";

/// Errors that can occur when building or decoding an [`EncodedImage`].
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// No bytes (or an empty payload) were supplied.
    #[error("image data is empty")]
    EmptyInput,

    /// The bytes are not in a recognized image format.
    #[error("unrecognized image format")]
    UnknownFormat,

    /// The string is not a base64 `data:` URL.
    #[error("not a base64 data URL: {0}")]
    InvalidDataUrl(String),

    /// The base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A validated base64 data URL holding one image.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedImage(Arc<str>);

impl EncodedImage {
    /// Encode raw image file bytes, sniffing the MIME type from the
    /// file's magic bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::EmptyInput`] if `bytes` is empty.
    /// Returns [`ImageError::UnknownFormat`] if the format is not recognized.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::EmptyInput);
        }
        let format = image::guess_format(bytes).map_err(|_| ImageError::UnknownFormat)?;
        let payload = STANDARD.encode(bytes);
        Ok(Self(
            format!("{DATA_PREFIX}{}{BASE64_MARKER},{payload}", format.to_mime_type()).into(),
        ))
    }

    /// Validate a `data:<mime>;base64,<payload>` string.
    ///
    /// The payload is not decoded here; [`decode`](Self::decode) does that.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDataUrl`] if the header is malformed
    /// or the MIME type is not an image type.
    /// Returns [`ImageError::EmptyInput`] if the payload is empty.
    pub fn parse(data_url: &str) -> Result<Self, ImageError> {
        let (mime, payload) = split_data_url(data_url)?;
        if !mime.starts_with("image/") {
            return Err(ImageError::InvalidDataUrl(format!(
                "unsupported MIME type {mime:?}"
            )));
        }
        if payload.is_empty() {
            return Err(ImageError::EmptyInput);
        }
        Ok(Self(data_url.into()))
    }

    /// Accept an image string as returned by the backend.
    ///
    /// Full data URLs are validated as-is. A bare base64 payload is
    /// wrapped in a data URL using `fallback_mime`.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn from_backend(value: &str, fallback_mime: &str) -> Result<Self, ImageError> {
        let value = value.trim();
        if value.starts_with(DATA_PREFIX) {
            Self::parse(value)
        } else {
            Self::parse(&format!("{DATA_PREFIX}{fallback_mime}{BASE64_MARKER},{value}"))
        }
    }

    /// The full data URL, suitable for an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The MIME type from the header, e.g. `image/png`.
    #[must_use]
    pub fn mime(&self) -> &str {
        split_data_url(&self.0).map_or(DEFAULT_MIME, |(mime, _)| mime)
    }

    /// The base64 payload after the comma.
    #[must_use]
    pub fn payload(&self) -> &str {
        split_data_url(&self.0).map_or("", |(_, payload)| payload)
    }

    /// Decode the payload into the raw image file bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Base64`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, ImageError> {
        Ok(STANDARD.decode(self.payload())?)
    }

    /// Conventional file extension for the MIME type (`png` if unknown).
    #[must_use]
    pub fn file_extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(self.mime())
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }
}

/// Split a data URL into `(mime, payload)`.
fn split_data_url(data_url: &str) -> Result<(&str, &str), ImageError> {
    let rest = data_url
        .strip_prefix(DATA_PREFIX)
        .ok_or_else(|| ImageError::InvalidDataUrl("missing `data:` prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::InvalidDataUrl("missing `,` separator".into()))?;
    let mime = header
        .strip_suffix(BASE64_MARKER)
        .ok_or_else(|| ImageError::InvalidDataUrl("payload is not base64".into()))?;
    if mime.is_empty() || !mime.contains('/') {
        return Err(ImageError::InvalidDataUrl(format!(
            "invalid MIME type {mime:?}"
        )));
    }
    Ok((mime, payload))
}

impl fmt::Debug for EncodedImage {
    // Payloads run to megabytes; keep debug output readable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime())
            .field("len", &self.0.len())
            .finish()
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} image ({} bytes encoded)", self.mime(), self.0.len())
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = ImageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EncodedImage> for String {
    fn from(value: EncodedImage) -> Self {
        value.0.to_string()
    }
}

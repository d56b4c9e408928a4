//! Saving the working image via Blob URLs.
//!
//! Dioxus has no built-in file download API. The image's base64 payload
//! is decoded to raw bytes, wrapped in a `Blob`, and handed to a
//! temporary `<a download>` element that is clicked programmatically.
//!
//! [`trigger_download`] and [`save_image`] require a browser environment
//! (`wasm32-unknown-unknown` target).

use lumen_edits::{EncodedImage, ImageError};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when saving an image.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Nothing has been uploaded yet.
    #[error("no image loaded")]
    NoImage,

    /// The image payload could not be decoded.
    #[error("image could not be decoded: {0}")]
    Image(#[from] ImageError),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Name of the saved file: `<stem>-edited.<ext>`, with the extension
/// taken from the image's MIME type.
#[must_use]
pub fn download_filename(stem: &str, image: &EncodedImage) -> String {
    let stem = if stem.is_empty() { "image" } else { stem };
    format!("{stem}-edited.{}", image.file_extension())
}

/// Decode `image` and download it as `<stem>-edited.<ext>`.
///
/// # Errors
///
/// Returns [`DownloadError::NoImage`] when `image` is `None`, and the
/// other variants if decoding or a browser call fails.
pub fn save_image(image: Option<&EncodedImage>, stem: &str) -> Result<(), DownloadError> {
    let image = image.ok_or(DownloadError::NoImage)?;
    let bytes = image.decode()?;
    let filename = download_filename(stem, image);
    trigger_download(&bytes, &filename, image.mime())?;
    tracing::info!(%filename, bytes = bytes.len(), "image saved");
    Ok(())
}

/// Trigger a file download of `data` in the browser.
///
/// Creates a `Blob` from `data`, generates an object URL, and
/// programmatically clicks a temporary `<a download="filename">` element.
/// The object URL is revoked after the click.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (e.g., `Blob` creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(data));

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(&url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download has already started; cleanup failures are not errors.
    let _ = body.remove_child(&anchor);
    let _ = web_sys::Url::revoke_object_url(&url);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filename_follows_mime_type() {
        let jpeg = EncodedImage::parse("data:image/jpeg;base64,AAAA").unwrap();
        assert_eq!(download_filename("holiday", &jpeg), "holiday-edited.jpg");

        let webp = EncodedImage::parse("data:image/webp;base64,AAAA").unwrap();
        assert_eq!(download_filename("", &webp), "image-edited.webp");
    }

    #[test]
    fn saving_nothing_is_a_user_error() {
        assert!(matches!(save_image(None, "x"), Err(DownloadError::NoImage)));
    }
}

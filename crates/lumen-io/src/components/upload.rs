//! Image upload with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use lumen_edits::EncodedImage;

/// Allowed file extensions for image uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Check whether a filename has an allowed image extension.
fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    })
}

/// Errors that can occur when reading an uploaded file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The file extension is not an image type we accept.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// The browser could not read the file.
    #[error("failed to read file: {0}")]
    Read(String),

    /// The bytes are not a recognizable image.
    #[error("not a usable image: {0}")]
    Image(#[from] lumen_edits::ImageError),
}

/// A successfully read upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// The image as a data URL.
    pub image: EncodedImage,
    /// Original filename, including extension.
    pub filename: String,
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Called with the encoded image after a successful upload.
    on_upload: EventHandler<Upload>,
}

async fn read_upload(file: &FileData) -> Result<Upload, UploadError> {
    let filename = file.name();
    if !has_allowed_extension(&filename) {
        return Err(UploadError::UnsupportedType(filename));
    }
    let bytes = file
        .read_bytes()
        .await
        .map_err(|e| UploadError::Read(e.to_string()))?;
    let image = EncodedImage::from_bytes(&bytes)?;
    Ok(Upload { image, filename })
}

/// A drag-and-drop zone with a file picker button.
///
/// Accepts PNG, JPEG, GIF, BMP, and WebP images. The first selected
/// file is encoded as a data URL and passed to `on_upload`.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut filename = use_signal(|| Option::<String>::None);
    let mut error = use_signal(|| Option::<String>::None);

    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        match read_upload(file).await {
            Ok(upload) => {
                tracing::info!(filename = %upload.filename, image = %upload.image, "file uploaded");
                filename.set(Some(upload.filename.clone()));
                error.set(None);
                props.on_upload.call(upload);
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload rejected");
                error.set(Some(e.to_string()));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "upload upload-active"
    } else {
        "upload"
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref name) = filename() {
                p { class: "upload-loaded", "Loaded: {name}" }
            }

            if let Some(ref err) = error() {
                p { class: "error-text", "{err}" }
            }

            label { class: "button button-primary",
                input {
                    r#type: "file",
                    accept: ".png,.jpg,.jpeg,.gif,.bmp,.webp",
                    class: "hidden",
                    onchange: handle_files,
                }
                "Choose Image"
            }
            p { class: "upload-hint", "or drop one here (PNG, JPEG, GIF, BMP, WebP)" }
        }
    }
}

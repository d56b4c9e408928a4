//! Working image preview.

use dioxus::prelude::*;
use lumen_edits::EncodedImage;

/// Props for the [`Preview`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PreviewProps {
    /// The image to show; `None` before any upload.
    image: Option<EncodedImage>,
    /// A render is in flight; the shown image may be outdated.
    pending: bool,
}

/// Shows the current working image, dimmed while a newer render is on
/// its way.
#[component]
pub fn Preview(props: PreviewProps) -> Element {
    let Some(image) = props.image else {
        return rsx! {
            div { class: "preview preview-empty",
                p { "Upload an image to start editing." }
            }
        };
    };

    let src = String::from(image);
    let class = if props.pending {
        "preview preview-pending"
    } else {
        "preview"
    };

    rsx! {
        div { class: "{class}",
            img { src: "{src}", alt: "Edited image" }
            if props.pending {
                p { class: "preview-status", "Rendering..." }
            }
        }
    }
}

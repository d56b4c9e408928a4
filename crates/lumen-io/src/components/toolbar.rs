//! Save, print and histogram toggle buttons.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdDownload, LdEye, LdEyeOff, LdPrinter};

/// Props for the [`Toolbar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ToolbarProps {
    /// Whether the histogram is currently shown.
    histogram_visible: bool,
    /// Save the working image.
    on_save: EventHandler<()>,
    /// Print the working image.
    on_print: EventHandler<()>,
    /// Show (`true`) or hide (`false`) the histogram.
    on_histogram: EventHandler<bool>,
}

/// Action buttons above the preview.
///
/// Save and print stay enabled without an image so the user gets a
/// notice explaining why nothing happened.
#[component]
pub fn Toolbar(props: ToolbarProps) -> Element {
    let visible = props.histogram_visible;

    rsx! {
        div { class: "toolbar",
            button {
                class: "button",
                title: "Save image",
                onclick: move |_| props.on_save.call(()),
                Icon { width: 16, height: 16, icon: LdDownload }
                "Save"
            }
            button {
                class: "button",
                title: "Print image (Ctrl+P)",
                onclick: move |_| props.on_print.call(()),
                Icon { width: 16, height: 16, icon: LdPrinter }
                "Print"
            }
            button {
                class: if visible { "button button-active" } else { "button" },
                title: "Toggle histogram",
                onclick: move |_| props.on_histogram.call(!visible),
                if visible {
                    Icon { width: 16, height: 16, icon: LdEyeOff }
                    "Hide Histogram"
                } else {
                    Icon { width: 16, height: 16, icon: LdEye }
                    "Show Histogram"
                }
            }
        }
    }
}

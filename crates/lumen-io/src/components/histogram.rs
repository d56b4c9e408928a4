//! Histogram panel hosting the chart canvas.

use dioxus::prelude::*;
use lumen_edits::ColorMode;

/// Element id of the canvas the chart renderer draws into.
pub const HISTOGRAM_CANVAS_ID: &str = "histogram-canvas";

/// Props for the [`HistogramPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct HistogramPanelProps {
    /// Whether the histogram view is shown.
    visible: bool,
    /// A fetch is in flight.
    loading: bool,
    /// Color mode of the data currently charted, if any.
    mode: Option<ColorMode>,
    /// Last fetch or render failure.
    error: Option<String>,
}

/// The canvas is only mounted while visible, so a hidden panel leaves
/// nothing for the renderer to draw into.
#[component]
pub fn HistogramPanel(props: HistogramPanelProps) -> Element {
    if !props.visible {
        return rsx! {};
    }

    let caption = match props.mode {
        Some(ColorMode::Grayscale) => "Grayscale intensity",
        Some(ColorMode::Color) => "Blue, green and red channels",
        None => "",
    };

    rsx! {
        section { class: "histogram",
            h3 { "Histogram" }
            if let Some(ref err) = props.error {
                p { class: "error-text", "{err}" }
            } else if props.loading {
                p { class: "histogram-status", "Computing histogram..." }
            } else if !caption.is_empty() {
                p { class: "histogram-status", "{caption}" }
            }
            div { class: "histogram-chart",
                canvas { id: HISTOGRAM_CANVAS_ID }
            }
        }
    }
}

//! Data contract handed to the external chart renderer.
//!
//! [`ChartConfig`] serializes to the configuration object a Chart.js
//! `new Chart(canvas, config)` call expects. The renderer itself is an
//! opaque collaborator behind the [`ChartRenderer`] trait.

use serde::Serialize;

use crate::histogram::{BUCKETS, HistogramData};

/// A renderer failed to create a chart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("chart renderer failed: {0}")]
pub struct ChartError(pub String);

/// Creates and tears down chart instances.
///
/// Implementations own whatever native resource backs a chart; the
/// [`HistogramPipeline`](crate::HistogramPipeline) guarantees every
/// handle it receives is passed back to [`destroy`](Self::destroy)
/// before another is created.
pub trait ChartRenderer {
    /// A live chart instance.
    type Handle;

    /// Create a chart from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError`] if the underlying renderer is unavailable
    /// or rejects the configuration.
    fn create(&mut self, config: &ChartConfig) -> Result<Self::Handle, ChartError>;

    /// Tear down a chart created by [`create`](Self::create).
    fn destroy(&mut self, handle: Self::Handle);
}

/// Top-level chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    /// Chart type; always `"bar"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Labels and series.
    pub data: ChartData,
    /// Axis options.
    pub options: ChartOptions,
}

/// Bucket labels and the series plotted against them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Bucket indices `0..=255`.
    pub labels: Vec<u16>,
    /// One dataset per channel.
    pub datasets: Vec<Dataset>,
}

/// One plotted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Legend label.
    pub label: &'static str,
    /// Bucket counts.
    pub data: Vec<f64>,
    /// Bar fill color.
    pub background_color: &'static str,
    /// Bar outline color.
    pub border_color: &'static str,
}

/// Chart options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    /// Axis configuration.
    pub scales: Scales,
}

/// Axis configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    /// The shared value axis.
    pub y: ValueAxis,
}

/// The value axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    /// Anchor the axis at zero.
    pub begin_at_zero: bool,
}

impl ChartConfig {
    /// Build the bar chart for one histogram.
    ///
    /// Grayscale data yields a single "Intensity" series; color data
    /// yields blue, green and red series sharing a zero-based axis.
    #[must_use]
    pub fn from_histogram(histogram: &HistogramData) -> Self {
        let datasets = histogram
            .series()
            .into_iter()
            .map(|series| Dataset {
                label: series.label,
                data: series.buckets.to_vec(),
                background_color: series.color,
                border_color: series.color,
            })
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let labels = (0..BUCKETS).map(|i| i as u16).collect();

        Self {
            kind: "bar",
            data: ChartData { labels, datasets },
            options: ChartOptions {
                scales: Scales {
                    y: ValueAxis {
                        begin_at_zero: true,
                    },
                },
            },
        }
    }
}

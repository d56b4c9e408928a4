//! Histogram data and the pipeline that keeps its chart current.
//!
//! The backend answers a histogram request with either one intensity
//! distribution (grayscale images) or three channel distributions
//! (color images). [`HistogramPipeline`] tracks which fetch is current,
//! skips fetching while the view is hidden, and owns the single live
//! chart instance.

use serde::{Deserialize, Serialize};

use crate::chart::{ChartConfig, ChartError, ChartRenderer};
use crate::ticket::{RequestTracker, Ticket};

/// Number of buckets in every distribution.
pub const BUCKETS: usize = 256;

/// A histogram response did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistogramError {
    /// A distribution had the wrong number of buckets.
    #[error("{channel} histogram has {len} buckets, expected {BUCKETS}")]
    BucketCount {
        /// Which distribution was wrong.
        channel: &'static str,
        /// How many buckets it had.
        len: usize,
    },
}

/// Color mode implied by a histogram's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Single intensity channel.
    Grayscale,
    /// Blue, green and red channels.
    Color,
}

/// Bucket counts for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistogram", into = "RawHistogram")]
pub enum HistogramData {
    /// One 256-bucket intensity distribution.
    Intensity(Vec<f64>),
    /// Three 256-bucket channel distributions.
    Channels {
        /// Blue channel.
        blue: Vec<f64>,
        /// Green channel.
        green: Vec<f64>,
        /// Red channel.
        red: Vec<f64>,
    },
}

/// One labelled distribution, as plotted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Series<'a> {
    /// Legend label.
    pub label: &'static str,
    /// CSS color name.
    pub color: &'static str,
    /// Bucket counts.
    pub buckets: &'a [f64],
}

impl HistogramData {
    /// Grayscale for a single distribution, color for three.
    #[must_use]
    pub const fn mode(&self) -> ColorMode {
        match self {
            Self::Intensity(_) => ColorMode::Grayscale,
            Self::Channels { .. } => ColorMode::Color,
        }
    }

    /// Distributions in plotting order (blue, green, red for color).
    #[must_use]
    pub fn series(&self) -> Vec<Series<'_>> {
        match self {
            Self::Intensity(buckets) => vec![Series {
                label: "Intensity",
                color: "gray",
                buckets,
            }],
            Self::Channels { blue, green, red } => vec![
                Series {
                    label: "Blue Channel",
                    color: "blue",
                    buckets: blue,
                },
                Series {
                    label: "Green Channel",
                    color: "green",
                    buckets: green,
                },
                Series {
                    label: "Red Channel",
                    color: "red",
                    buckets: red,
                },
            ],
        }
    }

    /// Number of pixels counted, taken from the first distribution.
    #[must_use]
    pub fn pixel_count(&self) -> f64 {
        self.series()
            .first()
            .map_or(0.0, |series| series.buckets.iter().sum())
    }
}

/// Wire shape: `{"hist": [..]}` or `{"hist_blue","hist_green","hist_red"}`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawHistogram {
    Channels {
        hist_blue: Vec<f64>,
        hist_green: Vec<f64>,
        hist_red: Vec<f64>,
    },
    Intensity {
        hist: Vec<f64>,
    },
}

fn check_buckets(channel: &'static str, buckets: &[f64]) -> Result<(), HistogramError> {
    if buckets.len() == BUCKETS {
        Ok(())
    } else {
        Err(HistogramError::BucketCount {
            channel,
            len: buckets.len(),
        })
    }
}

impl TryFrom<RawHistogram> for HistogramData {
    type Error = HistogramError;

    fn try_from(raw: RawHistogram) -> Result<Self, Self::Error> {
        match raw {
            RawHistogram::Intensity { hist } => {
                check_buckets("intensity", &hist)?;
                Ok(Self::Intensity(hist))
            }
            RawHistogram::Channels {
                hist_blue,
                hist_green,
                hist_red,
            } => {
                check_buckets("blue", &hist_blue)?;
                check_buckets("green", &hist_green)?;
                check_buckets("red", &hist_red)?;
                Ok(Self::Channels {
                    blue: hist_blue,
                    green: hist_green,
                    red: hist_red,
                })
            }
        }
    }
}

impl From<HistogramData> for RawHistogram {
    fn from(data: HistogramData) -> Self {
        match data {
            HistogramData::Intensity(hist) => Self::Intensity { hist },
            HistogramData::Channels { blue, green, red } => Self::Channels {
                hist_blue: blue,
                hist_green: green,
                hist_red: red,
            },
        }
    }
}

/// What happened to a completed histogram fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistogramOutcome<E> {
    /// A newer fetch was issued (or the view hidden) since; discarded.
    Stale,
    /// The fetch failed; the previous chart was torn down.
    Failed(E),
    /// A fresh chart was created from the data.
    Rendered,
    /// The data arrived but the renderer could not draw it.
    RenderFailed(ChartError),
}

/// Fetch bookkeeping and chart ownership for the histogram view.
///
/// At most one chart handle is alive at a time. It is destroyed before a
/// replacement is created, when the view is hidden, and when the
/// pipeline is dropped.
pub struct HistogramPipeline<R: ChartRenderer> {
    renderer: R,
    chart: Option<R::Handle>,
    tracker: RequestTracker,
    visible: bool,
    data: Option<HistogramData>,
}

impl<R: ChartRenderer> HistogramPipeline<R> {
    /// A hidden pipeline drawing through `renderer`.
    pub const fn new(renderer: R) -> Self {
        Self {
            renderer,
            chart: None,
            tracker: RequestTracker::new(),
            visible: false,
            data: None,
        }
    }

    /// Whether the histogram view is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a chart instance is currently alive.
    #[must_use]
    pub const fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    /// Data behind the current chart, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&HistogramData> {
        self.data.as_ref()
    }

    /// Whether a fetch has been issued and not yet completed.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.tracker.current().is_some()
    }

    /// Mark the view visible. The caller then issues a [`request`](Self::request).
    pub const fn show(&mut self) {
        self.visible = true;
    }

    /// Hide the view: tear down the chart, drop its data, and supersede
    /// any in-flight fetch.
    pub fn hide(&mut self) {
        self.visible = false;
        self.tracker.invalidate();
        self.data = None;
        self.release();
    }

    /// Start a fetch for the current working image.
    ///
    /// Returns `None` while hidden: no fetch should be sent.
    pub fn request(&mut self) -> Option<Ticket> {
        if !self.visible {
            return None;
        }
        let ticket = self.tracker.issue();
        tracing::debug!(%ticket, "histogram fetch issued");
        Some(ticket)
    }

    /// Feed the result of the fetch issued with `ticket`.
    pub fn complete<E>(
        &mut self,
        ticket: Ticket,
        result: Result<HistogramData, E>,
    ) -> HistogramOutcome<E> {
        if !self.tracker.is_current(ticket) {
            tracing::debug!(%ticket, "discarding stale histogram");
            return HistogramOutcome::Stale;
        }
        self.tracker.invalidate();
        self.release();
        match result {
            Err(e) => {
                self.data = None;
                HistogramOutcome::Failed(e)
            }
            Ok(data) => {
                let config = ChartConfig::from_histogram(&data);
                self.data = Some(data);
                match self.renderer.create(&config) {
                    Ok(handle) => {
                        self.chart = Some(handle);
                        HistogramOutcome::Rendered
                    }
                    Err(e) => HistogramOutcome::RenderFailed(e),
                }
            }
        }
    }

    fn release(&mut self) {
        if let Some(handle) = self.chart.take() {
            self.renderer.destroy(handle);
        }
    }
}

impl<R: ChartRenderer> Drop for HistogramPipeline<R> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Counts live charts so tests can assert no instance leaks.
    #[derive(Default)]
    struct Ledger {
        live: usize,
        created: usize,
        configs: Vec<ChartConfig>,
    }

    struct FakeRenderer {
        ledger: Rc<RefCell<Ledger>>,
        fail: bool,
    }

    impl ChartRenderer for FakeRenderer {
        type Handle = usize;

        fn create(&mut self, config: &ChartConfig) -> Result<usize, ChartError> {
            if self.fail {
                return Err(ChartError("no canvas".into()));
            }
            let mut ledger = self.ledger.borrow_mut();
            assert_eq!(ledger.live, 0, "previous chart must be destroyed first");
            ledger.live += 1;
            ledger.created += 1;
            ledger.configs.push(config.clone());
            Ok(ledger.created)
        }

        fn destroy(&mut self, _handle: usize) {
            self.ledger.borrow_mut().live -= 1;
        }
    }

    fn pipeline() -> (HistogramPipeline<FakeRenderer>, Rc<RefCell<Ledger>>) {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let renderer = FakeRenderer {
            ledger: Rc::clone(&ledger),
            fail: false,
        };
        (HistogramPipeline::new(renderer), ledger)
    }

    fn gray(fill: f64) -> HistogramData {
        HistogramData::Intensity(vec![fill; BUCKETS])
    }

    #[test]
    fn parses_both_wire_shapes() {
        let single = format!("{{\"hist\": {:?}}}", vec![0.0; BUCKETS]);
        let data: HistogramData = serde_json::from_str(&single).unwrap();
        assert_eq!(data.mode(), ColorMode::Grayscale);

        let zeros = format!("{:?}", vec![1.0; BUCKETS]);
        let triple =
            format!("{{\"hist_blue\": {zeros}, \"hist_green\": {zeros}, \"hist_red\": {zeros}}}");
        let data: HistogramData = serde_json::from_str(&triple).unwrap();
        assert_eq!(data.mode(), ColorMode::Color);
        assert_eq!(data.series().len(), 3);
        assert!((data.pixel_count() - 256.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_wrong_bucket_count() {
        let err = serde_json::from_str::<HistogramData>(r#"{"hist": [1, 2, 3]}"#).unwrap_err();
        assert!(err.to_string().contains("3 buckets"), "unexpected: {err}");
    }

    #[test]
    fn hidden_view_skips_fetch() {
        let (mut pipeline, ledger) = pipeline();
        assert_eq!(pipeline.request(), None);
        assert_eq!(ledger.borrow().created, 0);
    }

    #[test]
    fn renders_and_replaces_single_chart() {
        let (mut pipeline, ledger) = pipeline();
        pipeline.show();

        let first = pipeline.request().unwrap();
        assert_eq!(
            pipeline.complete::<()>(first, Ok(gray(1.0))),
            HistogramOutcome::Rendered
        );
        let second = pipeline.request().unwrap();
        assert_eq!(
            pipeline.complete::<()>(second, Ok(gray(2.0))),
            HistogramOutcome::Rendered
        );

        let ledger = ledger.borrow();
        assert_eq!(ledger.created, 2);
        assert_eq!(ledger.live, 1);
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let (mut pipeline, ledger) = pipeline();
        pipeline.show();
        let old = pipeline.request().unwrap();
        let new = pipeline.request().unwrap();

        assert_eq!(
            pipeline.complete::<()>(new, Ok(gray(2.0))),
            HistogramOutcome::Rendered
        );
        assert_eq!(
            pipeline.complete::<()>(old, Ok(gray(1.0))),
            HistogramOutcome::Stale
        );
        assert_eq!(pipeline.data(), Some(&gray(2.0)));
        assert_eq!(ledger.borrow().created, 1);
    }

    #[test]
    fn hide_tears_down_and_supersedes() {
        let (mut pipeline, ledger) = pipeline();
        pipeline.show();
        let ticket = pipeline.request().unwrap();
        let _ = pipeline.complete::<()>(ticket, Ok(gray(1.0)));
        let in_flight = pipeline.request().unwrap();

        pipeline.hide();
        assert_eq!(ledger.borrow().live, 0);
        assert!(pipeline.data().is_none());
        assert_eq!(
            pipeline.complete::<()>(in_flight, Ok(gray(3.0))),
            HistogramOutcome::Stale
        );
        assert_eq!(ledger.borrow().live, 0);
    }

    #[test]
    fn reshowing_does_not_revive_fetch_from_before_hide() {
        let (mut pipeline, ledger) = pipeline();
        pipeline.show();
        let before_hide = pipeline.request().unwrap();
        pipeline.hide();
        pipeline.show();
        let after_show = pipeline.request().unwrap();

        assert_eq!(
            pipeline.complete::<()>(before_hide, Ok(gray(1.0))),
            HistogramOutcome::Stale
        );
        assert_eq!(ledger.borrow().created, 0);
        assert_eq!(
            pipeline.complete::<()>(after_show, Ok(gray(2.0))),
            HistogramOutcome::Rendered
        );
        assert_eq!(pipeline.data(), Some(&gray(2.0)));
    }

    #[test]
    fn failure_clears_chart() {
        let (mut pipeline, ledger) = pipeline();
        pipeline.show();
        let ticket = pipeline.request().unwrap();
        let _ = pipeline.complete::<&str>(ticket, Ok(gray(1.0)));
        let ticket = pipeline.request().unwrap();

        assert_eq!(
            pipeline.complete(ticket, Err("timeout")),
            HistogramOutcome::Failed("timeout")
        );
        assert_eq!(ledger.borrow().live, 0);
        assert!(!pipeline.has_chart());
        assert!(!pipeline.is_loading());
    }

    #[test]
    fn renderer_failure_is_reported() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        let mut pipeline = HistogramPipeline::new(FakeRenderer {
            ledger,
            fail: true,
        });
        pipeline.show();
        let ticket = pipeline.request().unwrap();
        assert!(matches!(
            pipeline.complete::<()>(ticket, Ok(gray(1.0))),
            HistogramOutcome::RenderFailed(_)
        ));
        assert!(pipeline.data().is_some());
    }

    #[test]
    fn drop_destroys_live_chart() {
        let (mut pipeline, ledger) = pipeline();
        pipeline.show();
        let ticket = pipeline.request().unwrap();
        let _ = pipeline.complete::<()>(ticket, Ok(gray(1.0)));
        drop(pipeline);
        assert_eq!(ledger.borrow().live, 0);
    }
}

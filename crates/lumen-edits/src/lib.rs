//! lumen-edits: Pure edit-document model and sync bookkeeping (sans-IO).
//!
//! Models the editor's dynamic controls and everything they drive:
//! control units own a local draft and emit an explicit [`Commit`],
//! the [`EditStore`] merges commits into one [`EditDocument`], the
//! [`SyncDriver`] decides which render responses may replace the
//! working image, and the [`HistogramPipeline`] owns the chart
//! renderer lifecycle.
//!
//! This crate has **no I/O dependencies** -- it never touches the
//! network or the DOM. HTTP lives in `lumen-client`, browser
//! interaction in `lumen-io`.

pub mod catalog;
pub mod chart;
pub mod control;
pub mod document;
pub mod encoded;
pub mod histogram;
pub mod sync;
pub mod ticket;

pub use catalog::{CATALOG, ControlGroup, ControlKind, ControlSpec, ParamSpec};
pub use chart::{ChartConfig, ChartError, ChartRenderer};
pub use control::{ControlBank, ControlUnit, Slider, Toggle, ToggleParams};
pub use document::{
    Commit, ControlState, EditDocument, EditStore, ValueRange, next_edit_document,
};
pub use encoded::{EncodedImage, ImageError};
pub use histogram::{
    BUCKETS, ColorMode, HistogramData, HistogramError, HistogramOutcome, HistogramPipeline,
};
pub use sync::{RenderRequest, SyncDriver, SyncOutcome};
pub use ticket::{RequestTracker, Ticket, is_current_response};

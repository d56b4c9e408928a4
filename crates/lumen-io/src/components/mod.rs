//! Dioxus UI components for lumen.
//!
//! Provides the upload zone, the control panel, the working image
//! preview, the histogram panel, and the toolbar.

mod controls;
mod histogram;
mod preview;
mod toolbar;
mod upload;

pub use controls::ControlPanel;
pub use histogram::{HISTOGRAM_CANVAS_ID, HistogramPanel};
pub use preview::Preview;
pub use toolbar::Toolbar;
pub use upload::{FileUpload, Upload, UploadError};

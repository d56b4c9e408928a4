//! lumen-io: Browser I/O and Dioxus component library.
//!
//! Handles file uploads, Blob downloads, printing, user notices, and
//! the Chart.js binding, and provides the UI components of the lumen
//! web application.

pub mod chart;
pub mod components;
pub mod download;
pub mod notice;
pub mod print;

pub use chart::{CHART_JS_URL, ChartJs};
pub use components::{
    ControlPanel, FileUpload, HISTOGRAM_CANVAS_ID, HistogramPanel, Preview, Toolbar, Upload,
    UploadError,
};
pub use download::{DownloadError, save_image};
pub use notice::notify;
pub use print::{PrintError, PrintIntent, PrintIntentListener, print_image};

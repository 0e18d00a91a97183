#![forbid(unsafe_code)]

pub mod charts;
pub mod export;
pub mod render;

pub use charts::ChartApp;
pub use export::{DEFAULT_EXPORT_PATH, ExportError, export_report, strip_ansi};
pub use render::{progress_bar, render_report, render_section};

mod bar;
mod report;
mod section;

pub use bar::progress_bar;
pub use report::render_report;
pub use section::render_section;

use chrono::Duration;
use course_core::format_duration;

/// `format_duration` renders zero as the empty string; report lines still
/// need something to print.
pub(crate) fn format_duration_or_zero(duration: Duration) -> String {
    let formatted = format_duration(duration);
    if formatted.is_empty() {
        "0m".to_owned()
    } else {
        formatted
    }
}

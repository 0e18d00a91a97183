use crossterm::style::Stylize;

use services::CourseReport;

use crate::render::{format_duration_or_zero, progress_bar, render_section};

/// Whole-course report: banner, overall bar, time and count totals, then
/// every stored section with its header.
#[must_use]
pub fn render_report(report: &CourseReport) -> String {
    let overview = &report.overview;
    let mut out = String::new();

    out.push_str(&format!("{}\n", "Course Progress".bold()));
    out.push_str("═══════════════\n");

    if let Some(bar) = progress_bar(overview.done_count, overview.total_count) {
        out.push_str(&format!("{}\n", bar.blue()));
    }

    out.push_str(&format!(
        "Time: {} done, {} remaining\n",
        format_duration_or_zero(overview.done_duration),
        format_duration_or_zero(overview.remaining_duration),
    ));
    out.push_str(&format!(
        "Videos: {}/{} done\n",
        overview.done_count, overview.total_count
    ));

    for section in &report.sections {
        out.push('\n');
        out.push_str(&render_section(section, true));
    }

    out
}

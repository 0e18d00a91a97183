use std::fs;
use std::path::Path;

use thiserror::Error;

use services::CourseReport;

use crate::render::render_report;

/// Where the exported report lands unless the caller picks another path.
pub const DEFAULT_EXPORT_PATH: &str = "progress_report.md";

const PREAMBLE: &str = "# Course Progress Report\n\n```text\n";
const FENCE: &str = "```\n";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("cannot write report to {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Write the full report to `path` as plain text, overwriting any previous
/// export. Styling escape sequences are stripped so the file reads cleanly
/// outside a terminal.
///
/// # Errors
///
/// Returns `ExportError::Unavailable` when the file cannot be written.
pub fn export_report(report: &CourseReport, path: &Path) -> Result<(), ExportError> {
    let plain = strip_ansi(&render_report(report));

    let mut contents = String::with_capacity(PREAMBLE.len() + plain.len() + FENCE.len() + 1);
    contents.push_str(PREAMBLE);
    contents.push_str(&plain);
    if !plain.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(FENCE);

    fs::write(path, contents).map_err(|source| ExportError::Unavailable {
        path: path.display().to_string(),
        source,
    })
}

/// Remove ANSI escape sequences, keeping all printable text.
///
/// Handles CSI sequences (`ESC [` through a final byte in `@..=~`); any
/// other escape is dropped along with its introducer.
#[must_use]
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            for follower in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&follower) {
                    break;
                }
            }
        } else {
            chars.next();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_ansi("Section 1: Done"), "Section 1: Done");
    }

    #[test]
    fn color_codes_are_removed() {
        let styled = "\u{1b}[1mCourse\u{1b}[0m \u{1b}[38;5;12mbar\u{1b}[39m";
        assert_eq!(strip_ansi(styled), "Course bar");
    }

    #[test]
    fn non_csi_escapes_are_dropped() {
        assert_eq!(strip_ansi("a\u{1b}cb"), "ab");
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(strip_ansi("██░░ \u{1b}[34m2/4\u{1b}[39m"), "██░░ 2/4");
    }
}

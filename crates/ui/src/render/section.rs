use crossterm::style::Stylize;

use course_core::format_duration;
use course_core::model::SectionSummary;

use crate::render::progress_bar;

/// One section as console text: optional header, a status line, and a
/// progress bar when the section has any items.
#[must_use]
pub fn render_section(summary: &SectionSummary, show_header: bool) -> String {
    let mut out = String::new();

    if show_header {
        let header = format!("Section {}: {}", summary.number, summary.title);
        out.push_str(&format!("{}\n", header.bold()));
    }

    if summary.remaining > 0 {
        let time_left = format_duration(summary.remaining_duration);
        if time_left.is_empty() {
            out.push_str(&format!("{} videos remaining\n", summary.remaining));
        } else {
            out.push_str(&format!(
                "{time_left}, {} videos remaining\n",
                summary.remaining
            ));
        }
    } else {
        out.push_str(&format!("{}\n", "Done".green()));
    }

    if let Some(bar) = progress_bar(summary.done, summary.total) {
        out.push_str(&format!("{}\n", bar.blue()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use course_core::model::{Item, ItemIndex, Section, SectionNumber};
    use course_core::time::fixed_now;

    fn summary(done_minutes: &[i64], remaining_minutes: &[i64]) -> SectionSummary {
        let section = Section::new(SectionNumber::new(3), "Section: Going Modular").unwrap();
        let mut items = Vec::new();
        let mut index = 0;
        for (&minutes, done) in done_minutes
            .iter()
            .map(|m| (m, true))
            .chain(remaining_minutes.iter().map(|m| (m, false)))
        {
            index += 1;
            let mut item = Item::new(
                ItemIndex::new(index),
                SectionNumber::new(3),
                format!("Video {index}"),
                Duration::minutes(minutes),
            )
            .unwrap();
            if done {
                item.set_status(true, fixed_now());
            }
            items.push(item);
        }
        SectionSummary::from_items(&section, &items)
    }

    #[test]
    fn header_names_number_and_stripped_title() {
        let text = render_section(&summary(&[], &[10]), true);
        assert!(text.contains("Section 3: Going Modular"));
    }

    #[test]
    fn header_is_omitted_on_request() {
        let text = render_section(&summary(&[], &[10]), false);
        assert!(!text.contains("Section 3"));
    }

    #[test]
    fn open_section_lists_remaining_time_and_count() {
        let text = render_section(&summary(&[10], &[30, 35]), true);
        assert!(text.contains("1h 5m, 2 videos remaining"));
        assert!(text.contains("1/3"));
    }

    #[test]
    fn finished_section_says_done() {
        let text = render_section(&summary(&[10, 20], &[]), true);
        assert!(text.contains("Done"));
        assert!(text.contains("2/2"));
    }

    #[test]
    fn empty_section_has_no_bar_line() {
        let text = render_section(&summary(&[], &[]), true);
        assert!(!text.contains('█'));
        assert!(!text.contains('░'));
    }
}

use chrono::Duration;
use thiserror::Error;

use crate::model::ids::SectionNumber;
use crate::model::item::Item;

//
// ─── SECTION TYPES ─────────────────────────────────────────────────────────────
//

/// A stored group of items sharing a section number.
///
/// Completion state is never stored on the section itself; it is derived
/// from the member items via [`SectionSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    number: SectionNumber,
    title: String,
}

impl Section {
    /// # Errors
    ///
    /// Returns `SectionError::EmptyTitle` for a blank title.
    pub fn new(number: SectionNumber, title: impl Into<String>) -> Result<Self, SectionError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SectionError::EmptyTitle { number });
        }
        Ok(Self { number, title })
    }

    #[must_use]
    pub fn number(&self) -> SectionNumber {
        self.number
    }

    /// The raw stored title, which may carry a `"label: "` prefix.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title with any leading `"label: "` prefix stripped.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.title
            .split_once(": ")
            .map_or(self.title.as_str(), |(_, rest)| rest)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SectionError {
    #[error("section {number} has an empty title")]
    EmptyTitle { number: SectionNumber },
}

//
// ─── DERIVED SUMMARY ───────────────────────────────────────────────────────────
//

/// Aggregated completion state of one section, recomputed from its items
/// on every read. A section is complete when every item is done; the
/// conjunction runs in both directions, so un-marking an item makes a
/// previously complete section incomplete again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    pub number: SectionNumber,
    pub title: String,
    pub total: usize,
    pub done: usize,
    pub remaining: usize,
    pub remaining_duration: Duration,
}

impl SectionSummary {
    /// Derive the summary for `section` from `items`. Items belonging to
    /// other sections are ignored, so the full course table can be passed.
    #[must_use]
    pub fn from_items(section: &Section, items: &[Item]) -> Self {
        let mut total = 0;
        let mut done = 0;
        let mut remaining_duration = Duration::zero();

        for item in items.iter().filter(|i| i.section() == section.number()) {
            total += 1;
            if item.is_done() {
                done += 1;
            } else {
                remaining_duration += item.duration();
            }
        }

        Self {
            number: section.number(),
            title: section.display_name().to_owned(),
            total,
            done,
            remaining: total - done,
            remaining_duration,
        }
    }

    /// True when no items remain. An empty section is vacuously complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::ItemIndex;
    use crate::time::fixed_now;

    fn build_section() -> Section {
        Section::new(SectionNumber::new(1), "Section: Getting Started").unwrap()
    }

    fn build_item(index: u32, section: u32, minutes: i64, done: bool) -> Item {
        let mut item = Item::new(
            ItemIndex::new(index),
            SectionNumber::new(section),
            format!("Video {index}"),
            Duration::minutes(minutes),
        )
        .unwrap();
        if done {
            item.set_status(true, fixed_now());
        }
        item
    }

    #[test]
    fn display_name_strips_label_prefix() {
        let section = build_section();
        assert_eq!(section.display_name(), "Getting Started");
    }

    #[test]
    fn display_name_without_prefix_is_unchanged() {
        let section = Section::new(SectionNumber::new(2), "Tensors").unwrap();
        assert_eq!(section.display_name(), "Tensors");
    }

    #[test]
    fn blank_section_title_is_rejected() {
        let err = Section::new(SectionNumber::new(1), " ").unwrap_err();
        assert!(matches!(err, SectionError::EmptyTitle { .. }));
    }

    #[test]
    fn summary_counts_and_sums_remaining() {
        let section = build_section();
        let items = vec![
            build_item(1, 1, 10, true),
            build_item(2, 1, 20, false),
            build_item(3, 1, 30, false),
            // different section, must be ignored
            build_item(4, 2, 40, false),
        ];

        let summary = SectionSummary::from_items(&section, &items);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.remaining, 2);
        assert_eq!(summary.remaining_duration, Duration::minutes(50));
        assert!(!summary.is_complete());
    }

    #[test]
    fn summary_is_complete_when_all_items_done() {
        let section = build_section();
        let items = vec![build_item(1, 1, 10, true), build_item(2, 1, 20, true)];

        let summary = SectionSummary::from_items(&section, &items);
        assert!(summary.is_complete());
        assert_eq!(summary.remaining_duration, Duration::zero());
    }

    #[test]
    fn empty_section_is_vacuously_complete() {
        let section = build_section();
        let summary = SectionSummary::from_items(&section, &[]);
        assert_eq!(summary.total, 0);
        assert!(summary.is_complete());
    }

    #[test]
    fn unmarking_makes_summary_incomplete_again() {
        let section = build_section();
        let mut items = vec![build_item(1, 1, 10, true), build_item(2, 1, 20, true)];
        assert!(SectionSummary::from_items(&section, &items).is_complete());

        items[1].set_status(false, fixed_now());
        let summary = SectionSummary::from_items(&section, &items);
        assert!(!summary.is_complete());
        assert_eq!(summary.remaining, 1);
    }
}

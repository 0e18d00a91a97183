//! Read-only aggregates derived from the full item table.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};

use crate::model::item::Item;

const SECONDS_PER_HOUR: f64 = 3_600.0;

#[allow(clippy::cast_precision_loss)]
fn duration_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / SECONDS_PER_HOUR
}

//
// ─── COURSE OVERVIEW ───────────────────────────────────────────────────────────
//

/// Totals across every item of the course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOverview {
    pub done_count: usize,
    pub total_count: usize,
    pub done_duration: Duration,
    pub remaining_duration: Duration,
}

impl CourseOverview {
    #[must_use]
    pub fn from_items(items: &[Item]) -> Self {
        let mut done_count = 0;
        let mut done_duration = Duration::zero();
        let mut remaining_duration = Duration::zero();

        for item in items {
            if item.is_done() {
                done_count += 1;
                done_duration += item.duration();
            } else {
                remaining_duration += item.duration();
            }
        }

        Self {
            done_count,
            total_count: items.len(),
            done_duration,
            remaining_duration,
        }
    }

    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.total_count - self.done_count
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.done_duration + self.remaining_duration
    }
}

//
// ─── MONTHLY TOTALS ────────────────────────────────────────────────────────────
//

/// Time finished in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub duration: Duration,
}

impl MonthlyTotal {
    /// Total as fractional hours, for chart axes.
    #[must_use]
    pub fn hours(&self) -> f64 {
        duration_hours(self.duration)
    }

    /// Axis label in `YYYY-MM` form.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Group done items by the calendar month of their finished timestamp and
/// sum durations. Items without a finished timestamp do not contribute.
/// Results are ordered chronologically.
#[must_use]
pub fn monthly_totals(items: &[Item]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<(i32, u32), Duration> = BTreeMap::new();

    for item in items {
        if let Some(finished_at) = item.finished_at() {
            let key = (finished_at.year(), finished_at.month());
            let entry = by_month.entry(key).or_insert_with(Duration::zero);
            *entry += item.duration();
        }
    }

    by_month
        .into_iter()
        .map(|((year, month), duration)| MonthlyTotal {
            year,
            month,
            duration,
        })
        .collect()
}

//
// ─── COMPLETION SPLIT ──────────────────────────────────────────────────────────
//

/// Total duration partitioned into done and not-done buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSplit {
    pub done: Duration,
    pub not_done: Duration,
}

impl CompletionSplit {
    #[must_use]
    pub fn from_items(items: &[Item]) -> Self {
        let mut done = Duration::zero();
        let mut not_done = Duration::zero();
        for item in items {
            if item.is_done() {
                done += item.duration();
            } else {
                not_done += item.duration();
            }
        }
        Self { done, not_done }
    }

    /// Fraction of total time that is done, in `0.0..=1.0`. Zero when the
    /// course has no recorded time at all.
    #[must_use]
    pub fn done_fraction(&self) -> f64 {
        let total = duration_hours(self.done + self.not_done);
        if total == 0.0 {
            0.0
        } else {
            duration_hours(self.done) / total
        }
    }

    #[must_use]
    pub fn done_hours(&self) -> f64 {
        duration_hours(self.done)
    }

    #[must_use]
    pub fn not_done_hours(&self) -> f64 {
        duration_hours(self.not_done)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::{ItemIndex, SectionNumber};
    use chrono::{DateTime, Utc};

    fn timestamp(raw: &str) -> DateTime<Utc> {
        raw.parse().unwrap()
    }

    fn build_item(index: u32, minutes: i64, finished: Option<&str>) -> Item {
        let mut item = Item::new(
            ItemIndex::new(index),
            SectionNumber::new(1),
            format!("Video {index}"),
            Duration::minutes(minutes),
        )
        .unwrap();
        if let Some(raw) = finished {
            item.set_status(true, timestamp(raw));
        }
        item
    }

    #[test]
    fn overview_sums_counts_and_durations() {
        let items = vec![
            build_item(1, 600, Some("2024-01-10T08:00:00Z")),
            build_item(2, 300, None),
        ];

        let overview = CourseOverview::from_items(&items);
        assert_eq!(overview.done_count, 1);
        assert_eq!(overview.total_count, 2);
        assert_eq!(overview.remaining_count(), 1);
        assert_eq!(overview.done_duration, Duration::hours(10));
        assert_eq!(overview.remaining_duration, Duration::hours(5));
        assert_eq!(overview.total_duration(), Duration::hours(15));
    }

    #[test]
    fn monthly_totals_group_by_calendar_month() {
        let items = vec![
            build_item(1, 60, Some("2024-01-10T08:00:00Z")),
            build_item(2, 30, Some("2024-01-25T20:00:00Z")),
            build_item(3, 45, Some("2024-03-02T09:00:00Z")),
            build_item(4, 120, None),
        ];

        let totals = monthly_totals(&items);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].label(), "2024-01");
        assert_eq!(totals[0].duration, Duration::minutes(90));
        assert_eq!(totals[1].label(), "2024-03");
        assert_eq!(totals[1].duration, Duration::minutes(45));
    }

    #[test]
    fn monthly_totals_empty_without_finished_items() {
        let items = vec![build_item(1, 60, None)];
        assert!(monthly_totals(&items).is_empty());
    }

    #[test]
    fn completion_split_buckets_durations() {
        let items = vec![
            build_item(1, 600, Some("2024-01-10T08:00:00Z")),
            build_item(2, 300, None),
        ];

        let split = CompletionSplit::from_items(&items);
        assert_eq!(split.done, Duration::hours(10));
        assert_eq!(split.not_done, Duration::hours(5));
        assert!((split.done_fraction() - 10.0 / 15.0).abs() < 1e-9);
        assert!((split.done_hours() - 10.0).abs() < 1e-9);
        assert!((split.not_done_hours() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn completion_split_of_empty_course_has_zero_fraction() {
        let split = CompletionSplit::from_items(&[]);
        assert_eq!(split.done_fraction(), 0.0);
    }
}

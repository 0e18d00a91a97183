use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::ids::{ItemIndex, SectionNumber};

//
// ─── ITEM TYPES ────────────────────────────────────────────────────────────────
//

/// One trackable unit of course content: a video with a duration and a
/// completion state.
///
/// The completion invariant is owned by this type: `finished_at` is `Some`
/// exactly when `done` is true. Both constructors and the single mutator
/// keep the two fields in lockstep, so a consistent `Item` can never be
/// observed in an inconsistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    index: ItemIndex,
    section: SectionNumber,
    title: String,
    duration: Duration,
    done: bool,
    finished_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a not-yet-done item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyTitle` for a blank title and
    /// `ItemError::NegativeDuration` for a negative duration.
    pub fn new(
        index: ItemIndex,
        section: SectionNumber,
        title: impl Into<String>,
        duration: Duration,
    ) -> Result<Self, ItemError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ItemError::EmptyTitle { index });
        }
        if duration < Duration::zero() {
            return Err(ItemError::NegativeDuration { index });
        }
        Ok(Self {
            index,
            section,
            title,
            duration,
            done: false,
            finished_at: None,
        })
    }

    /// Rebuild an item from persisted fields.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::InconsistentCompletion` when the stored `done`
    /// flag and `finished_at` disagree, in addition to the `new` errors.
    pub fn from_persisted(
        index: ItemIndex,
        section: SectionNumber,
        title: impl Into<String>,
        duration: Duration,
        done: bool,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ItemError> {
        if done != finished_at.is_some() {
            return Err(ItemError::InconsistentCompletion { index });
        }
        let mut item = Self::new(index, section, title, duration)?;
        item.done = done;
        item.finished_at = finished_at;
        Ok(item)
    }

    #[must_use]
    pub fn index(&self) -> ItemIndex {
        self.index
    }

    #[must_use]
    pub fn section(&self) -> SectionNumber {
        self.section
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Set the completion state. The timestamp is recorded when marking done
    /// and cleared when marking not done.
    pub fn set_status(&mut self, done: bool, at: DateTime<Utc>) {
        self.done = done;
        self.finished_at = done.then_some(at);
    }
}

//
// ─── ITEM ERRORS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("item {index} has an empty title")]
    EmptyTitle { index: ItemIndex },

    #[error("item {index} has a negative duration")]
    NegativeDuration { index: ItemIndex },

    #[error("item {index} is marked done without a finished timestamp (or vice versa)")]
    InconsistentCompletion { index: ItemIndex },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

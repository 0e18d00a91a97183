use std::sync::Arc;

use chrono::{DateTime, Utc};

use course_core::model::{
    CompletionSplit, CourseOverview, Item, ItemIndex, MonthlyTotal, SectionNumber, SectionSummary,
    monthly_totals,
};
use course_core::time::Clock;
use storage::repository::{ItemRepository, SectionRepository, Storage, StorageError};

use crate::error::ProgressError;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// Result of a status mutation: the updated item and the recomputed
/// summary of its owning section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub item: Item,
    pub section: SectionSummary,
}

/// Full read-only view of the course: overall totals plus one summary per
/// stored section, ordered by section number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseReport {
    pub overview: CourseOverview,
    pub sections: Vec<SectionSummary>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Coordinates the single mutation and all report queries over the
/// progress store. Every query reads the table fresh; nothing is cached.
pub struct ProgressService {
    clock: Clock,
    sections: Arc<dyn SectionRepository>,
    items: Arc<dyn ItemRepository>,
}

impl ProgressService {
    /// Create a service over `storage` using the system clock.
    #[must_use]
    pub fn new(storage: &Storage) -> Self {
        Self {
            clock: Clock::system(),
            sections: Arc::clone(&storage.sections),
            items: Arc::clone(&storage.items),
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock, evaluated per call.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Mark an item done or not done, timestamping with the clock at the
    /// moment of this call.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` for a missing or ambiguous index
    /// and for store failures.
    pub async fn set_item_status(
        &self,
        index: ItemIndex,
        done: bool,
    ) -> Result<StatusUpdate, ProgressError> {
        self.set_item_status_at(index, done, self.clock.now()).await
    }

    /// Mark an item done or not done with an explicit timestamp. The
    /// timestamp is recorded only when `done` is true.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` for a missing or ambiguous index
    /// and for store failures.
    pub async fn set_item_status_at(
        &self,
        index: ItemIndex,
        done: bool,
        at: DateTime<Utc>,
    ) -> Result<StatusUpdate, ProgressError> {
        let item = self.items.set_item_status(index, done, at).await?;
        tracing::debug!(index = index.value(), done, "item status changed");

        let section = self.section_progress(item.section()).await?;
        Ok(StatusUpdate { item, section })
    }

    /// Summary of one section, derived from its items.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SectionNotFound` when the section has no
    /// stored row, or other store failures.
    pub async fn section_progress(
        &self,
        number: SectionNumber,
    ) -> Result<SectionSummary, ProgressError> {
        let section = self
            .sections
            .get_section(number)
            .await?
            .ok_or(StorageError::SectionNotFound(number))?;
        let items = self.items.items_in_section(number).await?;
        Ok(SectionSummary::from_items(&section, &items))
    }

    /// Overall totals plus every section summary, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on store failures.
    pub async fn overview(&self) -> Result<CourseReport, ProgressError> {
        let sections = self.sections.list_sections().await?;
        let items = self.items.list_items().await?;

        let overview = CourseOverview::from_items(&items);
        let sections = sections
            .iter()
            .map(|section| SectionSummary::from_items(section, &items))
            .collect();

        Ok(CourseReport { overview, sections })
    }

    /// Finished time grouped by calendar month, chronologically ordered.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on store failures.
    pub async fn monthly(&self) -> Result<Vec<MonthlyTotal>, ProgressError> {
        let items = self.items.list_items().await?;
        Ok(monthly_totals(&items))
    }

    /// Done vs. not-done duration buckets.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on store failures.
    pub async fn completion_split(&self) -> Result<CompletionSplit, ProgressError> {
        let items = self.items.list_items().await?;
        Ok(CompletionSplit::from_items(&items))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

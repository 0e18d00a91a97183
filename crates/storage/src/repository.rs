use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use course_core::model::{Item, ItemIndex, Section, SectionNumber};

/// Errors surfaced by progress store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The store is missing, unreadable, or unwritable.
    #[error("progress store unavailable: {0}")]
    Unavailable(String),

    /// An expected column is absent or a stored value cannot be coerced to
    /// its semantic type.
    #[error("progress store schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("no item with index {0}")]
    ItemNotFound(ItemIndex),

    /// More than one row matched a supposedly unique item index. This means
    /// the uniqueness invariant was violated upstream of this process.
    #[error("{count} items share index {index}")]
    AmbiguousItem { index: ItemIndex, count: usize },

    #[error("no section numbered {0}")]
    SectionNotFound(SectionNumber),
}

/// Repository contract for stored sections.
#[async_trait]
pub trait SectionRepository: Send + Sync {
    /// Persist or update a section.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the section cannot be stored.
    async fn upsert_section(&self, section: &Section) -> Result<(), StorageError>;

    /// Fetch a section by number, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn get_section(&self, number: SectionNumber) -> Result<Option<Section>, StorageError>;

    /// All sections ordered by number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn list_sections(&self) -> Result<Vec<Section>, StorageError>;
}

/// Repository contract for course items.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist or update an item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the item cannot be stored.
    async fn upsert_item(&self, item: &Item) -> Result<(), StorageError>;

    /// Fetch the unique item with the given index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ItemNotFound` when no row matches and
    /// `StorageError::AmbiguousItem` when more than one does.
    async fn get_item(&self, index: ItemIndex) -> Result<Item, StorageError>;

    /// All items ordered by index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn list_items(&self) -> Result<Vec<Item>, StorageError>;

    /// Items of one section ordered by index.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on store failures.
    async fn items_in_section(&self, number: SectionNumber) -> Result<Vec<Item>, StorageError>;

    /// Atomically set one item's completion state, recording `at` as the
    /// finished timestamp when `done` and clearing it otherwise. The whole
    /// read-modify-write happens under the store's exclusive scope and is
    /// rolled back on every error path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ItemNotFound`/`AmbiguousItem` for a bad
    /// index, or other storage errors.
    async fn set_item_status(
        &self,
        index: ItemIndex,
        done: bool,
        at: DateTime<Utc>,
    ) -> Result<Item, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sections: Arc<Mutex<BTreeMap<u32, Section>>>,
    items: Arc<Mutex<Vec<Item>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from raw rows. Duplicate item indexes are kept
    /// as-is so invariant-violation paths can be exercised in tests.
    #[must_use]
    pub fn from_rows(sections: Vec<Section>, items: Vec<Item>) -> Self {
        let by_number = sections
            .into_iter()
            .map(|s| (s.number().value(), s))
            .collect();
        Self {
            sections: Arc::new(Mutex::new(by_number)),
            items: Arc::new(Mutex::new(items)),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Unavailable(e.to_string())
}

#[async_trait]
impl SectionRepository for InMemoryRepository {
    async fn upsert_section(&self, section: &Section) -> Result<(), StorageError> {
        let mut guard = self.sections.lock().map_err(poisoned)?;
        guard.insert(section.number().value(), section.clone());
        Ok(())
    }

    async fn get_section(&self, number: SectionNumber) -> Result<Option<Section>, StorageError> {
        let guard = self.sections.lock().map_err(poisoned)?;
        Ok(guard.get(&number.value()).cloned())
    }

    async fn list_sections(&self) -> Result<Vec<Section>, StorageError> {
        let guard = self.sections.lock().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn upsert_item(&self, item: &Item) -> Result<(), StorageError> {
        let mut guard = self.items.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|i| i.index() == item.index()) {
            Some(existing) => *existing = item.clone(),
            None => guard.push(item.clone()),
        }
        Ok(())
    }

    async fn get_item(&self, index: ItemIndex) -> Result<Item, StorageError> {
        let guard = self.items.lock().map_err(poisoned)?;
        let matches: Vec<&Item> = guard.iter().filter(|i| i.index() == index).collect();
        match matches.as_slice() {
            [] => Err(StorageError::ItemNotFound(index)),
            [item] => Ok((*item).clone()),
            many => Err(StorageError::AmbiguousItem {
                index,
                count: many.len(),
            }),
        }
    }

    async fn list_items(&self) -> Result<Vec<Item>, StorageError> {
        let guard = self.items.lock().map_err(poisoned)?;
        let mut items = guard.clone();
        items.sort_by_key(Item::index);
        Ok(items)
    }

    async fn items_in_section(&self, number: SectionNumber) -> Result<Vec<Item>, StorageError> {
        let guard = self.items.lock().map_err(poisoned)?;
        let mut items: Vec<Item> = guard
            .iter()
            .filter(|i| i.section() == number)
            .cloned()
            .collect();
        items.sort_by_key(Item::index);
        Ok(items)
    }

    async fn set_item_status(
        &self,
        index: ItemIndex,
        done: bool,
        at: DateTime<Utc>,
    ) -> Result<Item, StorageError> {
        let mut guard = self.items.lock().map_err(poisoned)?;
        let matches = guard.iter().filter(|i| i.index() == index).count();
        match matches {
            0 => Err(StorageError::ItemNotFound(index)),
            1 => {
                let item = guard
                    .iter_mut()
                    .find(|i| i.index() == index)
                    .ok_or(StorageError::ItemNotFound(index))?;
                item.set_status(done, at);
                Ok(item.clone())
            }
            count => Err(StorageError::AmbiguousItem { index, count }),
        }
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sections: Arc<dyn SectionRepository>,
    pub items: Arc<dyn ItemRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sections: Arc<dyn SectionRepository> = Arc::new(repo.clone());
        let items: Arc<dyn ItemRepository> = Arc::new(repo);
        Self { sections, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use course_core::time::fixed_now;

    fn build_section(number: u32) -> Section {
        Section::new(SectionNumber::new(number), format!("Section: S{number}")).unwrap()
    }

    fn build_item(index: u32, section: u32) -> Item {
        Item::new(
            ItemIndex::new(index),
            SectionNumber::new(section),
            format!("Video {index}"),
            Duration::minutes(10),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn roundtrips_sections_and_items() {
        let repo = InMemoryRepository::new();
        repo.upsert_section(&build_section(1)).await.unwrap();
        repo.upsert_item(&build_item(1, 1)).await.unwrap();
        repo.upsert_item(&build_item(2, 1)).await.unwrap();

        let sections = repo.list_sections().await.unwrap();
        assert_eq!(sections.len(), 1);

        let items = repo.items_in_section(SectionNumber::new(1)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].index(), ItemIndex::new(1));
    }

    #[tokio::test]
    async fn get_item_reports_missing_index() {
        let repo = InMemoryRepository::new();
        let err = repo.get_item(ItemIndex::new(9)).await.unwrap_err();
        assert!(matches!(err, StorageError::ItemNotFound(_)));
    }

    #[tokio::test]
    async fn get_item_reports_duplicate_index() {
        let repo = InMemoryRepository::from_rows(
            vec![build_section(1)],
            vec![build_item(1, 1), build_item(1, 1)],
        );
        let err = repo.get_item(ItemIndex::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::AmbiguousItem { count: 2, .. }
        ));
    }

    #[tokio::test]
    async fn set_item_status_updates_in_place() {
        let repo = InMemoryRepository::new();
        repo.upsert_item(&build_item(1, 1)).await.unwrap();

        let at = fixed_now();
        let updated = repo
            .set_item_status(ItemIndex::new(1), true, at)
            .await
            .unwrap();
        assert!(updated.is_done());
        assert_eq!(updated.finished_at(), Some(at));

        let fetched = repo.get_item(ItemIndex::new(1)).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn set_item_status_refuses_duplicate_index() {
        let repo = InMemoryRepository::from_rows(
            Vec::new(),
            vec![build_item(1, 1), build_item(1, 1)],
        );
        let err = repo
            .set_item_status(ItemIndex::new(1), true, fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AmbiguousItem { .. }));
    }
}

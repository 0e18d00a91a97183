use chrono::{DateTime, Utc};

use course_core::model::{Item, ItemIndex, SectionNumber};

use super::SqliteStore;
use super::mapping::{ITEM_COLUMNS, map_item_row, store_error};
use crate::repository::{ItemRepository, StorageError};

#[async_trait::async_trait]
impl ItemRepository for SqliteStore {
    async fn upsert_item(&self, item: &Item) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO items (idx, section_number, title, duration_secs, done, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(idx) DO UPDATE SET
                section_number = excluded.section_number,
                title = excluded.title,
                duration_secs = excluded.duration_secs,
                done = excluded.done,
                finished_at = excluded.finished_at
            ",
        )
        .bind(i64::from(item.index().value()))
        .bind(i64::from(item.section().value()))
        .bind(item.title())
        .bind(item.duration().num_seconds())
        .bind(item.is_done())
        .bind(item.finished_at())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn get_item(&self, index: ItemIndex) -> Result<Item, StorageError> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE idx = ?1"))
            .bind(i64::from(index.value()))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        match rows.as_slice() {
            [] => Err(StorageError::ItemNotFound(index)),
            [row] => map_item_row(row),
            many => Err(StorageError::AmbiguousItem {
                index,
                count: many.len(),
            }),
        }
    }

    async fn list_items(&self) -> Result<Vec<Item>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY idx ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(map_item_row(&row)?);
        }
        Ok(items)
    }

    async fn items_in_section(&self, number: SectionNumber) -> Result<Vec<Item>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE section_number = ?1 ORDER BY idx ASC"
        ))
        .bind(i64::from(number.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(map_item_row(&row)?);
        }
        Ok(items)
    }

    async fn set_item_status(
        &self,
        index: ItemIndex,
        done: bool,
        at: DateTime<Utc>,
    ) -> Result<Item, StorageError> {
        // The read and the write share one transaction; dropping the
        // transaction on any error path rolls the write back.
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE idx = ?1"))
            .bind(i64::from(index.value()))
            .fetch_all(&mut *tx)
            .await
            .map_err(store_error)?;

        let mut item = match rows.as_slice() {
            [] => return Err(StorageError::ItemNotFound(index)),
            [row] => map_item_row(row)?,
            many => {
                return Err(StorageError::AmbiguousItem {
                    index,
                    count: many.len(),
                });
            }
        };

        item.set_status(done, at);

        sqlx::query("UPDATE items SET done = ?2, finished_at = ?3 WHERE idx = ?1")
            .bind(i64::from(index.value()))
            .bind(item.is_done())
            .bind(item.finished_at())
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(index = index.value(), done, "item status persisted");

        Ok(item)
    }
}

use chrono::Duration;
use sqlx::Row;

use course_core::model::{Item, ItemIndex, Section, SectionNumber};

use crate::repository::StorageError;

/// Route a sqlx error to the store error taxonomy: decode and
/// missing-column failures are schema mismatches, everything else means
/// the store is unavailable.
pub(crate) fn store_error(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::ColumnNotFound(column) => {
            StorageError::SchemaMismatch(format!("missing column {column}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::SchemaMismatch(e.to_string())
        }
        sqlx::Error::Database(db) if db.message().contains("no such") => {
            StorageError::SchemaMismatch(db.message().to_string())
        }
        _ => StorageError::Unavailable(e.to_string()),
    }
}

fn mismatch<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::SchemaMismatch(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| mismatch(format!("{field} out of range: {v}")))
}

pub(crate) fn map_section_row(row: &sqlx::sqlite::SqliteRow) -> Result<Section, StorageError> {
    let number = u32_from_i64("number", row.try_get("number").map_err(store_error)?)?;
    let title: String = row.try_get("title").map_err(store_error)?;
    Section::new(SectionNumber::new(number), title).map_err(mismatch)
}

pub(crate) fn map_item_row(row: &sqlx::sqlite::SqliteRow) -> Result<Item, StorageError> {
    let index = u32_from_i64("idx", row.try_get("idx").map_err(store_error)?)?;
    let section = u32_from_i64(
        "section_number",
        row.try_get("section_number").map_err(store_error)?,
    )?;
    let title: String = row.try_get("title").map_err(store_error)?;
    let duration_secs: i64 = row.try_get("duration_secs").map_err(store_error)?;
    let done: bool = row.try_get("done").map_err(store_error)?;
    let finished_at: Option<chrono::DateTime<chrono::Utc>> =
        row.try_get("finished_at").map_err(store_error)?;

    Item::from_persisted(
        ItemIndex::new(index),
        SectionNumber::new(section),
        title,
        Duration::seconds(duration_secs),
        done,
        finished_at,
    )
    .map_err(mismatch)
}

pub(crate) const ITEM_COLUMNS: &str = "idx, section_number, title, duration_secs, done, finished_at";

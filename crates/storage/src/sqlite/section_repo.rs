use course_core::model::{Section, SectionNumber};

use super::SqliteStore;
use super::mapping::{map_section_row, store_error};
use crate::repository::{SectionRepository, StorageError};

#[async_trait::async_trait]
impl SectionRepository for SqliteStore {
    async fn upsert_section(&self, section: &Section) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO sections (number, title)
            VALUES (?1, ?2)
            ON CONFLICT(number) DO UPDATE SET
                title = excluded.title
            ",
        )
        .bind(i64::from(section.number().value()))
        .bind(section.title())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn get_section(&self, number: SectionNumber) -> Result<Option<Section>, StorageError> {
        let row = sqlx::query("SELECT number, title FROM sections WHERE number = ?1")
            .bind(i64::from(number.value()))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(map_section_row).transpose()
    }

    async fn list_sections(&self) -> Result<Vec<Section>, StorageError> {
        let rows = sqlx::query("SELECT number, title FROM sections ORDER BY number ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        let mut sections = Vec::with_capacity(rows.len());
        for row in rows {
            sections.push(map_section_row(&row)?);
        }
        Ok(sections)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::QuizId;
use sqlx::Row;

use crate::repository::{AttemptMarkerRecord, AttemptMarkerStore, StorageError};

use super::SqliteRepository;

#[async_trait]
impl AttemptMarkerStore for SqliteRepository {
    async fn has(&self, quiz_id: &QuizId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM attempt_markers WHERE marker_key = ?1")
            .bind(quiz_id.marker_key())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(row.is_some())
    }

    async fn set(&self, quiz_id: &QuizId, attempted_at: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO attempt_markers (marker_key, quiz_id, attempted_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(marker_key) DO NOTHING
            ",
        )
        .bind(quiz_id.marker_key())
        .bind(quiz_id.as_str())
        .bind(attempted_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn get(&self, quiz_id: &QuizId) -> Result<Option<AttemptMarkerRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT quiz_id, attempted_at
            FROM attempt_markers
            WHERE marker_key = ?1
            ",
        )
        .bind(quiz_id.marker_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_id: String = row
            .try_get("quiz_id")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let attempted_at: DateTime<Utc> = row
            .try_get("attempted_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let quiz_id =
            QuizId::new(raw_id).map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(AttemptMarkerRecord {
            quiz_id,
            attempted_at,
        }))
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::QuizId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted "already attempted" flag for one quiz on this client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptMarkerRecord {
    pub quiz_id: QuizId,
    pub attempted_at: DateTime<Utc>,
}

/// Durable, write-once store of attempt markers keyed by `attempted:<quiz id>`.
///
/// There is deliberately no way to clear a marker through this contract.
#[async_trait]
pub trait AttemptMarkerStore: Send + Sync {
    /// Whether a marker exists for the quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn has(&self, quiz_id: &QuizId) -> Result<bool, StorageError>;

    /// Set the marker. Setting an existing marker keeps the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be written.
    async fn set(&self, quiz_id: &QuizId, attempted_at: DateTime<Utc>) -> Result<(), StorageError>;

    /// Fetch the stored marker, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, quiz_id: &QuizId) -> Result<Option<AttemptMarkerRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    markers: Arc<Mutex<HashMap<String, AttemptMarkerRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            markers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl AttemptMarkerStore for InMemoryRepository {
    async fn has(&self, quiz_id: &QuizId) -> Result<bool, StorageError> {
        let guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains_key(&quiz_id.marker_key()))
    }

    async fn set(&self, quiz_id: &QuizId, attempted_at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(quiz_id.marker_key())
            .or_insert_with(|| AttemptMarkerRecord {
                quiz_id: quiz_id.clone(),
                attempted_at,
            });
        Ok(())
    }

    async fn get(&self, quiz_id: &QuizId) -> Result<Option<AttemptMarkerRecord>, StorageError> {
        let guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&quiz_id.marker_key()).cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub markers: Arc<dyn AttemptMarkerStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let markers: Arc<dyn AttemptMarkerStore> = Arc::new(InMemoryRepository::new());
        Self { markers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn marker_is_absent_until_set() {
        let repo = InMemoryRepository::new();
        let id = QuizId::new("q1").unwrap();
        assert!(!repo.has(&id).await.unwrap());

        repo.set(&id, fixed_now()).await.unwrap();
        assert!(repo.has(&id).await.unwrap());
        assert!(!repo.has(&QuizId::new("q2").unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn setting_twice_keeps_first_timestamp() {
        let repo = InMemoryRepository::new();
        let id = QuizId::new("q1").unwrap();
        repo.set(&id, fixed_now()).await.unwrap();
        repo.set(&id, fixed_now() + Duration::hours(1)).await.unwrap();

        let record = repo.get(&id).await.unwrap().expect("marker stored");
        assert_eq!(record.attempted_at, fixed_now());
        assert_eq!(record.quiz_id, id);
    }
}

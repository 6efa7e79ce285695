//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AttemptError, ParseIdError, QuizDraftError, QuizError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::SessionNotice;

/// Errors emitted by `QuizApi` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizApiError {
    #[error("quiz not found")]
    NotFound,
    #[error("quiz service request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("quiz service returned an invalid quiz: {0}")]
    InvalidQuiz(#[from] QuizError),
    #[error("quiz service returned an invalid id: {0}")]
    InvalidId(#[from] ParseIdError),
    #[error("cannot build request url from {0}")]
    InvalidUrl(String),
}

/// Errors emitted by the quiz session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz already attempted on this device")]
    AlreadyAttempted,
    #[error("failed to load quiz: {0}")]
    Load(#[from] QuizApiError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("quiz session is no longer running")]
    Closed,
}

impl SessionError {
    /// User-facing notice for errors that end a session before it starts.
    #[must_use]
    pub fn notice(&self) -> Option<SessionNotice> {
        match self {
            SessionError::AlreadyAttempted => Some(SessionNotice::AlreadyAttempted),
            SessionError::Load(_)
            | SessionError::Storage(_)
            | SessionError::Attempt(AttemptError::NoQuestions) => Some(SessionNotice::LoadFailed),
            _ => None,
        }
    }
}

/// Errors emitted by `QuizAuthoringService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthoringError {
    #[error(transparent)]
    Draft(#[from] QuizDraftError),
    #[error(transparent)]
    Api(#[from] QuizApiError),
}

/// Errors raised while reading client configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid quiz service url {raw}: {reason}")]
    InvalidUrl { raw: String, reason: String },
    #[error("unsupported url scheme {0}, expected http or https")]
    UnsupportedScheme(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

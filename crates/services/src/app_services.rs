use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::authoring_service::QuizAuthoringService;
use crate::config::ApiConfig;
use crate::error::AppServicesError;
use crate::quiz_api::{HttpQuizApi, QuizApi};
use crate::sessions::{HostEvents, QuizSessionService};

/// Assembles app-facing services over one storage backend and one quiz service.
#[derive(Clone)]
pub struct AppServices {
    sessions: Arc<QuizSessionService>,
    authoring: Arc<QuizAuthoringService>,
    host: HostEvents,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP quiz service.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        api_config: ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let api: Arc<dyn QuizApi> = Arc::new(HttpQuizApi::new(api_config));
        Ok(Self::from_parts(storage, api, clock))
    }

    #[must_use]
    pub fn from_parts(storage: Storage, api: Arc<dyn QuizApi>, clock: Clock) -> Self {
        let sessions = Arc::new(QuizSessionService::new(
            clock,
            Arc::clone(&api),
            Arc::clone(&storage.markers),
        ));
        let authoring = Arc::new(QuizAuthoringService::new(api));
        Self {
            sessions,
            authoring,
            host: HostEvents::new(),
        }
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<QuizSessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn authoring(&self) -> Arc<QuizAuthoringService> {
        Arc::clone(&self.authoring)
    }

    /// Shared host signal fan-out for every session started through these services.
    #[must_use]
    pub fn host(&self) -> HostEvents {
        self.host.clone()
    }
}

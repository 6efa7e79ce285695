use std::sync::Arc;

use log::info;
use tokio::sync::{mpsc, watch};

use quiz_core::model::{QuizAttempt, QuizId};
use quiz_core::time::QUIZ_TIME_LIMIT_SECS;
use storage::repository::AttemptMarkerStore;

use super::controller::SessionActor;
use super::host::HostEvents;
use super::session::QuizSession;
use super::view::SessionSnapshot;
use crate::error::SessionError;
use crate::quiz_api::QuizApi;
use crate::Clock;

/// Starts timed quiz attempts, enforcing one attempt per quiz on this client.
#[derive(Clone)]
pub struct QuizSessionService {
    clock: Clock,
    api: Arc<dyn QuizApi>,
    markers: Arc<dyn AttemptMarkerStore>,
    time_limit_secs: u32,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn QuizApi>, markers: Arc<dyn AttemptMarkerStore>) -> Self {
        Self {
            clock,
            api,
            markers,
            time_limit_secs: QUIZ_TIME_LIMIT_SECS,
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Whether this client already used its attempt for the quiz.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the marker store cannot be read.
    pub async fn has_attempted(&self, quiz_id: &QuizId) -> Result<bool, SessionError> {
        Ok(self.markers.has(quiz_id).await?)
    }

    /// Load the quiz and start its countdown.
    ///
    /// The attempt subscribes to `host` for focus-loss signals until it ends.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyAttempted` without contacting the quiz
    /// service when the marker is set, `SessionError::Load` if the quiz cannot
    /// be fetched, and `SessionError::Attempt` for a quiz with no questions.
    pub async fn start(
        &self,
        quiz_id: &QuizId,
        host: &HostEvents,
    ) -> Result<QuizSession, SessionError> {
        if self.markers.has(quiz_id).await? {
            info!("quiz {quiz_id} already attempted, refusing to start");
            return Err(SessionError::AlreadyAttempted);
        }

        let quiz = self.api.fetch_quiz(quiz_id).await?;
        let attempt = QuizAttempt::start(quiz, self.time_limit_secs)?;
        info!(
            "starting quiz {quiz_id} ({} questions, {}s)",
            attempt.total_questions(),
            self.time_limit_secs
        );

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::from_attempt(&attempt));

        let actor = SessionActor {
            attempt,
            clock: self.clock,
            api: Arc::clone(&self.api),
            markers: Arc::clone(&self.markers),
            events: event_tx,
            snapshot: snapshot_tx,
        };
        let task = tokio::spawn(actor.run(command_rx, host.subscribe()));

        Ok(QuizSession::new(
            quiz_id.clone(),
            command_tx,
            event_rx,
            snapshot_rx,
            task,
        ))
    }
}

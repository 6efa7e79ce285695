use std::sync::Arc;

use log::info;
use quiz_core::model::{QuestionDraft, QuizDraft, QuizId};

use crate::error::AuthoringError;
use crate::quiz_api::QuizApi;

/// Where a saved draft ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(QuizId),
    Updated(QuizId),
}

impl SaveOutcome {
    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => id,
        }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::Created(_) => "Quiz created successfully",
            SaveOutcome::Updated(_) => "Quiz updated successfully",
        }
    }
}

/// Create and edit quizzes on the quiz service.
#[derive(Clone)]
pub struct QuizAuthoringService {
    api: Arc<dyn QuizApi>,
}

impl QuizAuthoringService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>) -> Self {
        Self { api }
    }

    /// Load an existing quiz into an editable draft.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Api` if the quiz cannot be fetched.
    pub async fn load_draft(&self, quiz_id: &QuizId) -> Result<QuizDraft, AuthoringError> {
        let quiz = self.api.fetch_quiz(quiz_id).await?;
        Ok(QuizDraft {
            title: quiz.title().to_owned(),
            questions: quiz
                .questions()
                .iter()
                .map(QuestionDraft::from_question)
                .collect(),
        })
    }

    /// Validate the draft, then create it or update `quiz_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthoringError::Draft` before any request when a required
    /// field is missing, or `AuthoringError::Api` if the service rejects it.
    pub async fn save(
        &self,
        quiz_id: Option<&QuizId>,
        draft: &QuizDraft,
    ) -> Result<SaveOutcome, AuthoringError> {
        draft.validate()?;
        let outcome = match quiz_id {
            Some(id) => {
                self.api.update_quiz(id, draft).await?;
                SaveOutcome::Updated(id.clone())
            }
            None => SaveOutcome::Created(self.api.create_quiz(draft).await?),
        };
        info!("saved quiz {}", outcome.quiz_id());
        Ok(outcome)
    }
}

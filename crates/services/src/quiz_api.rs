use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use quiz_core::model::{Question, QuestionDraft, Quiz, QuizDraft, QuizId};

use crate::config::ApiConfig;
use crate::error::QuizApiError;

/// Score payload sent to the quiz service after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultReport {
    pub score: usize,
    pub total_questions: usize,
}

/// Remote quiz content and scoring service.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `QuizApiError::NotFound` for unknown quizzes, or transport and
    /// validation errors.
    async fn fetch_quiz(&self, id: &QuizId) -> Result<Quiz, QuizApiError>;

    /// # Errors
    ///
    /// Returns `QuizApiError` if the report is not accepted.
    async fn report_result(&self, id: &QuizId, report: &ResultReport) -> Result<(), QuizApiError>;

    /// # Errors
    ///
    /// Returns `QuizApiError` if the quiz cannot be created.
    async fn create_quiz(&self, draft: &QuizDraft) -> Result<QuizId, QuizApiError>;

    /// # Errors
    ///
    /// Returns `QuizApiError` if the quiz cannot be updated.
    async fn update_quiz(&self, id: &QuizId, draft: &QuizDraft) -> Result<(), QuizApiError>;
}

/// `QuizApi` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    config: ApiConfig,
}

impl HttpQuizApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, QuizApiError> {
        endpoint(&self.config.base_url, segments)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, QuizApiError> {
        let response = self.authorize(request).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(QuizApiError::NotFound),
            status => Err(QuizApiError::HttpStatus(status)),
        }
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<Quiz, QuizApiError> {
        let url = self.endpoint(&["quizzes", id.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        let payload: QuizPayload = response.json().await?;
        payload.into_quiz(id)
    }

    async fn report_result(&self, id: &QuizId, report: &ResultReport) -> Result<(), QuizApiError> {
        let url = self.endpoint(&["quizzes", id.as_str(), "results"])?;
        self.send(self.client.post(url).json(report)).await?;
        Ok(())
    }

    async fn create_quiz(&self, draft: &QuizDraft) -> Result<QuizId, QuizApiError> {
        let url = self.endpoint(&["quizzes"])?;
        let response = self.send(self.client.post(url).json(draft)).await?;
        let created: CreatedPayload = response.json().await?;
        Ok(QuizId::new(created.id)?)
    }

    async fn update_quiz(&self, id: &QuizId, draft: &QuizDraft) -> Result<(), QuizApiError> {
        let url = self.endpoint(&["quizzes", id.as_str()])?;
        self.send(self.client.put(url).json(draft)).await?;
        Ok(())
    }
}

/// Appends percent-encoded path segments to the service base url.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, QuizApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| QuizApiError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    title: String,
    #[serde(default)]
    questions: Vec<QuestionDraft>,
}

impl QuizPayload {
    fn into_quiz(self, id: &QuizId) -> Result<Quiz, QuizApiError> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question::new(q.text, q.options, q.correct_option))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz::new(id.clone(), self.title, questions)?)
    }
}

#[derive(Debug, Deserialize)]
struct CreatedPayload {
    #[serde(rename = "_id", alias = "id")]
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuizError;

    fn quiz_id() -> QuizId {
        QuizId::new("65f0c1a2").unwrap()
    }

    #[test]
    fn parses_service_payload() {
        let raw = r#"{
            "_id": "65f0c1a2",
            "title": "Rust basics",
            "questions": [
                {"question": "Keyword for immutable binding?", "options": ["let", "var", "mut", "const"], "correctAnswer": 0},
                {"question": "Owned string type?", "options": ["&str", "String", "char", "Box"], "correctAnswer": 1}
            ]
        }"#;
        let payload: QuizPayload = serde_json::from_str(raw).unwrap();
        let quiz = payload.into_quiz(&quiz_id()).unwrap();

        assert_eq!(quiz.title(), "Rust basics");
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz.questions()[1].correct_option(), 1);
        assert_eq!(quiz.id(), &quiz_id());
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let raw = r#"{"title": "T", "questions": [{"question": "Q", "options": ["a", "b"], "correctAnswer": 5}]}"#;
        let payload: QuizPayload = serde_json::from_str(raw).unwrap();
        let err = payload.into_quiz(&quiz_id()).unwrap_err();
        assert!(matches!(
            err,
            QuizApiError::InvalidQuiz(QuizError::CorrectOptionOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn report_uses_service_field_names() {
        let report = ResultReport {
            score: 3,
            total_questions: 5,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json, serde_json::json!({"score": 3, "totalQuestions": 5}));
    }

    #[test]
    fn draft_serializes_as_service_payload() {
        let mut draft = QuizDraft::new();
        draft.set_title("T");
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["questions"][0]["correctAnswer"], 0);
        assert_eq!(json["questions"][0]["question"], "");
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let base = Url::parse("http://localhost:5000/api/").unwrap();
        let url = endpoint(&base, &["quizzes", "a b", "results"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/quizzes/a%20b/results");

        let bare = Url::parse("http://localhost:5000/api").unwrap();
        let url = endpoint(&bare, &["quizzes"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/quizzes");
    }

    #[test]
    fn created_payload_accepts_either_id_field() {
        let a: CreatedPayload = serde_json::from_str(r#"{"_id": "x1"}"#).unwrap();
        let b: CreatedPayload = serde_json::from_str(r#"{"id": "x2"}"#).unwrap();
        assert_eq!(a.id, "x1");
        assert_eq!(b.id, "x2");
    }
}

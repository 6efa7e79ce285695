#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quiz_core::model::{Question, Quiz, QuizDraft, QuizId};
use services::{QuizApi, QuizApiError, ResultReport};

pub const QUIZ_ID: &str = "65f0c1a2";

pub fn quiz_id() -> QuizId {
    QuizId::new(QUIZ_ID).unwrap()
}

/// Quiz whose question `i` has `correct[i]` as its right option.
pub fn quiz_with(correct: &[usize]) -> Quiz {
    let questions = correct
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Question::new(
                format!("Question {}", i + 1),
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                *c,
            )
            .unwrap()
        })
        .collect();
    Quiz::new(quiz_id(), "General Knowledge", questions).unwrap()
}

/// In-process stand-in for the quiz service that records every call.
#[derive(Default)]
pub struct FakeQuizApi {
    quiz: Option<Quiz>,
    fail_reports: bool,
    report_delay: Option<Duration>,
    fetches: AtomicUsize,
    reports: Mutex<Vec<(QuizId, ResultReport)>>,
    created: Mutex<Vec<QuizDraft>>,
    updated: Mutex<Vec<(QuizId, QuizDraft)>>,
}

impl FakeQuizApi {
    pub fn serving(quiz: Quiz) -> Self {
        Self {
            quiz: Some(quiz),
            ..Self::default()
        }
    }

    pub fn failing_reports(mut self) -> Self {
        self.fail_reports = true;
        self
    }

    /// Hold every score report for `delay` before it is accepted.
    pub fn with_report_delay(mut self, delay: Duration) -> Self {
        self.report_delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn reports(&self) -> Vec<(QuizId, ResultReport)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<QuizDraft> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(QuizId, QuizDraft)> {
        self.updated.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizApi for FakeQuizApi {
    async fn fetch_quiz(&self, id: &QuizId) -> Result<Quiz, QuizApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.quiz {
            Some(quiz) if quiz.id() == id => Ok(quiz.clone()),
            _ => Err(QuizApiError::NotFound),
        }
    }

    async fn report_result(&self, id: &QuizId, report: &ResultReport) -> Result<(), QuizApiError> {
        if let Some(delay) = self.report_delay {
            tokio::time::sleep(delay).await;
        }
        self.reports.lock().unwrap().push((id.clone(), *report));
        if self.fail_reports {
            return Err(QuizApiError::HttpStatus(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(())
    }

    async fn create_quiz(&self, draft: &QuizDraft) -> Result<QuizId, QuizApiError> {
        self.created.lock().unwrap().push(draft.clone());
        Ok(QuizId::new("new-quiz")?)
    }

    async fn update_quiz(&self, id: &QuizId, draft: &QuizDraft) -> Result<(), QuizApiError> {
        self.updated.lock().unwrap().push((id.clone(), draft.clone()));
        Ok(())
    }
}

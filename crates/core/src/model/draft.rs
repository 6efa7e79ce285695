use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::quiz::Question;

/// Number of option slots a fresh question starts with.
pub const DEFAULT_OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizDraftError {
    #[error("quiz title is required")]
    EmptyTitle,

    #[error("quiz needs at least one question")]
    NoQuestions,

    #[error("question {index} does not exist")]
    QuestionOutOfRange { index: usize },

    #[error("option {option} of question {question} does not exist")]
    OptionOutOfRange { question: usize, option: usize },

    #[error("question {index} text is required")]
    EmptyQuestion { index: usize },

    #[error("option {option} of question {question} is required")]
    EmptyOption { question: usize, option: usize },
}

/// Editable question inside a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_option: usize,
}

impl QuestionDraft {
    #[must_use]
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            options: vec![String::new(); DEFAULT_OPTION_COUNT],
            correct_option: 0,
        }
    }

    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            text: question.text().to_owned(),
            options: question.options().to_vec(),
            correct_option: question.correct_option(),
        }
    }
}

/// Authoring-side quiz, freely editable until validated.
///
/// Serializes with the same field names the quiz service expects, so a draft
/// can be sent as a create/update payload directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDraft {
    pub title: String,
    pub questions: Vec<QuestionDraft>,
}

impl Default for QuizDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizDraft {
    /// A new draft with one blank question.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: String::new(),
            questions: vec![QuestionDraft::blank()],
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Appends a blank question and returns its index.
    pub fn add_question(&mut self) -> usize {
        self.questions.push(QuestionDraft::blank());
        self.questions.len() - 1
    }

    /// # Errors
    ///
    /// Returns `QuizDraftError::QuestionOutOfRange` for an unknown index.
    pub fn remove_question(&mut self, index: usize) -> Result<QuestionDraft, QuizDraftError> {
        if index >= self.questions.len() {
            return Err(QuizDraftError::QuestionOutOfRange { index });
        }
        Ok(self.questions.remove(index))
    }

    /// # Errors
    ///
    /// Returns `QuizDraftError::QuestionOutOfRange` for an unknown index.
    pub fn set_question_text(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), QuizDraftError> {
        self.question_mut(index)?.text = text.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizDraftError` if the question or option slot does not exist.
    pub fn set_option(
        &mut self,
        question: usize,
        option: usize,
        text: impl Into<String>,
    ) -> Result<(), QuizDraftError> {
        let slot = self
            .question_mut(question)?
            .options
            .get_mut(option)
            .ok_or(QuizDraftError::OptionOutOfRange { question, option })?;
        *slot = text.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizDraftError` if the question or option slot does not exist.
    pub fn set_correct_option(
        &mut self,
        question: usize,
        option: usize,
    ) -> Result<(), QuizDraftError> {
        let draft = self.question_mut(question)?;
        if option >= draft.options.len() {
            return Err(QuizDraftError::OptionOutOfRange { question, option });
        }
        draft.correct_option = option;
        Ok(())
    }

    /// Checks every required field and builds the domain questions.
    ///
    /// # Errors
    ///
    /// Returns the first `QuizDraftError` found, in question order.
    pub fn validate(&self) -> Result<Vec<Question>, QuizDraftError> {
        if self.title.trim().is_empty() {
            return Err(QuizDraftError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(QuizDraftError::NoQuestions);
        }

        let mut questions = Vec::with_capacity(self.questions.len());
        for (index, draft) in self.questions.iter().enumerate() {
            if draft.text.trim().is_empty() {
                return Err(QuizDraftError::EmptyQuestion { index });
            }
            if let Some(option) = draft.options.iter().position(|o| o.trim().is_empty()) {
                return Err(QuizDraftError::EmptyOption {
                    question: index,
                    option,
                });
            }
            let question = Question::new(
                draft.text.clone(),
                draft.options.clone(),
                draft.correct_option,
            )
            .map_err(|_| QuizDraftError::OptionOutOfRange {
                question: index,
                option: draft.correct_option,
            })?;
            questions.push(question);
        }
        Ok(questions)
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut QuestionDraft, QuizDraftError> {
        self.questions
            .get_mut(index)
            .ok_or(QuizDraftError::QuestionOutOfRange { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> QuizDraft {
        let mut draft = QuizDraft::new();
        draft.set_title("General Knowledge");
        draft.set_question_text(0, "Capital of France?").unwrap();
        for (i, opt) in ["Berlin", "Paris", "Rome", "Madrid"].iter().enumerate() {
            draft.set_option(0, i, *opt).unwrap();
        }
        draft.set_correct_option(0, 1).unwrap();
        draft
    }

    #[test]
    fn new_draft_has_one_blank_question() {
        let draft = QuizDraft::new();
        assert_eq!(draft.questions.len(), 1);
        assert_eq!(draft.questions[0].options.len(), DEFAULT_OPTION_COUNT);
        assert_eq!(draft.questions[0].correct_option, 0);
    }

    #[test]
    fn validate_builds_questions() {
        let questions = filled().validate().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_option(), 1);
        assert_eq!(questions[0].options()[1], "Paris");
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut draft = filled();
        draft.add_question();
        draft.set_question_text(1, "Second?").unwrap();
        assert_eq!(
            draft.validate().unwrap_err(),
            QuizDraftError::EmptyOption {
                question: 1,
                option: 0
            }
        );

        let mut untitled = filled();
        untitled.set_title("   ");
        assert_eq!(untitled.validate().unwrap_err(), QuizDraftError::EmptyTitle);
    }

    #[test]
    fn removing_every_question_fails_validation() {
        let mut draft = filled();
        draft.remove_question(0).unwrap();
        assert_eq!(draft.validate().unwrap_err(), QuizDraftError::NoQuestions);
        assert_eq!(
            draft.remove_question(0).unwrap_err(),
            QuizDraftError::QuestionOutOfRange { index: 0 }
        );
    }

    #[test]
    fn correct_option_must_exist() {
        let mut draft = filled();
        assert_eq!(
            draft.set_correct_option(0, 7).unwrap_err(),
            QuizDraftError::OptionOutOfRange {
                question: 0,
                option: 7
            }
        );
    }
}

use std::collections::BTreeMap;

use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::quiz::{Question, Quiz};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("option {option} is out of range for {len} options")]
    OptionOutOfRange { option: usize, len: usize },

    #[error("attempt already submitted")]
    AlreadySubmitted,
}

//
// ─── INPUTS / OUTPUTS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// What caused a submission. Only affects the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Manual,
    TimeExpired,
    FocusLost,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time remains; carries the seconds left after this tick.
    Running(u32),
    /// This tick exhausted the budget. Emitted once.
    Expired,
    /// The attempt was already submitted; the tick changed nothing.
    Stopped,
}

/// Frozen outcome of the first successful `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub score: usize,
    pub total: usize,
    pub reason: SubmitReason,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// In-memory state of one quiz attempt.
///
/// Every operation is a plain state transition; timers and focus observers
/// live in the services layer and drive this value.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    quiz: Quiz,
    current: usize,
    answers: BTreeMap<usize, usize>,
    time_remaining: u32,
    submitted: bool,
}

impl QuizAttempt {
    /// Begin an attempt with the given time budget in seconds.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NoQuestions` for a quiz without questions.
    pub fn start(quiz: Quiz, time_limit_secs: u32) -> Result<Self, AttemptError> {
        if quiz.is_empty() {
            return Err(AttemptError::NoQuestions);
        }
        Ok(Self {
            quiz,
            current: 0,
            answers: BTreeMap::new(),
            time_remaining: time_limit_secs,
            submitted: false,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        self.quiz.id()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.quiz.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // `current` is kept in `[0, len)` and `len > 0` is checked in `start`.
        &self.quiz.questions()[self.current]
    }

    /// Option chosen for the current question, if any.
    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.answers.get(&self.current).copied()
    }

    #[must_use]
    pub fn answer_for(&self, question: usize) -> Option<usize> {
        self.answers.get(&question).copied()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current + 1 == self.quiz.len()
    }

    /// Manual submit is only offered on the last question.
    #[must_use]
    pub fn submit_visible(&self) -> bool {
        self.is_last_question()
    }

    /// Manual submit is enabled once every question has an answer.
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        self.submit_visible() && self.answers.len() == self.quiz.len()
    }

    /// Record `option` for the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::OptionOutOfRange` if `option` does not exist on
    /// the current question, or `AttemptError::AlreadySubmitted` after submission.
    pub fn select_option(&mut self, option: usize) -> Result<(), AttemptError> {
        if self.submitted {
            return Err(AttemptError::AlreadySubmitted);
        }
        let len = self.current_question().options().len();
        if option >= len {
            return Err(AttemptError::OptionOutOfRange { option, len });
        }
        self.answers.insert(self.current, option);
        Ok(())
    }

    /// Move between questions. Out-of-range moves are no-ops.
    ///
    /// Returns the index after the move.
    pub fn navigate(&mut self, direction: Direction) -> usize {
        match direction {
            Direction::Previous => {
                self.current = self.current.saturating_sub(1);
            }
            Direction::Next => {
                if self.current + 1 < self.quiz.len() {
                    self.current += 1;
                }
            }
        }
        self.current
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.submitted {
            return TickOutcome::Stopped;
        }
        if self.time_remaining <= 1 {
            self.time_remaining = 0;
            return TickOutcome::Expired;
        }
        self.time_remaining -= 1;
        TickOutcome::Running(self.time_remaining)
    }

    /// Number of answers matching the correct option. Unanswered questions
    /// never count.
    #[must_use]
    pub fn score(&self) -> usize {
        self.quiz
            .questions()
            .iter()
            .enumerate()
            .filter(|(index, question)| {
                self.answers
                    .get(index)
                    .is_some_and(|answer| question.is_correct(*answer))
            })
            .count()
    }

    /// Close the attempt and freeze its score.
    ///
    /// Returns `None` if the attempt was already submitted, so at most one
    /// `Submission` is ever produced.
    pub fn submit(&mut self, reason: SubmitReason) -> Option<Submission> {
        if self.submitted {
            return None;
        }
        self.submitted = true;
        Some(Submission {
            quiz_id: self.quiz.id().clone(),
            quiz_title: self.quiz.title().to_owned(),
            score: self.score(),
            total: self.quiz.len(),
            reason,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

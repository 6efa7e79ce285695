use chrono::{DateTime, Utc};

use quiz_core::model::{QuizAttempt, QuizId, SubmitReason};
use quiz_core::time::format_time;

/// Seconds at or below which the countdown is shown as urgent.
pub const LOW_TIME_SECS: u32 = 60;

/// Presentation-agnostic view of a running attempt.
///
/// Published after every state change; hosts render from the latest value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub quiz_id: QuizId,
    pub title: String,
    pub question: String,
    pub options: Vec<String>,
    pub current_index: usize,
    pub total: usize,
    pub selected: Option<usize>,
    pub answered: usize,
    pub time_remaining: u32,
    pub submit_visible: bool,
    pub submit_enabled: bool,
    pub submitted: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn from_attempt(attempt: &QuizAttempt) -> Self {
        let question = attempt.current_question();
        Self {
            quiz_id: attempt.quiz_id().clone(),
            title: attempt.quiz().title().to_owned(),
            question: question.text().to_owned(),
            options: question.options().to_vec(),
            current_index: attempt.current_index(),
            total: attempt.total_questions(),
            selected: attempt.selected_option(),
            answered: attempt.answered_count(),
            time_remaining: attempt.time_remaining(),
            submit_visible: attempt.submit_visible(),
            submit_enabled: attempt.submit_enabled(),
            submitted: attempt.is_submitted(),
        }
    }

    /// Share of the quiz reached, counting the current question, in percent.
    #[must_use]
    pub fn progress_percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.current_index + 1) * 100 / self.total
    }

    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.time_remaining <= LOW_TIME_SECS
    }

    #[must_use]
    pub fn formatted_time(&self) -> String {
        format_time(self.time_remaining)
    }
}

/// User-visible notices raised by the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    AlreadyAttempted,
    LoadFailed,
    TimeUp,
    FocusLost,
}

impl SessionNotice {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            SessionNotice::AlreadyAttempted => "You have already attempted this quiz",
            SessionNotice::LoadFailed => "Failed to load quiz",
            SessionNotice::TimeUp => "Time is up! Quiz submitted.",
            SessionNotice::FocusLost => "Quiz auto-submitted due to focus loss",
        }
    }

    /// Notice shown when a submission is forced; manual submits have none.
    #[must_use]
    pub fn for_reason(reason: SubmitReason) -> Option<Self> {
        match reason {
            SubmitReason::Manual => None,
            SubmitReason::TimeExpired => Some(SessionNotice::TimeUp),
            SubmitReason::FocusLost => Some(SessionNotice::FocusLost),
        }
    }
}

/// Hand-off from a finished attempt to the result view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub quiz_id: QuizId,
    pub quiz_title: String,
    pub score: usize,
    pub total: usize,
    pub reason: SubmitReason,
    pub submitted_at: DateTime<Utc>,
}

impl QuizResult {
    #[must_use]
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.score * 100 / self.total
    }
}

/// Events a running session delivers to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Notice(SessionNotice),
    Finished(QuizResult),
}

mod attempt;
mod draft;
mod ids;
mod quiz;

pub use ids::{ParseIdError, QuizId};

pub use attempt::{AttemptError, Direction, QuizAttempt, Submission, SubmitReason, TickOutcome};
pub use draft::{DEFAULT_OPTION_COUNT, QuestionDraft, QuizDraft, QuizDraftError};
pub use quiz::{Question, Quiz, QuizError};

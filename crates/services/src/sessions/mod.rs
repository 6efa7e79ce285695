mod controller;
mod host;
mod service;
mod session;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use host::{HostEvents, HostSignal};
pub use service::QuizSessionService;
pub use session::QuizSession;
pub use view::{LOW_TIME_SECS, QuizResult, SessionEvent, SessionNotice, SessionSnapshot};

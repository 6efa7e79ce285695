#![forbid(unsafe_code)]

pub mod app_services;
pub mod authoring_service;
pub mod config;
pub mod error;
pub mod quiz_api;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use authoring_service::{QuizAuthoringService, SaveOutcome};
pub use config::ApiConfig;
pub use error::{AppServicesError, AuthoringError, ConfigError, QuizApiError, SessionError};
pub use quiz_api::{HttpQuizApi, QuizApi, ResultReport};

pub use sessions::{
    HostEvents, HostSignal, QuizResult, QuizSession, QuizSessionService, SessionEvent,
    SessionNotice, SessionSnapshot,
};

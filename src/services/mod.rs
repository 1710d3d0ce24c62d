pub mod auth_service;
pub mod quiz_attempt_service;
pub mod quiz_service;
pub mod slug;

pub use auth_service::{AuthService, Session};
pub use quiz_attempt_service::{QuizAttemptService, StartOutcome, SubmitOutcome, TabSwitchOutcome};
pub use quiz_service::QuizService;

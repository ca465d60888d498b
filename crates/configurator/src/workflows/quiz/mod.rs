//! Quiz flow: conditional question visibility, answer validation, session
//! persistence and item scoring.

pub mod form;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use form::{selected_choice_ids, QuestionField, QuizForm, RawSelections, Selection};
pub use repository::{Answer, NewAnswer, QuizSession, SessionId, SessionStore};
pub use router::{quiz_router, ContactRequest};
pub use scoring::{ItemScore, ScoreOutcome, ScoringEngine, ScoringError};
pub use service::{ContactResult, QuizResult, QuizService, QuizServiceError};
pub use visibility::{is_visible, QuestionVisibility, VisibilityResolver};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::domain::{ChoiceId, GroupId, ItemId, QuestionId};
use crate::catalog::repository::RepositoryError;
use crate::workflows::leads::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One end-user quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: SessionId,
    pub group_id: GroupId,
    pub created_at: DateTime<Utc>,
    pub recommended_item: Option<ItemId>,
    #[serde(default)]
    pub participant: Option<Participant>,
    #[serde(default)]
    pub interested_items: Vec<ItemId>,
}

/// Immutable fact: in this session, this choice was selected for this question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

/// A selection waiting to be stored with its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnswer {
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

/// Persistence for sessions and their answers.
pub trait SessionStore: Send + Sync {
    /// Create a session together with every answer of its submission, or
    /// nothing at all. Each choice must be an option of its question.
    fn open_session(
        &self,
        group: GroupId,
        answers: &[NewAnswer],
    ) -> Result<QuizSession, RepositoryError>;
    fn answers_for_session(&self, session: SessionId) -> Result<Vec<Answer>, RepositoryError>;
    fn session(&self, id: SessionId) -> Result<Option<QuizSession>, RepositoryError>;
    fn set_recommended_item(&self, id: SessionId, item: ItemId) -> Result<(), RepositoryError>;
    fn attach_participant(
        &self,
        id: SessionId,
        participant: Participant,
        interested_items: Vec<ItemId>,
    ) -> Result<(), RepositoryError>;
}

mod ranking;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use super::repository::{QuizSession, SessionId, SessionStore};
use crate::catalog::domain::{Item, ItemId, QuestionId};
use crate::catalog::repository::{CatalogReader, ImpactReader, RepositoryError};
use ranking::Tally;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemScore {
    pub item: Item,
    pub score: f64,
}

/// Scores recomputed from a session's persisted answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreOutcome {
    /// Total per item that received at least one impact.
    pub scores: BTreeMap<ItemId, f64>,
    /// Score descending, then item name ascending.
    pub breakdown: Vec<ItemScore>,
    /// Every item sharing the maximum score.
    pub top_items: Vec<Item>,
    /// Top item with the smallest name.
    pub recommended: Option<Item>,
}

impl ScoreOutcome {
    /// True for the "no match" state: no answers, or none carried impacts.
    pub fn is_empty(&self) -> bool {
        self.breakdown.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("quiz session {0} not found")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read-only scorer over persisted answers.
///
/// It never sees submitted form data, so a session id alone is enough to
/// replay a result.
pub struct ScoringEngine<C, S> {
    catalog: Arc<C>,
    sessions: Arc<S>,
}

impl<C, S> ScoringEngine<C, S>
where
    C: CatalogReader + ImpactReader,
    S: SessionStore,
{
    pub fn new(catalog: Arc<C>, sessions: Arc<S>) -> Self {
        Self { catalog, sessions }
    }

    pub fn score(&self, session_id: SessionId) -> Result<ScoreOutcome, ScoringError> {
        let session = self
            .sessions
            .session(session_id)?
            .ok_or(ScoringError::SessionNotFound(session_id))?;
        Ok(self.score_session(&session)?)
    }

    pub fn score_session(&self, session: &QuizSession) -> Result<ScoreOutcome, RepositoryError> {
        let answers = self.sessions.answers_for_session(session.id)?;

        let mut affects: HashMap<QuestionId, bool> = HashMap::new();
        let mut items: HashMap<ItemId, Option<Item>> = HashMap::new();
        let mut tally = Tally::default();

        for answer in answers {
            let counts = match affects.get(&answer.question_id) {
                Some(counts) => *counts,
                None => {
                    let counts = self
                        .catalog
                        .question(answer.question_id)?
                        .map(|question| question.affects_score)
                        .unwrap_or(false);
                    affects.insert(answer.question_id, counts);
                    counts
                }
            };
            if !counts {
                continue;
            }

            for impact in self.catalog.impacts_for_choice(answer.choice_id)? {
                if !items.contains_key(&impact.item_id) {
                    let item = self.catalog.item(impact.item_id)?;
                    items.insert(impact.item_id, item);
                }
                if let Some(Some(item)) = items.get(&impact.item_id) {
                    tally.add(session.group_id, item, impact.score);
                }
            }
        }

        Ok(tally.rank())
    }
}

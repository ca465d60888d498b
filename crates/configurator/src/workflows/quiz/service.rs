use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use super::form::{QuizForm, RawSelections};
use super::repository::{NewAnswer, QuizSession, SessionId, SessionStore};
use super::scoring::{ScoreOutcome, ScoringEngine};
use super::visibility::VisibilityResolver;
use crate::catalog::domain::{Choice, GroupId, Item, ItemId, ProductGroup, QuestionId};
use crate::catalog::repository::{CatalogReader, ImpactReader, RepositoryError};
use crate::catalog::validation::CatalogViolation;
use crate::workflows::leads::{
    Lead, LeadDispatcher, LeadGateway, LeadPushStatus, Participant, SelectionSummary,
};
use crate::workflows::validation::FieldErrors;

/// Items shown next to the recommendation.
const FAMILY_LIMIT: usize = 8;

/// Scored session as shown on the result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub session: QuizSession,
    pub outcome: ScoreOutcome,
    /// Other active items of the group, excluding the top items.
    pub family: Vec<Item>,
    pub no_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactResult {
    #[serde(flatten)]
    pub result: QuizResult,
    pub erp: LeadPushStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error("product group '{0}' not found")]
    GroupNotFound(String),
    #[error("quiz session {0} not found")]
    SessionNotFound(SessionId),
    #[error("{0}")]
    Invalid(FieldErrors),
    #[error("quiz is misconfigured: {0}")]
    Configuration(#[from] CatalogViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Quiz flow for one catalog: form, submission, result replay and the
/// contact step.
pub struct QuizService<C, S, L> {
    catalog: Arc<C>,
    sessions: Arc<S>,
    scoring: ScoringEngine<C, S>,
    dispatcher: Arc<LeadDispatcher<L>>,
}

impl<C, S, L> QuizService<C, S, L>
where
    C: CatalogReader + ImpactReader,
    S: SessionStore,
    L: LeadGateway,
{
    pub fn new(catalog: Arc<C>, sessions: Arc<S>, dispatcher: Arc<LeadDispatcher<L>>) -> Self {
        let scoring = ScoringEngine::new(Arc::clone(&catalog), Arc::clone(&sessions));
        Self {
            catalog,
            sessions,
            scoring,
            dispatcher,
        }
    }

    pub fn scoring(&self) -> &ScoringEngine<C, S> {
        &self.scoring
    }

    /// Form for an active group, bound to the given selections.
    pub fn form(&self, slug: &str, raw: &RawSelections) -> Result<QuizForm, QuizServiceError> {
        let group = self.active_group(slug)?;
        let questions = self.catalog.questions_for_group(group.id)?;

        // Parents always share the group; the catalog rejects cross-group links.
        let mut choices: HashMap<QuestionId, Vec<Choice>> = HashMap::new();
        for question in &questions {
            choices.insert(question.id, self.catalog.choices_for_question(question.id)?);
        }

        let all_choices: Vec<Choice> = choices.values().flatten().cloned().collect();
        let resolver = VisibilityResolver::build(questions, &all_choices)?;

        Ok(QuizForm::build(&group, &resolver, &choices, raw))
    }

    /// Validate, persist and score one submission.
    ///
    /// Nothing is written unless every visible field validates.
    pub fn submit(&self, slug: &str, raw: &RawSelections) -> Result<QuizResult, QuizServiceError> {
        let form = self.form(slug, raw)?;
        let selections = form.validate().map_err(QuizServiceError::Invalid)?;

        let answers: Vec<NewAnswer> = selections
            .iter()
            .map(|selection| NewAnswer {
                question_id: selection.question_id,
                choice_id: selection.choice_id,
            })
            .collect();
        let mut session = self.sessions.open_session(form.group_id, &answers)?;

        let outcome = self.scoring.score_session(&session)?;
        if let Some(item) = &outcome.recommended {
            self.sessions.set_recommended_item(session.id, item.id)?;
            session.recommended_item = Some(item.id);
        }

        tracing::info!(
            session = %session.id,
            group = %form.group_slug,
            answers = selections.len(),
            recommended = ?session.recommended_item,
            "quiz submitted"
        );

        self.result_for(session, outcome)
    }

    /// Recompute a session's result from its stored answers.
    pub fn result(&self, id: SessionId) -> Result<QuizResult, QuizServiceError> {
        let session = self.session(id)?;
        let outcome = self.scoring.score_session(&session)?;
        self.result_for(session, outcome)
    }

    /// Attach contact details to a session and forward them as a lead.
    ///
    /// The ERP push is best-effort; its outcome rides along in the response.
    pub async fn submit_contact(
        &self,
        id: SessionId,
        participant: Participant,
        interested: Vec<ItemId>,
    ) -> Result<ContactResult, QuizServiceError> {
        let session = self.session(id)?;
        participant.validate().map_err(QuizServiceError::Invalid)?;
        let participant = participant.trimmed();

        let mut interested_items: Vec<Item> = Vec::new();
        for item_id in interested {
            if interested_items.iter().any(|item| item.id == item_id) {
                continue;
            }
            if let Some(item) = self
                .catalog
                .item(item_id)?
                .filter(|item| item.group_id == session.group_id)
            {
                interested_items.push(item);
            }
        }

        self.sessions.attach_participant(
            session.id,
            participant.clone(),
            interested_items.iter().map(|item| item.id).collect(),
        )?;

        let selections = self.selection_summary(session.id)?;
        let names: Vec<String> = interested_items.into_iter().map(|item| item.name).collect();
        let lead = Lead::for_quiz(&participant, &names, &selections);
        let erp = self.dispatcher.dispatch(&lead).await;

        let session = self.session(id)?;
        let outcome = self.scoring.score_session(&session)?;
        let result = self.result_for(session, outcome)?;
        tracing::info!(session = %id, pushed = erp.is_pushed(), "quiz contact recorded");

        Ok(ContactResult { result, erp })
    }

    fn active_group(&self, slug: &str) -> Result<ProductGroup, QuizServiceError> {
        self.catalog
            .group_by_slug(slug)?
            .filter(|group| group.is_active)
            .ok_or_else(|| QuizServiceError::GroupNotFound(slug.to_string()))
    }

    fn session(&self, id: SessionId) -> Result<QuizSession, QuizServiceError> {
        self.sessions
            .session(id)?
            .ok_or(QuizServiceError::SessionNotFound(id))
    }

    fn result_for(
        &self,
        session: QuizSession,
        outcome: ScoreOutcome,
    ) -> Result<QuizResult, QuizServiceError> {
        let family = self.family(session.group_id, &outcome)?;
        Ok(QuizResult {
            no_match: outcome.is_empty(),
            session,
            outcome,
            family,
        })
    }

    fn family(&self, group: GroupId, outcome: &ScoreOutcome) -> Result<Vec<Item>, RepositoryError> {
        let top: HashSet<ItemId> = outcome.top_items.iter().map(|item| item.id).collect();
        Ok(self
            .catalog
            .items_for_group(group)?
            .into_iter()
            .filter(|item| item.is_active && !top.contains(&item.id))
            .take(FAMILY_LIMIT)
            .collect())
    }

    /// Selected choices grouped under their question label, in question
    /// order then choice order.
    fn selection_summary(&self, id: SessionId) -> Result<Vec<SelectionSummary>, RepositoryError> {
        let mut rows = Vec::new();
        for answer in self.sessions.answers_for_session(id)? {
            let (Some(question), Some(choice)) = (
                self.catalog.question(answer.question_id)?,
                self.catalog.choice(answer.choice_id)?,
            ) else {
                continue;
            };
            rows.push((question, choice));
        }
        rows.sort_by_key(|(question, choice)| (question.order, question.id, choice.order, choice.id));

        let mut summary: Vec<SelectionSummary> = Vec::new();
        for (question, choice) in rows {
            let label = question.label().trim().to_string();
            let text = choice.text.trim().to_string();
            if label.is_empty() || text.is_empty() {
                continue;
            }
            match summary.iter_mut().find(|entry| entry.label == label) {
                Some(entry) => entry.choices.push(text),
                None => summary.push(SelectionSummary {
                    label,
                    choices: vec![text],
                }),
            }
        }
        Ok(summary)
    }
}

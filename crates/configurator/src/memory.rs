//! In-process stores backing the demo server, the CLI importer and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::catalog::domain::{
    Choice, ChoiceId, ChoiceImpact, GroupId, ImpactWeight, Item, ItemId, ItemVariant,
    ProductGroup, Question, QuestionId, VariantId,
};
use crate::catalog::repository::{CatalogReader, CatalogWriter, ImpactReader, RepositoryError};
use crate::catalog::validation::{check_dependency, find_cycle, CatalogViolation};
use crate::workflows::careers::{
    ApplicantReceipt, CareersGateway, JobApplication, JobDetails, JobOpening,
};
use crate::workflows::leads::{
    ContactInbox, ContactMessage, ContactRecord, ErpError, LeadGateway, LeadPayload, LeadReceipt,
    Participant,
};
use crate::workflows::quiz::repository::{
    Answer, NewAnswer, QuizSession, SessionId, SessionStore,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

#[derive(Debug, Default)]
struct CatalogState {
    groups: BTreeMap<GroupId, ProductGroup>,
    items: BTreeMap<ItemId, Item>,
    questions: BTreeMap<QuestionId, Question>,
    choices: BTreeMap<ChoiceId, Choice>,
    impacts: BTreeMap<(ChoiceId, ItemId), f64>,
    variants: BTreeMap<VariantId, ItemVariant>,
}

/// Catalog held in memory. Identifiers come from one shared sequence.
#[derive(Debug)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
    ids: AtomicU64,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogState::default()),
            ids: AtomicU64::new(1),
        }
    }

    fn reserve(&self, id: u64) {
        self.ids.fetch_max(id + 1, Ordering::SeqCst);
    }
}

impl CatalogReader for InMemoryCatalog {
    fn groups(&self) -> Result<Vec<ProductGroup>, RepositoryError> {
        Ok(lock(&self.state)?.groups.values().cloned().collect())
    }

    fn group_by_slug(&self, slug: &str) -> Result<Option<ProductGroup>, RepositoryError> {
        Ok(lock(&self.state)?
            .groups
            .values()
            .find(|group| group.slug == slug)
            .cloned())
    }

    fn questions_for_group(&self, group: GroupId) -> Result<Vec<Question>, RepositoryError> {
        let state = lock(&self.state)?;
        let mut questions: Vec<Question> = state
            .questions
            .values()
            .filter(|question| question.group_id == group)
            .cloned()
            .collect();
        questions.sort_by_key(|question| (question.order, question.id));
        Ok(questions)
    }

    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError> {
        Ok(lock(&self.state)?.questions.get(&id).cloned())
    }

    fn choices_for_question(&self, question: QuestionId) -> Result<Vec<Choice>, RepositoryError> {
        let state = lock(&self.state)?;
        let mut choices: Vec<Choice> = state
            .choices
            .values()
            .filter(|choice| choice.question_id == question)
            .cloned()
            .collect();
        choices.sort_by_key(|choice| (choice.order, choice.id));
        Ok(choices)
    }

    fn choice(&self, id: ChoiceId) -> Result<Option<Choice>, RepositoryError> {
        Ok(lock(&self.state)?.choices.get(&id).cloned())
    }

    fn item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        Ok(lock(&self.state)?.items.get(&id).cloned())
    }

    fn item_by_code(&self, code: &str) -> Result<Option<Item>, RepositoryError> {
        Ok(lock(&self.state)?
            .items
            .values()
            .find(|item| item.item_code.as_deref() == Some(code))
            .cloned())
    }

    fn items_for_group(&self, group: GroupId) -> Result<Vec<Item>, RepositoryError> {
        let state = lock(&self.state)?;
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|item| item.group_id == group)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn variants_for_item(&self, item: ItemId) -> Result<Vec<ItemVariant>, RepositoryError> {
        Ok(lock(&self.state)?
            .variants
            .values()
            .filter(|variant| variant.item_id == item)
            .cloned()
            .collect())
    }
}

impl ImpactReader for InMemoryCatalog {
    fn impacts_for_choice(&self, choice: ChoiceId) -> Result<Vec<ImpactWeight>, RepositoryError> {
        Ok(lock(&self.state)?
            .impacts
            .range((choice, ItemId(0))..=(choice, ItemId(u64::MAX)))
            .map(|(&(_, item_id), &score)| ImpactWeight { item_id, score })
            .collect())
    }
}

impl CatalogWriter for InMemoryCatalog {
    fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::SeqCst)
    }

    fn save_group(&self, group: ProductGroup) -> Result<ProductGroup, RepositoryError> {
        let mut state = lock(&self.state)?;
        if state
            .groups
            .values()
            .any(|existing| existing.slug == group.slug && existing.id != group.id)
        {
            return Err(RepositoryError::Conflict);
        }
        self.reserve(group.id.0);
        state.groups.insert(group.id, group.clone());
        Ok(group)
    }

    fn save_item(&self, item: Item) -> Result<Item, RepositoryError> {
        let mut state = lock(&self.state)?;
        if !state.groups.contains_key(&item.group_id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(code) = item.item_code.as_deref() {
            if state.items.values().any(|existing| {
                existing.id != item.id && existing.item_code.as_deref() == Some(code)
            }) {
                return Err(RepositoryError::Conflict);
            }
        }
        self.reserve(item.id.0);
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn save_question(&self, question: Question) -> Result<Question, RepositoryError> {
        let mut state = lock(&self.state)?;
        if !state.groups.contains_key(&question.group_id) {
            return Err(RepositoryError::NotFound);
        }

        {
            let choices = &state.choices;
            let questions = &state.questions;
            check_dependency(
                &question,
                |choice| choices.get(&choice).map(|choice| choice.question_id),
                |id| questions.get(&id),
            )?;
        }

        let mut parents: HashMap<QuestionId, QuestionId> = state
            .questions
            .values()
            .filter(|stored| stored.id != question.id)
            .filter_map(|stored| stored.depends_on.map(|parent| (stored.id, parent)))
            .collect();
        if let Some(parent) = question.depends_on {
            parents.insert(question.id, parent);
        }
        if let Some(looping) = find_cycle(&parents) {
            return Err(CatalogViolation::DependencyCycle { question: looping }.into());
        }

        self.reserve(question.id.0);
        state.questions.insert(question.id, question.clone());
        Ok(question)
    }

    fn save_choice(&self, choice: Choice) -> Result<Choice, RepositoryError> {
        let mut state = lock(&self.state)?;
        if !state.questions.contains_key(&choice.question_id) {
            return Err(CatalogViolation::UnknownQuestion {
                choice: choice.id,
                question: choice.question_id,
            }
            .into());
        }
        self.reserve(choice.id.0);
        state.choices.insert(choice.id, choice.clone());
        Ok(choice)
    }

    fn clear_choices(&self, question: QuestionId) -> Result<usize, RepositoryError> {
        let mut state = lock(&self.state)?;
        let doomed: Vec<ChoiceId> = state
            .choices
            .values()
            .filter(|choice| choice.question_id == question)
            .map(|choice| choice.id)
            .collect();
        for id in &doomed {
            state.choices.remove(id);
        }
        state
            .impacts
            .retain(|(choice, _), _| !doomed.contains(choice));
        for stored in state.questions.values_mut() {
            stored
                .trigger_choices
                .retain(|choice| !doomed.contains(choice));
        }
        Ok(doomed.len())
    }

    fn save_impact(&self, impact: ChoiceImpact) -> Result<(), RepositoryError> {
        let mut state = lock(&self.state)?;
        if !state.choices.contains_key(&impact.choice_id)
            || !state.items.contains_key(&impact.item_id)
        {
            return Err(RepositoryError::NotFound);
        }
        state
            .impacts
            .insert((impact.choice_id, impact.item_id), impact.score);
        Ok(())
    }

    fn save_variant(&self, variant: ItemVariant) -> Result<ItemVariant, RepositoryError> {
        let mut state = lock(&self.state)?;
        if !state.items.contains_key(&variant.item_id) {
            return Err(RepositoryError::NotFound);
        }
        self.reserve(variant.id.0);
        state.variants.insert(variant.id, variant.clone());
        Ok(variant)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    sessions: BTreeMap<SessionId, QuizSession>,
    answers: HashMap<SessionId, Vec<Answer>>,
}

/// Quiz sessions and their answers held in memory.
///
/// Answers are checked against `catalog` so a choice is only ever stored under
/// the question that offers it.
pub struct InMemorySessionStore {
    state: Mutex<SessionState>,
    ids: AtomicU64,
    catalog: Arc<dyn CatalogReader>,
}

impl InMemorySessionStore {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            ids: AtomicU64::new(0),
            catalog,
        }
    }

    fn check_ownership(&self, answers: &[NewAnswer]) -> Result<(), RepositoryError> {
        for answer in answers {
            let owner = self.catalog.choice(answer.choice_id)?.map(|choice| choice.question_id);
            if owner != Some(answer.question_id) {
                return Err(CatalogViolation::ForeignAnswerChoice {
                    question: answer.question_id,
                    choice: answer.choice_id,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl SessionStore for InMemorySessionStore {
    fn open_session(
        &self,
        group: GroupId,
        answers: &[NewAnswer],
    ) -> Result<QuizSession, RepositoryError> {
        self.check_ownership(answers)?;

        let mut state = lock(&self.state)?;
        let id = SessionId(self.ids.fetch_add(1, Ordering::SeqCst) + 1);
        let session = QuizSession {
            id,
            group_id: group,
            created_at: Utc::now(),
            recommended_item: None,
            participant: None,
            interested_items: Vec::new(),
        };
        let answers = answers
            .iter()
            .map(|answer| Answer {
                session_id: id,
                question_id: answer.question_id,
                choice_id: answer.choice_id,
            })
            .collect();
        state.sessions.insert(id, session.clone());
        state.answers.insert(id, answers);
        Ok(session)
    }

    fn answers_for_session(&self, session: SessionId) -> Result<Vec<Answer>, RepositoryError> {
        Ok(lock(&self.state)?
            .answers
            .get(&session)
            .cloned()
            .unwrap_or_default())
    }

    fn session(&self, id: SessionId) -> Result<Option<QuizSession>, RepositoryError> {
        Ok(lock(&self.state)?.sessions.get(&id).cloned())
    }

    fn set_recommended_item(&self, id: SessionId, item: ItemId) -> Result<(), RepositoryError> {
        let mut state = lock(&self.state)?;
        let session = state.sessions.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        session.recommended_item = Some(item);
        Ok(())
    }

    fn attach_participant(
        &self,
        id: SessionId,
        participant: Participant,
        interested_items: Vec<ItemId>,
    ) -> Result<(), RepositoryError> {
        let mut state = lock(&self.state)?;
        let session = state.sessions.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        session.participant = Some(participant);
        session.interested_items = interested_items;
        Ok(())
    }
}

/// Contact messages held in memory.
#[derive(Debug, Default)]
pub struct InMemoryContactInbox {
    records: Mutex<Vec<ContactRecord>>,
}

impl InMemoryContactInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Result<Vec<ContactRecord>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }
}

impl ContactInbox for InMemoryContactInbox {
    fn record(&self, message: ContactMessage) -> Result<ContactRecord, RepositoryError> {
        let mut records = lock(&self.records)?;
        let record = ContactRecord {
            id: records.len() as u64 + 1,
            received_at: Utc::now(),
            message,
            handled: false,
        };
        records.push(record.clone());
        Ok(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Accept,
    Reject(u16),
    Fail,
}

/// Gateway that keeps every payload it is handed and answers with a fixed
/// outcome. Used by the demo command and tests in place of a live ERP, for
/// leads and the careers board alike.
#[derive(Debug)]
pub struct RecordingGateway {
    payloads: Mutex<Vec<LeadPayload>>,
    applications: Mutex<Vec<JobApplication>>,
    openings: Vec<JobOpening>,
    reply: Reply,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::accepting()
    }
}

impl RecordingGateway {
    fn replying(reply: Reply) -> Self {
        Self {
            payloads: Mutex::new(Vec::new()),
            applications: Mutex::new(Vec::new()),
            openings: Vec::new(),
            reply,
        }
    }

    pub fn accepting() -> Self {
        Self::replying(Reply::Accept)
    }

    pub fn rejecting(status: u16) -> Self {
        Self::replying(Reply::Reject(status))
    }

    /// Every call fails as if the ERP were unreachable.
    pub fn failing() -> Self {
        Self::replying(Reply::Fail)
    }

    /// Job openings served by the careers side of the gateway.
    pub fn with_openings(mut self, openings: Vec<JobOpening>) -> Self {
        self.openings = openings;
        self
    }

    pub fn payloads(&self) -> Vec<LeadPayload> {
        self.payloads
            .lock()
            .map(|payloads| payloads.clone())
            .unwrap_or_default()
    }

    pub fn applications(&self) -> Vec<JobApplication> {
        self.applications
            .lock()
            .map(|applications| applications.clone())
            .unwrap_or_default()
    }

    fn outcome(&self, status: u16) -> Result<u16, ErpError> {
        match self.reply {
            Reply::Accept => Ok(status),
            Reply::Reject(status) => Err(ErpError::Rejected {
                status,
                body: "rejected by recorder".to_string(),
            }),
            Reply::Fail => Err(ErpError::Transport(
                "connection refused by recorder".to_string(),
            )),
        }
    }

    fn record<T: Clone>(log: &Mutex<Vec<T>>, entry: &T) -> Result<(), ErpError> {
        log.lock()
            .map_err(|_| ErpError::Transport("recorder mutex poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl LeadGateway for RecordingGateway {
    async fn push_lead(&self, payload: &LeadPayload) -> Result<LeadReceipt, ErpError> {
        Self::record(&self.payloads, payload)?;
        let status = self.outcome(201)?;
        Ok(LeadReceipt { status })
    }
}

#[async_trait]
impl CareersGateway for RecordingGateway {
    async fn job_openings(&self) -> Result<Vec<JobOpening>, ErpError> {
        self.outcome(200)?;
        Ok(self.openings.clone())
    }

    async fn job_opening(&self, name: &str) -> Result<Option<JobDetails>, ErpError> {
        self.outcome(200)?;
        Ok(self
            .openings
            .iter()
            .find(|job| job.name == name)
            .map(|job| JobDetails {
                name: job.name.clone(),
                description: String::new(),
                vacancies: None,
                territory: job.territory.clone(),
                designation: job.designation.clone(),
                qualification: job.qualification.clone(),
            }))
    }

    async fn submit_applicant(
        &self,
        application: &JobApplication,
    ) -> Result<ApplicantReceipt, ErpError> {
        Self::record(&self.applications, application)?;
        let status = self.outcome(200)?;
        let count = self.applications().len();
        Ok(ApplicantReceipt {
            status,
            applicant: Some(format!("HR-APP-{count:04}")),
        })
    }
}

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::catalog::domain::{field_name, Choice, ChoiceId, Question, QuestionId};
use crate::catalog::validation::{find_cycle, CatalogViolation};

/// Visibility of one question under a given selection.
///
/// The form view only ever copies these flags; it never derives its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionVisibility {
    pub question_id: QuestionId,
    pub field: String,
    pub visible: bool,
    pub required: bool,
    /// Field name of the parent question, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub trigger_choices: Vec<ChoiceId>,
}

/// Decide whether `question` is shown for the selected choices.
///
/// `parent_choices` holds every choice id of the question's parent and is
/// only consulted when the question has a parent but no trigger choices.
pub fn is_visible(
    question: &Question,
    parent_choices: &BTreeSet<ChoiceId>,
    selected: &BTreeSet<ChoiceId>,
) -> bool {
    if question.depends_on.is_none() {
        return true;
    }
    if !question.trigger_choices.is_empty() {
        return !question.trigger_choices.is_disjoint(selected);
    }
    !parent_choices.is_disjoint(selected)
}

/// Parent/child question graph for one product group.
///
/// Built once per group fetch; construction fails when `depends_on` links form
/// a cycle.
#[derive(Debug, Clone)]
pub struct VisibilityResolver {
    questions: Vec<Question>,
    parents: HashMap<QuestionId, QuestionId>,
    dependents: BTreeMap<QuestionId, Vec<QuestionId>>,
    parent_choices: HashMap<QuestionId, BTreeSet<ChoiceId>>,
}

impl VisibilityResolver {
    /// `questions` may include inactive rows; only active ones are presented,
    /// in `order`, then id. `choices` must cover every parent question.
    pub fn build(questions: Vec<Question>, choices: &[Choice]) -> Result<Self, CatalogViolation> {
        let parents: HashMap<QuestionId, QuestionId> = questions
            .iter()
            .filter_map(|question| question.depends_on.map(|parent| (question.id, parent)))
            .collect();

        if let Some(question) = find_cycle(&parents) {
            return Err(CatalogViolation::DependencyCycle { question });
        }

        let mut dependents: BTreeMap<QuestionId, Vec<QuestionId>> = BTreeMap::new();
        for (child, parent) in &parents {
            dependents.entry(*parent).or_default().push(*child);
        }
        for children in dependents.values_mut() {
            children.sort();
        }

        let mut parent_choices: HashMap<QuestionId, BTreeSet<ChoiceId>> = HashMap::new();
        for choice in choices {
            if dependents.contains_key(&choice.question_id) {
                parent_choices
                    .entry(choice.question_id)
                    .or_default()
                    .insert(choice.id);
            }
        }

        let mut questions: Vec<Question> = questions
            .into_iter()
            .filter(|question| question.is_active)
            .collect();
        questions.sort_by_key(|question| (question.order, question.id));

        Ok(Self {
            questions,
            parents,
            dependents,
            parent_choices,
        })
    }

    /// Active questions in display order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn parent_of(&self, question: QuestionId) -> Option<QuestionId> {
        self.parents.get(&question).copied()
    }

    /// Questions revealed by selections on `parent`.
    pub fn dependents(&self, parent: QuestionId) -> &[QuestionId] {
        self.dependents
            .get(&parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_visible(&self, question: &Question, selected: &BTreeSet<ChoiceId>) -> bool {
        let empty = BTreeSet::new();
        let parent_choices = question
            .depends_on
            .and_then(|parent| self.parent_choices.get(&parent))
            .unwrap_or(&empty);
        is_visible(question, parent_choices, selected)
    }

    /// Hidden questions are never enforced, even when flagged required.
    pub fn is_required(&self, question: &Question, selected: &BTreeSet<ChoiceId>) -> bool {
        question.is_required && self.is_visible(question, selected)
    }

    /// Visibility of every active question, in display order.
    pub fn resolve(&self, selected: &BTreeSet<ChoiceId>) -> Vec<QuestionVisibility> {
        self.questions
            .iter()
            .map(|question| {
                let visible = self.is_visible(question, selected);
                QuestionVisibility {
                    question_id: question.id,
                    field: question.field_name(),
                    visible,
                    required: question.is_required && visible,
                    depends_on: question.depends_on.map(field_name),
                    trigger_choices: question.trigger_choices.iter().copied().collect(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::GroupId;

    fn choice(id: u64, question: u64) -> Choice {
        Choice {
            id: ChoiceId(id),
            question_id: QuestionId(question),
            text: format!("C{id}"),
            order: 0,
            is_active: true,
        }
    }

    fn question(id: u64, parent: Option<u64>, triggers: &[u64]) -> Question {
        let mut question = Question::new(QuestionId(id), GroupId(1), format!("Q{id}"));
        question.order = id as u32;
        question.depends_on = parent.map(QuestionId);
        question.trigger_choices = triggers.iter().copied().map(ChoiceId).collect();
        question
    }

    fn selected(ids: &[u64]) -> BTreeSet<ChoiceId> {
        ids.iter().copied().map(ChoiceId).collect()
    }

    fn resolver() -> VisibilityResolver {
        VisibilityResolver::build(
            vec![
                question(1, None, &[]),
                question(2, Some(1), &[11, 12]),
                question(3, Some(1), &[]),
            ],
            &[choice(11, 1), choice(12, 1), choice(13, 1), choice(21, 2)],
        )
        .expect("acyclic graph")
    }

    #[test]
    fn questions_without_parent_are_always_visible() {
        let resolver = resolver();
        let root = &resolver.questions()[0];
        assert!(resolver.is_visible(root, &selected(&[])));
        assert!(resolver.is_visible(root, &selected(&[99])));
    }

    #[test]
    fn trigger_choices_use_or_semantics() {
        let resolver = resolver();
        let child = &resolver.questions()[1];
        assert!(resolver.is_visible(child, &selected(&[11])));
        assert!(resolver.is_visible(child, &selected(&[12, 13])));
        assert!(!resolver.is_visible(child, &selected(&[13])));
        assert!(!resolver.is_visible(child, &selected(&[])));
    }

    #[test]
    fn empty_trigger_list_reveals_on_any_parent_choice() {
        let resolver = resolver();
        let child = &resolver.questions()[2];
        assert!(resolver.is_visible(child, &selected(&[13])));
        assert!(!resolver.is_visible(child, &selected(&[21])));
        assert!(!resolver.is_visible(child, &selected(&[])));
    }

    #[test]
    fn hidden_required_questions_are_not_required() {
        let resolver = resolver();
        let child = resolver.questions()[1].clone();
        assert!(child.is_required);
        assert!(!resolver.is_required(&child, &selected(&[13])));
        assert!(resolver.is_required(&child, &selected(&[11])));
    }

    #[test]
    fn resolve_reports_parent_linkage() {
        let states = resolver().resolve(&selected(&[11]));
        assert_eq!(states.len(), 3);
        assert_eq!(states[1].field, "q_2");
        assert_eq!(states[1].depends_on.as_deref(), Some("q_1"));
        assert_eq!(states[1].trigger_choices, vec![ChoiceId(11), ChoiceId(12)]);
        assert!(states.iter().all(|state| state.visible));
        assert!(states[0].depends_on.is_none());
    }

    #[test]
    fn inactive_questions_are_excluded_but_order_is_kept() {
        let mut hidden = question(4, None, &[]);
        hidden.is_active = false;
        let mut early = question(5, None, &[]);
        early.order = 0;
        let resolver = VisibilityResolver::build(
            vec![question(1, None, &[]), hidden, early],
            &[],
        )
        .expect("acyclic");
        let ids: Vec<u64> = resolver.questions().iter().map(|q| q.id.0).collect();
        assert_eq!(ids, vec![5, 1]);
    }

    #[test]
    fn cyclic_dependencies_fail_fast() {
        let err = VisibilityResolver::build(
            vec![question(1, Some(2), &[]), question(2, Some(1), &[])],
            &[],
        )
        .expect_err("cycle rejected");
        assert!(matches!(err, CatalogViolation::DependencyCycle { .. }));
    }

    #[test]
    fn dependents_are_indexed_by_parent() {
        let resolver = resolver();
        assert_eq!(
            resolver.dependents(QuestionId(1)),
            &[QuestionId(2), QuestionId(3)]
        );
        assert!(resolver.dependents(QuestionId(2)).is_empty());
        assert_eq!(resolver.parent_of(QuestionId(3)), Some(QuestionId(1)));
    }
}

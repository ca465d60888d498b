use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::visibility::VisibilityResolver;
use crate::catalog::domain::{
    Choice, ChoiceId, GroupId, InputType, ProductGroup, Question, QuestionId,
};
use crate::workflows::validation::{FieldErrors, REQUIRED};

/// Raw submitted values keyed by field name (`q_<question id>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSelections(BTreeMap<String, Vec<String>>);

impl RawSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl ToString) {
        self.0
            .entry(field.into())
            .or_default()
            .push(value.to_string());
    }

    /// Non-blank values submitted for `field`.
    pub fn values<'a>(&'a self, field: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .get(field)
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RawSelections {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut selections = Self::new();
        for (field, value) in iter {
            selections.push(field, value);
        }
        selections
    }
}

/// Choice ids currently selected across the given questions.
///
/// Values that do not parse as ids are ignored here; validation reports them.
pub fn selected_choice_ids(questions: &[Question], raw: &RawSelections) -> BTreeSet<ChoiceId> {
    questions
        .iter()
        .flat_map(|question| {
            raw.values(&question.field_name())
                .filter_map(|value| value.parse::<u64>().ok())
                .map(ChoiceId)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// An accepted (question, choice) pair ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub id: ChoiceId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionField {
    pub name: String,
    pub question_id: QuestionId,
    pub label: String,
    pub tag: String,
    pub input_type: InputType,
    pub choices: Vec<ChoiceOption>,
    pub visible: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    pub trigger_choices: Vec<ChoiceId>,
    pub selected: Vec<ChoiceId>,
    #[serde(skip)]
    submitted: Vec<String>,
}

/// Quiz form for one group, bound to a (possibly empty) submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizForm {
    pub group_id: GroupId,
    pub group_name: String,
    pub group_slug: String,
    pub tags: Vec<String>,
    pub fields: Vec<QuestionField>,
}

impl QuizForm {
    /// Bind `raw` to the resolver's active questions.
    ///
    /// `choices` maps a question to its choices; inactive ones are dropped.
    pub fn build(
        group: &ProductGroup,
        resolver: &VisibilityResolver,
        choices: &HashMap<QuestionId, Vec<Choice>>,
        raw: &RawSelections,
    ) -> Self {
        let selected = selected_choice_ids(resolver.questions(), raw);
        let states = resolver.resolve(&selected);

        let fields: Vec<QuestionField> = resolver
            .questions()
            .iter()
            .zip(states)
            .map(|(question, state)| {
                let mut options: Vec<&Choice> = choices
                    .get(&question.id)
                    .into_iter()
                    .flatten()
                    .filter(|choice| choice.is_active)
                    .collect();
                options.sort_by_key(|choice| (choice.order, choice.id));

                let submitted: Vec<String> =
                    raw.values(&state.field).map(str::to_string).collect();
                let chosen = options
                    .iter()
                    .filter(|choice| submitted.iter().any(|value| *value == choice.id.to_string()))
                    .map(|choice| choice.id)
                    .collect();

                QuestionField {
                    name: state.field,
                    question_id: question.id,
                    label: question.text.clone(),
                    tag: question.tag.clone(),
                    input_type: question.input_type,
                    choices: options
                        .into_iter()
                        .map(|choice| ChoiceOption {
                            id: choice.id,
                            text: choice.text.clone(),
                        })
                        .collect(),
                    visible: state.visible,
                    required: state.required,
                    depends_on: state.depends_on,
                    trigger_choices: state.trigger_choices,
                    selected: chosen,
                    submitted,
                }
            })
            .collect();

        Self {
            group_id: group.id,
            group_name: group.name.clone(),
            group_slug: group.slug.clone(),
            tags: fields
                .iter()
                .map(|field| {
                    if field.tag.trim().is_empty() {
                        field.label.clone()
                    } else {
                        field.tag.clone()
                    }
                })
                .collect(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&QuestionField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Accepted selections in question order, then choice order.
    ///
    /// Hidden questions are skipped entirely: their values are neither
    /// validated nor returned.
    pub fn validate(&self) -> Result<Vec<Selection>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut accepted = Vec::new();

        for field in self.fields.iter().filter(|field| field.visible) {
            let mut chosen: BTreeSet<ChoiceId> = BTreeSet::new();
            for value in &field.submitted {
                match field
                    .choices
                    .iter()
                    .find(|choice| choice.id.to_string() == *value)
                {
                    Some(choice) => {
                        chosen.insert(choice.id);
                    }
                    None => errors.add(
                        field.name.clone(),
                        format!(
                            "Select a valid choice. {value} is not one of the available choices."
                        ),
                    ),
                }
            }

            if field.input_type == InputType::Single && chosen.len() > 1 {
                errors.add(field.name.clone(), "Select only one choice.");
                continue;
            }
            if field.required && chosen.is_empty() && field.submitted.is_empty() {
                errors.add(field.name.clone(), REQUIRED);
                continue;
            }

            accepted.extend(
                field
                    .choices
                    .iter()
                    .filter(|choice| chosen.contains(&choice.id))
                    .map(|choice| Selection {
                        question_id: field.question_id,
                        choice_id: choice.id,
                    }),
            );
        }

        errors.into_result(accepted)
    }
}

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a top-level product group.
    GroupId
);
numeric_id!(
    /// Identifier of a catalog item.
    ItemId
);
numeric_id!(
    /// Identifier of a quiz question.
    QuestionId
);
numeric_id!(
    /// Identifier of a selectable choice.
    ChoiceId
);
numeric_id!(
    /// Identifier of an item variant.
    VariantId
);

/// Top-level product category grouping items and questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGroup {
    pub id: GroupId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
}

impl ProductGroup {
    /// Build a group whose slug is derived from its name.
    pub fn named(id: GroupId, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = super::slug::slugify(&name);
        Self {
            id,
            name,
            slug,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub group_id: GroupId,
    pub name: String,
    /// Unique across the catalog when set; bulk imports match on it first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<String>,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    /// Bullet-point selling features, in display order.
    #[serde(default)]
    pub features: Vec<String>,
    /// Datasheet rows, one per label.
    #[serde(default)]
    pub specs: Vec<ItemSpec>,
}

impl Item {
    /// An active item with no code, description, features or specs.
    pub fn new(id: ItemId, group_id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            group_id,
            name: name.into(),
            item_code: None,
            description: String::new(),
            is_active: true,
            features: Vec::new(),
            specs: Vec::new(),
        }
    }

    /// Specs by `order`, then label.
    pub fn sorted_specs(&self) -> Vec<&ItemSpec> {
        let mut specs: Vec<&ItemSpec> = self.specs.iter().collect();
        specs.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.label.cmp(&b.label)));
        specs
    }
}

/// Labelled datasheet value of an item, e.g. `Power: 3 kW`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub order: u32,
    /// Emphasised on item pages.
    #[serde(default)]
    pub highlight: bool,
}

/// Input cardinality of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// Exactly one choice (radio buttons).
    #[default]
    Single,
    /// Zero or more choices (checkboxes).
    Multi,
}

impl InputType {
    /// Lenient parse used by bulk imports; anything unrecognised is single choice.
    pub fn parse_loose(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "multi" | "multiple" | "checkbox" | "checkboxes" => Self::Multi,
            _ => Self::Single,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputType::Single => "single",
            InputType::Multi => "multi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub group_id: GroupId,
    pub text: String,
    /// Short title shown on progress tags and in lead summaries.
    #[serde(default)]
    pub tag: String,
    pub order: u32,
    pub is_required: bool,
    pub is_active: bool,
    pub input_type: InputType,
    /// When false, selections are informational and never change scores.
    pub affects_score: bool,
    #[serde(default)]
    pub depends_on: Option<QuestionId>,
    /// Choices of the parent that reveal this question. May be empty even when
    /// a parent is set, in which case any parent selection reveals it.
    #[serde(default)]
    pub trigger_choices: BTreeSet<ChoiceId>,
}

impl Question {
    /// A required, active, scoring single-choice question with no dependency.
    pub fn new(id: QuestionId, group_id: GroupId, text: impl Into<String>) -> Self {
        Self {
            id,
            group_id,
            text: text.into(),
            tag: String::new(),
            order: 0,
            is_required: true,
            is_active: true,
            input_type: InputType::Single,
            affects_score: true,
            depends_on: None,
            trigger_choices: BTreeSet::new(),
        }
    }

    /// Tag when present, otherwise the question text.
    pub fn label(&self) -> &str {
        let tag = self.tag.trim();
        if tag.is_empty() {
            self.text.trim()
        } else {
            tag
        }
    }

    /// Form field name carrying this question's selections.
    pub fn field_name(&self) -> String {
        field_name(self.id)
    }
}

pub(crate) fn field_name(id: QuestionId) -> String {
    format!("q_{id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub text: String,
    pub order: u32,
    pub is_active: bool,
}

/// Weighted edge from a choice to an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChoiceImpact {
    pub choice_id: ChoiceId,
    pub item_id: ItemId,
    pub score: f64,
}

impl ChoiceImpact {
    pub const DEFAULT_SCORE: f64 = 1.0;
}

/// Impact row as returned by the impact reader for a single choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactWeight {
    pub item_id: ItemId,
    pub score: f64,
}

/// Sellable configuration of an item, described by spec facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVariant {
    pub id: VariantId,
    pub item_id: ItemId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub specs: Vec<VariantSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub unit: String,
}

impl VariantSpec {
    pub fn new(label: &str, value: &str, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            unit: unit.to_string(),
        }
    }

    pub fn display(&self) -> String {
        let value = format!("{} {}", self.value.trim(), self.unit.trim());
        let value = value.trim();
        if value.is_empty() {
            self.label.clone()
        } else {
            format!("{}: {}", self.label, value)
        }
    }
}

use std::io::Read;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use super::domain::{
    Choice, ChoiceId, GroupId, InputType, Item, ItemId, ItemSpec, ProductGroup, Question,
    QuestionId,
};
use super::repository::{CatalogReader, CatalogWriter, RepositoryError};

/// How rows matching an existing question or item are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    #[default]
    Upsert,
    Create,
    Update,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upsert" => Ok(Self::Upsert),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            other => Err(format!(
                "unknown import mode '{other}' (expected upsert, create, or update)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Drop a question's stored choices before applying the uploaded ones.
    pub clear_choices: bool,
    /// Separator between choice specs inside the `choices` cell.
    pub choice_separator: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Upsert,
            clear_choices: false,
            choice_separator: ";".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to read import csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Deserialize every data row and apply it, collecting per-row failures in
/// the summary instead of aborting.
fn import_rows<R, T, F>(reader: R, kind: &str, mut apply: F) -> Result<ImportSummary, ImportError>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(T) -> Result<RowOutcome, RepositoryError>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    csv_reader.headers()?;

    let mut summary = ImportSummary::default();
    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        // Header occupies row 1.
        let row_number = index + 2;
        let outcome = record
            .map_err(|err| err.to_string())
            .and_then(|row| apply(row).map_err(|err| err.to_string()));
        match outcome {
            Ok(RowOutcome::Created) => summary.created += 1,
            Ok(RowOutcome::Updated) => summary.updated += 1,
            Ok(RowOutcome::Skipped) => summary.skipped += 1,
            Err(message) => {
                warn!(kind, row = row_number, %message, "import row failed");
                summary.errors.push(format!("Row {row_number}: {message}"));
            }
        }
    }

    info!(
        kind,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        errors = summary.errors.len(),
        "catalog import complete"
    );
    Ok(summary)
}

/// Existing group with exactly this name, created on demand.
fn group_named<C>(catalog: &C, name: &str) -> Result<ProductGroup, RepositoryError>
where
    C: CatalogReader + CatalogWriter + ?Sized,
{
    if let Some(group) = catalog
        .groups()?
        .into_iter()
        .find(|group| group.name == name)
    {
        return Ok(group);
    }
    let group = ProductGroup::named(GroupId(catalog.next_id()), name);
    catalog.save_group(group)
}

/// Bulk question loader for administrators.
///
/// Columns: `group_name, text, input_type, choices, is_required, is_active,
/// affects_score, order, question_tag`. Row failures are collected in the
/// summary instead of aborting the import.
pub struct QuestionImporter<'a, C: ?Sized> {
    catalog: &'a C,
    options: ImportOptions,
}

impl<'a, C> QuestionImporter<'a, C>
where
    C: CatalogReader + CatalogWriter + ?Sized,
{
    pub fn new(catalog: &'a C, options: ImportOptions) -> Self {
        Self { catalog, options }
    }

    pub fn import<R: Read>(&self, reader: R) -> Result<ImportSummary, ImportError> {
        import_rows(reader, "question", |row: QuestionRow| self.apply_row(row))
    }

    fn apply_row(&self, row: QuestionRow) -> Result<RowOutcome, RepositoryError> {
        let group_name = row.group_name.trim();
        let text = row.text.trim();
        if group_name.is_empty() || text.is_empty() {
            return Ok(RowOutcome::Skipped);
        }

        let group = group_named(self.catalog, group_name)?;
        let existing = self
            .catalog
            .questions_for_group(group.id)?
            .into_iter()
            .find(|question| question.text == text);

        let (mut question, outcome) = match existing {
            Some(_) if self.options.mode == ImportMode::Create => return Ok(RowOutcome::Skipped),
            None if self.options.mode == ImportMode::Update => return Ok(RowOutcome::Skipped),
            Some(question) => (question, RowOutcome::Updated),
            None => (
                Question::new(QuestionId(self.catalog.next_id()), group.id, text),
                RowOutcome::Created,
            ),
        };

        question.input_type = InputType::parse_loose(&row.input_type);
        question.is_required = parse_flag(&row.is_required, false);
        question.is_active = parse_flag(&row.is_active, false);
        question.affects_score = parse_flag(&row.affects_score, false);
        question.order = parse_order(&row.order);
        question.tag = row.question_tag.trim().to_string();
        let question = self.catalog.save_question(question)?;

        if self.options.clear_choices {
            self.catalog.clear_choices(question.id)?;
        }
        let stored = self.catalog.choices_for_question(question.id)?;
        for spec in parse_choice_specs(&row.choices, &self.options.choice_separator) {
            let mut choice = stored
                .iter()
                .find(|choice| choice.text == spec.label)
                .cloned()
                .unwrap_or_else(|| Choice {
                    id: ChoiceId(self.catalog.next_id()),
                    question_id: question.id,
                    text: spec.label.clone(),
                    order: 0,
                    is_active: false,
                });
            choice.order = spec.order;
            choice.is_active = spec.active;
            self.catalog.save_choice(choice)?;
        }

        Ok(outcome)
    }
}

#[derive(Debug, Clone)]
pub struct ItemImportOptions {
    pub mode: ImportMode,
    /// Replace an item's stored features with the uploaded list.
    pub clear_features: bool,
    /// Replace an item's stored specs with the uploaded list.
    pub clear_specs: bool,
    /// Separator between features inside the `features` cell; newlines
    /// always separate too.
    pub feature_separator: String,
}

impl Default for ItemImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Upsert,
            clear_features: false,
            clear_specs: false,
            feature_separator: ";".to_string(),
        }
    }
}

/// Bulk item loader for administrators.
///
/// Columns: `group_name, item_name, item_code, description, is_active,
/// features, specs`. Rows match an existing item by `item_code` first, then
/// by name within the group. Uploaded features and specs merge into the
/// stored ones unless the matching clear option is set.
pub struct ItemImporter<'a, C: ?Sized> {
    catalog: &'a C,
    options: ItemImportOptions,
}

impl<'a, C> ItemImporter<'a, C>
where
    C: CatalogReader + CatalogWriter + ?Sized,
{
    pub fn new(catalog: &'a C, options: ItemImportOptions) -> Self {
        Self { catalog, options }
    }

    pub fn import<R: Read>(&self, reader: R) -> Result<ImportSummary, ImportError> {
        import_rows(reader, "item", |row: ItemRow| self.apply_row(row))
    }

    fn apply_row(&self, row: ItemRow) -> Result<RowOutcome, RepositoryError> {
        let group_name = row.group_name.trim();
        let name = row.item_name.trim();
        if group_name.is_empty() || name.is_empty() {
            return Ok(RowOutcome::Skipped);
        }
        let code = Some(row.item_code.trim()).filter(|code| !code.is_empty());

        let group = group_named(self.catalog, group_name)?;
        let existing = match code {
            Some(code) => self.catalog.item_by_code(code)?,
            None => None,
        };
        let existing = match existing {
            Some(item) => Some(item),
            None => self
                .catalog
                .items_for_group(group.id)?
                .into_iter()
                .find(|item| item.name == name),
        };

        let (mut item, outcome) = match existing {
            Some(_) if self.options.mode == ImportMode::Create => return Ok(RowOutcome::Skipped),
            None if self.options.mode == ImportMode::Update => return Ok(RowOutcome::Skipped),
            Some(item) => (item, RowOutcome::Updated),
            None => (
                Item::new(ItemId(self.catalog.next_id()), group.id, name),
                RowOutcome::Created,
            ),
        };

        item.name = name.to_string();
        item.group_id = group.id;
        item.description = row.description.trim().to_string();
        item.is_active = parse_flag(&row.is_active, true);
        if let Some(code) = code {
            item.item_code = Some(code.to_string());
        }

        if self.options.clear_features {
            item.features.clear();
        }
        for feature in split_features(&row.features, &self.options.feature_separator) {
            if !item.features.contains(&feature) {
                item.features.push(feature);
            }
        }

        if self.options.clear_specs {
            item.specs.clear();
        }
        for spec in parse_item_specs(&row.specs) {
            spec.apply_to(&mut item.specs);
        }

        self.catalog.save_item(item)?;
        Ok(outcome)
    }
}

enum RowOutcome {
    Created,
    Updated,
    Skipped,
}

#[derive(Debug, Deserialize)]
struct QuestionRow {
    #[serde(default, deserialize_with = "empty_when_missing")]
    group_name: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    text: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    input_type: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    choices: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    is_required: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    is_active: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    affects_score: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    order: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    question_tag: String,
}

#[derive(Debug, Deserialize)]
struct ItemRow {
    #[serde(default, deserialize_with = "empty_when_missing")]
    group_name: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    item_name: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    item_code: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    description: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    is_active: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    features: String,
    #[serde(default, deserialize_with = "empty_when_missing")]
    specs: String,
}

fn empty_when_missing<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChoiceSpec {
    pub(crate) label: String,
    pub(crate) order: u32,
    pub(crate) active: bool,
}

/// Parse a `choices` cell such as `label=13-inch|order=1|active=1; label=14-inch`.
///
/// Specs are split on newlines and on `separator`; each spec is a list of
/// `|`-separated `key=value` parts where a bare part names the label.
pub(crate) fn parse_choice_specs(raw: &str, separator: &str) -> Vec<ChoiceSpec> {
    let separator = separator.trim();
    let chunks = raw.lines().flat_map(|line| {
        if separator.is_empty() {
            vec![line]
        } else {
            line.split(separator).collect()
        }
    });

    let mut specs = Vec::new();
    for chunk in chunks {
        let mut label = None;
        let mut order = String::new();
        let mut active = String::new();
        for part in chunk.split('|').map(str::trim).filter(|part| !part.is_empty()) {
            match part.split_once('=') {
                Some((key, value)) => match key.trim().to_ascii_lowercase().as_str() {
                    "label" => label = Some(value.trim().to_string()),
                    "order" => order = value.trim().to_string(),
                    "active" => active = value.trim().to_string(),
                    _ => {}
                },
                None => {
                    label.get_or_insert_with(|| part.to_string());
                }
            }
        }

        if let Some(label) = label.filter(|label| !label.is_empty()) {
            specs.push(ChoiceSpec {
                label,
                order: parse_order(&order),
                active: parse_flag(&active, false),
            });
        }
    }
    specs
}

/// Split a `features` cell on `separator` and newlines, dropping blanks and
/// repeats.
pub(crate) fn split_features(raw: &str, separator: &str) -> Vec<String> {
    let separator = separator.trim();
    let mut features: Vec<String> = Vec::new();
    for line in raw.lines() {
        let parts: Vec<&str> = if separator.is_empty() {
            vec![line]
        } else {
            line.split(separator).collect()
        };
        for part in parts.into_iter().map(str::trim).filter(|part| !part.is_empty()) {
            if !features.iter().any(|feature| feature == part) {
                features.push(part.to_string());
            }
        }
    }
    features
}

/// One `label=..|value=..` entry of a `specs` cell. Optional keys left out
/// of the cell leave the stored spec's value alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpecEntry {
    pub(crate) label: String,
    pub(crate) value: String,
    pub(crate) unit: Option<String>,
    pub(crate) order: Option<u32>,
    pub(crate) highlight: Option<bool>,
}

impl SpecEntry {
    /// Overwrite the stored row with the same label, or append a new one.
    fn apply_to(self, specs: &mut Vec<ItemSpec>) {
        let index = match specs.iter().position(|spec| spec.label == self.label) {
            Some(index) => index,
            None => {
                specs.push(ItemSpec {
                    label: self.label.clone(),
                    value: String::new(),
                    unit: String::new(),
                    order: 0,
                    highlight: false,
                });
                specs.len() - 1
            }
        };
        let spec = &mut specs[index];
        spec.value = self.value;
        if let Some(unit) = self.unit {
            spec.unit = unit;
        }
        if let Some(order) = self.order {
            spec.order = order;
        }
        if let Some(highlight) = self.highlight {
            spec.highlight = highlight;
        }
    }
}

/// Parse a `specs` cell such as `label=CPU|value=i5; label=Storage|value=512|unit=GB`.
///
/// Entries are split on `;` and newlines. Entries missing a label or a value
/// key are dropped, as are `order` values that are not whole numbers.
pub(crate) fn parse_item_specs(raw: &str) -> Vec<SpecEntry> {
    let mut entries = Vec::new();
    for chunk in raw.lines().flat_map(|line| line.split(';')) {
        let mut label = None;
        let mut value = None;
        let mut unit = None;
        let mut order = None;
        let mut highlight = None;
        for part in chunk.split('|').map(str::trim) {
            let Some((key, raw_value)) = part.split_once('=') else {
                continue;
            };
            let raw_value = raw_value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "label" => label = Some(raw_value.to_string()),
                "value" => value = Some(raw_value.to_string()),
                "unit" => unit = Some(raw_value.to_string()),
                "order" => order = raw_value.parse().ok(),
                "highlight" => highlight = Some(parse_flag(raw_value, false)),
                _ => {}
            }
        }

        if let (Some(label), Some(value)) = (label.filter(|label| !label.is_empty()), value) {
            entries.push(SpecEntry {
                label,
                value,
                unit,
                order,
                highlight,
            });
        }
    }
    entries
}

pub(crate) fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => true,
        "0" | "false" | "no" | "n" => false,
        _ => default,
    }
}

fn parse_order(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

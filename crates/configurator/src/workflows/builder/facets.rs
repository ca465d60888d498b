use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::domain::ItemVariant;
use crate::catalog::slug::slugify;

/// Separator between value and unit inside a selection token.
pub const TOKEN_SEPARATOR: &str = "||";
const FIELD_PREFIX: &str = "facet__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValue {
    pub value: String,
    pub unit: String,
    /// `value||unit`, the string a client sends back to select this value.
    pub token: String,
    pub display: String,
}

impl FacetValue {
    fn new(value: &str, unit: &str) -> Self {
        Self {
            value: value.to_string(),
            unit: unit.to_string(),
            token: format!("{value}{TOKEN_SEPARATOR}{unit}"),
            display: format!("{value} {unit}").trim().to_string(),
        }
    }
}

/// Filterable spec label of an item, with every value its active variants carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    pub slug: String,
    pub label: String,
    pub field: String,
    pub values: Vec<FacetValue>,
}

/// Facets of the active variants, in case-insensitive label order.
///
/// Labels that slugify alike share one facet, listed under the first label
/// in that order.
pub fn discover_facets(variants: &[ItemVariant]) -> Vec<Facet> {
    let mut by_label: BTreeMap<String, BTreeSet<(String, String)>> = BTreeMap::new();
    for variant in variants.iter().filter(|variant| variant.is_active) {
        for spec in &variant.specs {
            let label = spec.label.trim();
            let value = spec.value.trim();
            if label.is_empty() || value.is_empty() {
                continue;
            }
            by_label
                .entry(label.to_string())
                .or_default()
                .insert((value.to_string(), spec.unit.trim().to_string()));
        }
    }

    let mut labels: Vec<(String, BTreeSet<(String, String)>)> = by_label.into_iter().collect();
    labels.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));

    let mut facets: Vec<Facet> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut pairs: Vec<BTreeSet<(String, String)>> = Vec::new();
    for (label, values) in labels {
        let slug = slugify(&label);
        if slug.is_empty() {
            continue;
        }
        match seen.get(&slug) {
            Some(&index) => pairs[index].extend(values),
            None => {
                seen.insert(slug.clone(), facets.len());
                facets.push(Facet {
                    field: format!("{FIELD_PREFIX}{slug}"),
                    slug,
                    label,
                    values: Vec::new(),
                });
                pairs.push(values);
            }
        }
    }

    for (facet, values) in facets.iter_mut().zip(pairs) {
        let mut values: Vec<(String, String)> = values.into_iter().collect();
        values.sort_by(|(av, au), (bv, bu)| {
            (av.to_lowercase(), au.to_lowercase())
                .cmp(&(bv.to_lowercase(), bu.to_lowercase()))
                .then_with(|| (av, au).cmp(&(bv, bu)))
        });
        facet.values = values
            .iter()
            .map(|(value, unit)| FacetValue::new(value, unit))
            .collect();
    }

    facets
}

/// Selected tokens keyed by label slug. Keys may carry the `facet__` field
/// prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSelection(BTreeMap<String, Vec<String>>);

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slug: &str, value: &str, unit: &str) -> Self {
        self.0
            .entry(slug.to_string())
            .or_default()
            .push(format!("{value}{TOKEN_SEPARATOR}{unit}"));
        self
    }

    /// Selected (value, unit) pairs per label slug; blank tokens are dropped.
    pub fn pairs(&self) -> BTreeMap<String, Vec<(String, String)>> {
        let mut pairs: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
        for (key, tokens) in &self.0 {
            let slug = key.strip_prefix(FIELD_PREFIX).unwrap_or(key);
            let parsed = tokens
                .iter()
                .filter_map(|token| parse_token(token));
            pairs.entry(slug.to_string()).or_default().extend(parsed);
        }
        pairs.retain(|_, values| !values.is_empty());
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// Split `value||unit`; a token without separator selects the value with no
/// unit constraint.
pub fn parse_token(token: &str) -> Option<(String, String)> {
    let (value, unit) = token
        .split_once(TOKEN_SEPARATOR)
        .unwrap_or((token, ""));
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((value.to_string(), unit.trim().to_string()))
}

/// Active variants satisfying every constrained facet.
pub fn filter_variants<'a>(
    variants: &'a [ItemVariant],
    selection: &FacetSelection,
) -> Vec<&'a ItemVariant> {
    let active: Vec<&ItemVariant> = variants.iter().filter(|variant| variant.is_active).collect();

    let known: BTreeSet<String> = active
        .iter()
        .flat_map(|variant| variant.specs.iter())
        .map(|spec| slugify(spec.label.trim()))
        .filter(|slug| !slug.is_empty())
        .collect();
    let constraints: Vec<(String, Vec<(String, String)>)> = selection
        .pairs()
        .into_iter()
        .filter(|(slug, _)| known.contains(slug))
        .collect();

    active
        .into_iter()
        .filter(|variant| {
            constraints
                .iter()
                .all(|(slug, wanted)| matches_any(variant, slug, wanted))
        })
        .collect()
}

fn matches_any(variant: &ItemVariant, slug: &str, wanted: &[(String, String)]) -> bool {
    variant.specs.iter().any(|spec| {
        if slugify(spec.label.trim()) != slug {
            return false;
        }
        let value = spec.value.trim();
        let unit = spec.unit.trim();
        wanted
            .iter()
            .any(|(want_value, want_unit)| {
                value == want_value.as_str() && (want_unit.is_empty() || unit == want_unit.as_str())
            })
    })
}

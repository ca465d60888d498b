use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

use configurator::catalog::{
    CatalogWriter, Choice, ChoiceId, ChoiceImpact, GroupId, ImportOptions, ImportSummary,
    InputType, Item, ItemId, ItemImportOptions, ItemImporter, ItemVariant, ProductGroup, Question,
    QuestionId, QuestionImporter, RepositoryError, VariantId, VariantSpec,
};
use configurator::config::ErpConfig;
use configurator::error::AppError;
use configurator::memory::{InMemoryCatalog, InMemoryContactInbox, InMemorySessionStore};
use configurator::workflows::builder::BuilderService;
use configurator::workflows::careers::{CareersGateway, CareersService};
use configurator::workflows::leads::{LeadDispatcher, LeadGateway, LeadService};
use configurator::workflows::quiz::{QuizService, RawSelections};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Every service of the configurator, wired to the in-memory stores.
pub(crate) struct Services<L> {
    pub(crate) catalog: Arc<InMemoryCatalog>,
    pub(crate) quiz: Arc<QuizService<InMemoryCatalog, InMemorySessionStore, L>>,
    pub(crate) builder: Arc<BuilderService<InMemoryCatalog>>,
    pub(crate) leads: Arc<LeadService<InMemoryCatalog, InMemoryContactInbox, L>>,
    pub(crate) careers: Arc<CareersService<L>>,
}

impl<L> Services<L>
where
    L: LeadGateway + CareersGateway,
{
    pub(crate) fn new(catalog: Arc<InMemoryCatalog>, gateway: Arc<L>, erp: ErpConfig) -> Self {
        let careers = Arc::new(CareersService::new(Arc::clone(&gateway)));
        let dispatcher = Arc::new(LeadDispatcher::new(gateway, erp));
        let sessions = Arc::new(InMemorySessionStore::new(catalog.clone()));
        let inbox = Arc::new(InMemoryContactInbox::new());
        Self {
            quiz: Arc::new(QuizService::new(
                Arc::clone(&catalog),
                sessions,
                Arc::clone(&dispatcher),
            )),
            builder: Arc::new(BuilderService::new(Arc::clone(&catalog))),
            leads: Arc::new(LeadService::new(Arc::clone(&catalog), inbox, dispatcher)),
            careers,
            catalog,
        }
    }
}

/// CSV exports loaded into a catalog before it is served.
#[derive(Debug, Clone, Default)]
pub(crate) struct CatalogSeed {
    pub(crate) items: Option<PathBuf>,
    pub(crate) questions: Option<PathBuf>,
    pub(crate) item_options: ItemImportOptions,
    pub(crate) question_options: ImportOptions,
}

#[derive(Debug)]
pub(crate) struct SeedReport {
    pub(crate) kind: &'static str,
    pub(crate) path: PathBuf,
    pub(crate) summary: ImportSummary,
}

/// Import the seed files into `catalog`, items first so question imports
/// see the groups they create.
pub(crate) fn seed_catalog(
    catalog: &InMemoryCatalog,
    seed: &CatalogSeed,
) -> Result<Vec<SeedReport>, AppError> {
    let mut reports = Vec::new();
    if let Some(path) = &seed.items {
        let summary =
            ItemImporter::new(catalog, seed.item_options.clone()).import(File::open(path)?)?;
        reports.push(SeedReport {
            kind: "item",
            path: path.clone(),
            summary,
        });
    }
    if let Some(path) = &seed.questions {
        let summary = QuestionImporter::new(catalog, seed.question_options.clone())
            .import(File::open(path)?)?;
        reports.push(SeedReport {
            kind: "question",
            path: path.clone(),
            summary,
        });
    }
    for report in &reports {
        info!(
            kind = report.kind,
            path = %report.path.display(),
            created = report.summary.created,
            updated = report.summary.updated,
            errors = report.summary.errors.len(),
            "catalog seeded"
        );
    }
    Ok(reports)
}

/// Seeded gearbox catalog plus the selections that walk each quiz branch.
pub(crate) struct DemoCatalog {
    pub(crate) catalog: InMemoryCatalog,
    pub(crate) group_slug: String,
    pub(crate) steady_path: RawSelections,
    pub(crate) shock_path: RawSelections,
    pub(crate) builder_item: ItemId,
}

pub(crate) fn demo_catalog() -> Result<DemoCatalog, RepositoryError> {
    let catalog = InMemoryCatalog::new();

    let gearboxes = catalog.save_group(ProductGroup::named(
        GroupId(catalog.next_id()),
        "Gearboxes",
    ))?;
    let motors = catalog.save_group(ProductGroup::named(GroupId(catalog.next_id()), "Motors"))?;

    let helical = save_item(&catalog, gearboxes.id, "Helical Gear X", "HGX")?;
    let planetary = save_item(&catalog, gearboxes.id, "Planetary Gear Y", "PGY")?;
    let worm = save_item(&catalog, gearboxes.id, "Worm Gear Z", "WGZ")?;
    save_item(&catalog, motors.id, "Induction Motor F", "IMF")?;

    let load = save_question(
        &catalog,
        gearboxes.id,
        "What load does the drive see?",
        "Load",
        1,
        |_| {},
    )?;
    let steady = save_choice(&catalog, load, "Steady", 1)?;
    let shock = save_choice(&catalog, load, "Shock", 2)?;

    let frequency = save_question(
        &catalog,
        gearboxes.id,
        "How often do shocks occur?",
        "Shock frequency",
        2,
        |question| {
            question.input_type = InputType::Multi;
            question.depends_on = Some(load);
            question.trigger_choices = BTreeSet::from([shock]);
        },
    )?;
    let hourly = save_choice(&catalog, frequency, "Hourly", 1)?;
    let daily = save_choice(&catalog, frequency, "Daily", 2)?;

    let mounting = save_question(&catalog, gearboxes.id, "Mounting", "", 3, |question| {
        question.is_required = false;
        question.affects_score = false;
    })?;
    let foot = save_choice(&catalog, mounting, "Foot", 1)?;
    save_choice(&catalog, mounting, "Flange", 2)?;

    for (choice_id, item_id, score) in [
        (steady, helical, 2.0),
        (shock, planetary, 3.0),
        (hourly, planetary, 1.0),
        (daily, worm, 0.5),
        (foot, helical, 10.0),
    ] {
        catalog.save_impact(ChoiceImpact {
            choice_id,
            item_id,
            score,
        })?;
    }

    for (name, power, mount) in [
        ("HGX-15 Foot", "1.5", "Foot"),
        ("HGX-30 Foot", "3", "Foot"),
        ("HGX-30 Flange", "3", "Flange"),
    ] {
        catalog.save_variant(ItemVariant {
            id: VariantId(catalog.next_id()),
            item_id: helical,
            name: name.to_string(),
            code: None,
            is_active: true,
            specs: vec![
                VariantSpec::new("Power", power, "kW"),
                VariantSpec::new("Mounting", mount, ""),
            ],
        })?;
    }

    let field = |question: QuestionId| format!("q_{question}");
    Ok(DemoCatalog {
        group_slug: gearboxes.slug,
        steady_path: RawSelections::new()
            .with(field(load), steady)
            .with(field(mounting), foot),
        shock_path: RawSelections::new()
            .with(field(load), shock)
            .with(field(frequency), hourly),
        builder_item: helical,
        catalog,
    })
}

fn save_item(
    catalog: &InMemoryCatalog,
    group: GroupId,
    name: &str,
    code: &str,
) -> Result<ItemId, RepositoryError> {
    let item = catalog.save_item(Item {
        item_code: Some(code.to_string()),
        ..Item::new(ItemId(catalog.next_id()), group, name)
    })?;
    Ok(item.id)
}

fn save_question(
    catalog: &InMemoryCatalog,
    group: GroupId,
    text: &str,
    tag: &str,
    order: u32,
    customise: impl FnOnce(&mut Question),
) -> Result<QuestionId, RepositoryError> {
    let mut question = Question::new(QuestionId(catalog.next_id()), group, text);
    question.tag = tag.to_string();
    question.order = order;
    customise(&mut question);
    Ok(catalog.save_question(question)?.id)
}

fn save_choice(
    catalog: &InMemoryCatalog,
    question: QuestionId,
    text: &str,
    order: u32,
) -> Result<ChoiceId, RepositoryError> {
    let choice = catalog.save_choice(Choice {
        id: ChoiceId(catalog.next_id()),
        question_id: question,
        text: text.to_string(),
        order,
        is_active: true,
    })?;
    Ok(choice.id)
}

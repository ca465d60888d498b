use crate::infra::{demo_catalog, seed_catalog, CatalogSeed, SeedReport, Services};
use clap::Args;
use configurator::catalog::{CatalogReader, ImportMode, ImportOptions, ItemImportOptions};
use configurator::config::ErpConfig;
use configurator::error::AppError;
use configurator::memory::RecordingGateway;
use configurator::workflows::builder::FacetSelection;
use configurator::workflows::leads::{LeadPushStatus, Participant};
use configurator::workflows::quiz::{QuizResult, RawSelections};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the contact step and ERP lead preview.
    #[arg(long)]
    pub(crate) skip_contact: bool,
    /// Print each result as JSON instead of a summary.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV file with question rows
    pub(crate) path: PathBuf,
    /// How existing questions are treated (upsert, create, update)
    #[arg(long, default_value = "upsert")]
    pub(crate) mode: ImportMode,
    /// Drop stored choices of matched questions before applying the file
    #[arg(long)]
    pub(crate) clear_choices: bool,
    /// Separator between choice specs inside the choices cell
    #[arg(long, default_value = ";")]
    pub(crate) separator: String,
}

#[derive(Args, Debug)]
pub(crate) struct ImportItemsArgs {
    /// CSV file with item rows
    pub(crate) path: PathBuf,
    /// How existing items are treated (upsert, create, update)
    #[arg(long, default_value = "upsert")]
    pub(crate) mode: ImportMode,
    /// Replace stored features of matched items instead of merging
    #[arg(long)]
    pub(crate) clear_features: bool,
    /// Replace stored specs of matched items instead of merging
    #[arg(long)]
    pub(crate) clear_specs: bool,
    /// Separator between features inside the features cell
    #[arg(long, default_value = ";")]
    pub(crate) separator: String,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { skip_contact, json } = args;

    let demo = demo_catalog()?;
    let gateway = Arc::new(RecordingGateway::accepting());
    let services = Services::new(
        Arc::new(demo.catalog),
        Arc::clone(&gateway),
        ErpConfig::default(),
    );

    println!("Product configurator demo");
    let paths: [(&str, &RawSelections); 2] = [
        ("steady load", &demo.steady_path),
        ("shock load", &demo.shock_path),
    ];

    let mut last_session = None;
    for (label, selections) in paths {
        println!("\nQuiz path: {label}");
        let result = match services.quiz.submit(&demo.group_slug, selections) {
            Ok(result) => result,
            Err(err) => {
                println!("  Submission rejected: {}", err);
                continue;
            }
        };
        render_result(&result, json);
        last_session = Some(result.session.id);
    }

    println!("\nVariant builder: Power 3 kW");
    let selection = FacetSelection::new().with("power", "3", "kW");
    match services
        .builder
        .matches(&demo.group_slug, demo.builder_item, selection)
    {
        Ok(matches) => {
            for facet in &matches.view.facets {
                let values: Vec<&str> = facet
                    .values
                    .iter()
                    .map(|value| value.display.as_str())
                    .collect();
                println!("  Facet {}: {}", facet.label, values.join(", "));
            }
            for variant in &matches.matches {
                println!("  - {}", variant.name);
            }
        }
        Err(err) => println!("  Builder unavailable: {}", err),
    }

    if skip_contact {
        return Ok(());
    }
    let Some(session) = last_session else {
        return Ok(());
    };

    println!("\nContact step for session {session}");
    let participant = Participant {
        name: "Dana Buyer".to_string(),
        email: "dana@example.com".to_string(),
        phone: "+1 555 0100".to_string(),
        designation: "Plant engineer".to_string(),
        company: "Acme Mills".to_string(),
    };
    let interested = services
        .catalog
        .group_by_slug(&demo.group_slug)?
        .map(|group| services.catalog.items_for_group(group.id))
        .transpose()?
        .unwrap_or_default()
        .into_iter()
        .take(1)
        .map(|item| item.id)
        .collect();

    match services
        .quiz
        .submit_contact(session, participant, interested)
        .await
    {
        Ok(contact) => {
            let erp = match contact.erp {
                LeadPushStatus::Pushed { status } => format!("pushed ({status})"),
                LeadPushStatus::Rejected { status } => format!("rejected ({status})"),
                LeadPushStatus::Failed { reason } => format!("failed: {reason}"),
                LeadPushStatus::Disabled => "disabled".to_string(),
            };
            println!("  ERP lead: {erp}");
        }
        Err(err) => println!("  Contact rejected: {}", err),
    }

    for payload in gateway.payloads() {
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("  Lead payload:\n{}", json),
            Err(err) => println!("  Lead payload unavailable: {}", err),
        }
    }

    Ok(())
}

fn render_result(result: &QuizResult, json: bool) {
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("  Result unavailable: {}", err),
        }
        return;
    }

    println!("- Session {}", result.session.id);
    if result.no_match {
        println!("  No matching item for these answers");
    }
    for entry in &result.outcome.breakdown {
        println!("  {:>6.2}  {}", entry.score, entry.item.name);
    }
    if let Some(item) = &result.outcome.recommended {
        println!("  Recommended: {}", item.name);
    }
    if !result.family.is_empty() {
        let family: Vec<&str> = result.family.iter().map(|item| item.name.as_str()).collect();
        println!("  Also in this family: {}", family.join(", "));
    }
}

/// Dry run of a question CSV: the file is applied to a fresh demo catalog
/// and only the summary is kept. `serve --questions` loads it for real.
pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        path,
        mode,
        clear_choices,
        separator,
    } = args;

    render_seed(&CatalogSeed {
        questions: Some(path),
        question_options: ImportOptions {
            mode,
            clear_choices,
            choice_separator: separator,
        },
        ..CatalogSeed::default()
    })
}

/// Dry run of an item CSV; `serve --items` loads it for real.
pub(crate) fn run_item_import(args: ImportItemsArgs) -> Result<(), AppError> {
    let ImportItemsArgs {
        path,
        mode,
        clear_features,
        clear_specs,
        separator,
    } = args;

    render_seed(&CatalogSeed {
        items: Some(path),
        item_options: ItemImportOptions {
            mode,
            clear_features,
            clear_specs,
            feature_separator: separator,
        },
        ..CatalogSeed::default()
    })
}

fn render_seed(seed: &CatalogSeed) -> Result<(), AppError> {
    let demo = demo_catalog()?;
    for report in seed_catalog(&demo.catalog, seed)? {
        render_import_summary(&report);
    }
    Ok(())
}

fn render_import_summary(report: &SeedReport) {
    let SeedReport {
        kind,
        path,
        summary,
    } = report;
    println!("{} import from {}", capitalise(kind), path.display());
    println!(
        "  created {} / updated {} / skipped {}",
        summary.created, summary.updated, summary.skipped
    );
    if summary.errors.is_empty() {
        println!("  No row errors");
        return;
    }
    println!("  Row errors:");
    for error in &summary.errors {
        println!("    - {}", error);
    }
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

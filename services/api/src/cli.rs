use crate::demo::{run_demo, run_import, run_item_import, DemoArgs, ImportArgs, ImportItemsArgs};
use crate::infra::CatalogSeed;
use crate::server;
use clap::{Args, Parser, Subcommand};
use configurator::catalog::{ImportMode, ImportOptions, ItemImportOptions};
use configurator::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Product Configurator",
    about = "Run the product configurator service and its catalog tooling",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check a question CSV against the demo catalog and print the import summary
    ImportQuestions(ImportArgs),
    /// Check an item CSV against the demo catalog and print the import summary
    ImportItems(ImportItemsArgs),
    /// Walk both quiz branches against the demo catalog and print the results
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Question CSV imported into the served catalog at startup
    #[arg(long)]
    pub(crate) questions: Option<PathBuf>,
    /// Item CSV imported into the served catalog at startup
    #[arg(long)]
    pub(crate) items: Option<PathBuf>,
    /// How startup imports treat existing rows (upsert, create, update)
    #[arg(long, default_value = "upsert")]
    pub(crate) mode: ImportMode,
    /// Drop stored choices of questions matched by the startup import
    #[arg(long)]
    pub(crate) clear_choices: bool,
}

impl ServeArgs {
    pub(crate) fn seed(&self) -> CatalogSeed {
        CatalogSeed {
            items: self.items.clone(),
            questions: self.questions.clone(),
            item_options: ItemImportOptions {
                mode: self.mode,
                ..ItemImportOptions::default()
            },
            question_options: ImportOptions {
                mode: self.mode,
                clear_choices: self.clear_choices,
                ..ImportOptions::default()
            },
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::ImportQuestions(args) => run_import(args),
        Command::ImportItems(args) => run_item_import(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_build_the_startup_seed() {
        let cli = Cli::parse_from([
            "configurator",
            "serve",
            "--questions",
            "questions.csv",
            "--mode",
            "update",
            "--clear-choices",
        ]);
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        let seed = args.seed();
        assert_eq!(seed.questions, Some(PathBuf::from("questions.csv")));
        assert_eq!(seed.items, None);
        assert_eq!(seed.question_options.mode, ImportMode::Update);
        assert!(seed.question_options.clear_choices);
        assert_eq!(seed.item_options.mode, ImportMode::Update);
    }

    #[test]
    fn import_items_accepts_clear_flags() {
        let cli = Cli::parse_from([
            "configurator",
            "import-items",
            "items.csv",
            "--clear-specs",
            "--separator",
            "|",
        ]);
        let Some(Command::ImportItems(args)) = cli.command else {
            panic!("expected import-items");
        };
        assert!(args.clear_specs);
        assert!(!args.clear_features);
        assert_eq!(args.separator, "|");
    }
}

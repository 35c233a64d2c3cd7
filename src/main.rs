//! Binary entry point for the hostspawn CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostspawn::{
    Catalogue, CatalogueError, ConfigError, EntityKind, IntentBuilder, MemoryStore,
    PoolValidationError, ProvisionError, SpawnConfig, TaskDocument, User, UserStore,
};

mod cli;

use cli::{Cli, PlanCommand, ValidateCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error("invalid container pools:\n{0}")]
    Pools(PoolValidationError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error("failed to render output: {0}")]
    Output(String),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli, &mut io::stdout()) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn dispatch(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match cli {
        Cli::Validate(command) => validate(&command, out),
        Cli::Plan(command) => plan(&command, out),
    }
}

fn validate(args: &ValidateCommand, out: &mut impl Write) -> Result<(), CliError> {
    let catalogue = Catalogue::load(Utf8Path::new(&args.catalogue))?;
    catalogue.validate().map_err(CliError::Pools)?;
    writeln!(
        out,
        "ok: {} distros, {} container pools",
        catalogue.distros.0.len(),
        catalogue.container_pools.pools.len()
    )
    .map_err(|err| CliError::Output(err.to_string()))
}

fn plan(args: &PlanCommand, out: &mut impl Write) -> Result<(), CliError> {
    let config = SpawnConfig::load_without_cli_args()?;
    config.validate()?;

    let store = MemoryStore::new();
    let catalogue = Catalogue::load(Utf8Path::new(&args.catalogue))?;
    catalogue.seed(&store);
    let document = TaskDocument::load(Utf8Path::new(&args.task))?;
    document.seed(&store);

    let user = args
        .user
        .as_deref()
        .map(|name| find_user(&store, name))
        .transpose()?;

    let intents = IntentBuilder::new(&store, &config).build_intents(
        Some(&document.task),
        user.as_ref(),
        &args.key,
    )?;
    info!(task = %document.task.id, intents = intents.len(), "planned host intents");

    let rendered =
        serde_json::to_string_pretty(&intents).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(out, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn find_user(store: &MemoryStore, name: &str) -> Result<User, ProvisionError> {
    store
        .find_user(name)?
        .ok_or_else(|| ProvisionError::not_found(EntityKind::User, name))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

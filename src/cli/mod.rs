//! Command-line interface definitions for the `hostspawn` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `hostspawn` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hostspawn",
    about = "Check distro catalogues and dry-run host.create directives",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Validate the container pools in a catalogue.
    #[command(name = "validate", about = "Validate the container pools in a catalogue")]
    Validate(ValidateCommand),
    /// Build the host intents a task's directives would create.
    #[command(
        name = "plan",
        about = "Build the host intents a task's host.create directives would create"
    )]
    Plan(PlanCommand),
}

/// Arguments for the `hostspawn validate` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ValidateCommand {
    /// JSON file listing distros and container pools.
    #[arg(long, value_name = "PATH")]
    pub(crate) catalogue: String,
}

/// Arguments for the `hostspawn plan` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct PlanCommand {
    /// JSON file listing distros and container pools.
    #[arg(long, value_name = "PATH")]
    pub(crate) catalogue: String,
    /// JSON file holding the task, its project configuration, and its users.
    #[arg(long, value_name = "PATH")]
    pub(crate) task: String,
    /// User requesting the hosts; without one every host is task-owned.
    #[arg(long, value_name = "NAME")]
    pub(crate) user: Option<String>,
    /// Name of one of the user's public keys, or a literal key.
    #[arg(long, value_name = "KEY", default_value = "")]
    pub(crate) key: String,
}

//! CLI command definitions and dispatch.

pub mod build;
pub mod merge;
pub mod order;

use clap::{Parser, Subcommand};

/// Stratus, a composer for declarative infrastructure templates.
#[derive(Parser, Debug)]
#[command(name = "stratus", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose a template document from a stratus manifest.
    Build(build::BuildArgs),
    /// Merge template fragments into one document.
    Merge(merge::MergeArgs),
    /// Print the resource deployment order of a template.
    Order(order::OrderArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Build(args) => build::execute(args),
        Command::Merge(args) => merge::execute(args),
        Command::Order(args) => order::execute(args),
    }
}

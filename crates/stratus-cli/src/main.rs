//! # stratus CLI
//!
//! Composes high-level capability manifests into declarative
//! infrastructure template documents.

mod commands;
mod manifest;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}

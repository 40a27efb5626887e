//! `stratus order`: print the resource deployment order of a template.

use std::path::PathBuf;

use clap::Args;
use stratus_template::order::deploy_order;

/// Arguments for the `order` subcommand.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Path to the template file. JSON or YAML, chosen by extension.
    pub file: PathBuf,
}

/// Executes the `order` command.
///
/// Resolves a creation order over explicit and intrinsic dependencies and
/// prints one logical name per line, dependencies first.
///
/// # Errors
///
/// Returns an error if the template cannot be read or parsed, or if its
/// references form a cycle.
pub fn execute(args: OrderArgs) -> anyhow::Result<()> {
    if !args.file.exists() {
        anyhow::bail!("file not found: {}", args.file.display());
    }
    let raw = std::fs::read_to_string(&args.file)?;
    let template = crate::output::parse_template(&args.file, &raw)?;

    let order = deploy_order(&template.resources)?;
    for logical_name in order {
        println!("{logical_name}");
    }

    Ok(())
}

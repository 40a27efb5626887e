//! `stratus merge`: merge template fragments into one document.

use std::path::PathBuf;

use clap::Args;
use stratus_template::Template;

/// Arguments for the `merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Template fragment files to merge, in order. JSON or YAML, chosen by
    /// extension.
    #[arg(required = true, num_args = 2..)]
    pub files: Vec<PathBuf>,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit YAML instead of JSON.
    #[arg(long)]
    pub yaml: bool,
}

/// Executes the `merge` command.
///
/// # Errors
///
/// Returns an error if any fragment cannot be read or parsed, or if
/// fragments collide on a name.
pub fn execute(args: MergeArgs) -> anyhow::Result<()> {
    let mut merged = Template::default();
    for path in &args.files {
        if !path.exists() {
            anyhow::bail!("file not found: {}", path.display());
        }
        let raw = std::fs::read_to_string(path)?;
        let fragment = crate::output::parse_template(path, &raw)?;
        merged.merge(fragment)?;
    }
    tracing::info!(fragments = args.files.len(), "merged template fragments");

    let rendered = crate::output::render(&merged, args.yaml)?;
    crate::output::write_rendered(args.output.as_deref(), &rendered)?;
    if let Some(ref out_path) = args.output {
        println!(
            "Merged {} fragments -> {}",
            args.files.len(),
            out_path.display()
        );
    }

    Ok(())
}

//! `stratus build`: compose a template document from a manifest.

use std::path::PathBuf;

use clap::Args;

use crate::manifest::Manifest;

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the manifest file.
    #[arg(default_value = "stratus.yml")]
    pub file: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit YAML instead of JSON.
    #[arg(long)]
    pub yaml: bool,
}

/// Executes the `build` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or composed.
pub fn execute(args: BuildArgs) -> anyhow::Result<()> {
    tracing::info!(path = %args.file.display(), "building template from manifest");

    if !args.file.exists() {
        anyhow::bail!("file not found: {}", args.file.display());
    }

    let raw = std::fs::read_to_string(&args.file)?;
    let manifest: Manifest = serde_yaml::from_str(&raw)?;
    let template = manifest.build()?;
    let resources = template.resources.len();
    let rendered = crate::output::render(&template, args.yaml)?;

    crate::output::write_rendered(args.output.as_deref(), &rendered)?;
    if let Some(ref out_path) = args.output {
        println!(
            "Composed {} -> {} ({resources} resources)",
            args.file.display(),
            out_path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_writes_a_merged_template_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest_path = dir.path().join("stratus.yml");
        let output_path = dir.path().join("template.json");
        std::fs::write(
            &manifest_path,
            "queues:\n  - LogicalName: Uploads\n",
        )
        .expect("write manifest");

        execute(BuildArgs {
            file: manifest_path,
            output: Some(output_path.clone()),
            yaml: false,
        })
        .expect("build");

        let raw = std::fs::read_to_string(&output_path).expect("read output");
        let template: stratus_template::Template =
            serde_json::from_str(&raw).expect("parse output");
        assert_eq!(template.resources.len(), 5);
        assert!(template.resources.contains("UploadsDeadLetter"));
    }

    #[test]
    fn build_fails_on_missing_manifest() {
        let result = execute(BuildArgs {
            file: PathBuf::from("/nonexistent/stratus.yml"),
            output: None,
            yaml: false,
        });
        let msg = result.expect_err("should fail").to_string();
        assert!(msg.contains("file not found"), "got: {msg}");
    }
}

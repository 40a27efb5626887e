//! Manifest model for the `build` command.
//!
//! A manifest lists the high-level capabilities to expand; building it
//! composes every entry and folds the fragments into one template
//! document. Logical-name collisions between entries surface as merge
//! errors.

use indexmap::IndexMap;
use serde::Deserialize;
use stratus_common::error::Result;
use stratus_compose::function::FunctionOptions;
use stratus_compose::queue::QueueOptions;
use stratus_compose::trigger::QueueTriggerOptions;
use stratus_compose::{function, queue, trigger};
use stratus_template::{Output, Parameter, Template};

/// A stratus manifest.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    /// Template description.
    #[serde(default)]
    pub description: Option<String>,
    /// Parameter declarations copied into the template.
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    /// Durable-queue capabilities.
    #[serde(default)]
    pub queues: Vec<QueueOptions>,
    /// Stand-alone functions.
    #[serde(default)]
    pub functions: Vec<FunctionOptions>,
    /// Queue-consuming functions.
    #[serde(default)]
    pub queue_consumers: Vec<QueueTriggerOptions>,
    /// Output declarations copied into the template.
    #[serde(default)]
    pub outputs: IndexMap<String, Output>,
}

impl Manifest {
    /// Expands every capability and merges the fragments into one template.
    ///
    /// # Errors
    ///
    /// Returns an error if any composition fails or logical names collide.
    pub fn build(self) -> Result<Template> {
        let mut template = Template::new();
        template.description = self.description;
        template.parameters = self.parameters;
        template.outputs = self.outputs;

        for options in &self.queues {
            template.resources.merge(queue::compose(options)?)?;
        }
        for options in &self.functions {
            template.resources.merge(function::compose(options)?)?;
        }
        for options in &self.queue_consumers {
            template.resources.merge(trigger::compose(options)?)?;
        }
        tracing::info!(resources = template.resources.len(), "manifest composed");
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r"
description: upload processing stack
queues:
  - LogicalName: Uploads
    maxReceiveCount: 3
queue_consumers:
  - LogicalName: Processor
    Code:
      S3Bucket: artifacts
      S3Key: processor.zip
    EventSourceArn:
      Fn::GetAtt: [Uploads, Arn]
    ReservedConcurrentExecutions: 4
";

    #[test]
    fn manifest_builds_one_merged_template() {
        let manifest: Manifest = serde_yaml::from_str(MANIFEST).expect("parse");
        let template = manifest.build().expect("build");
        assert_eq!(template.description.as_deref(), Some("upload processing stack"));
        assert_eq!(template.resources.len(), 9);
        assert!(template.resources.contains("Uploads"));
        assert!(template.resources.contains("ProcessorEventSource"));
    }

    #[test]
    fn empty_manifest_builds_an_empty_template() {
        let manifest: Manifest = serde_yaml::from_str("{}").expect("parse");
        let template = manifest.build().expect("build");
        assert!(template.resources.is_empty());
    }

    #[test]
    fn colliding_entries_fail_to_build() {
        let manifest: Manifest = serde_yaml::from_str(
            r"
queues:
  - LogicalName: Uploads
  - LogicalName: Uploads
",
        )
        .expect("parse");
        let err = manifest.build().expect_err("should collide");
        assert!(err.to_string().contains("Uploads"), "got: {err}");
    }

    #[test]
    fn invalid_entry_fails_with_a_configuration_error() {
        let manifest: Manifest = serde_yaml::from_str(
            r"
queues:
  - maxReceiveCount: 3
",
        )
        .expect("parse");
        let err = manifest.build().expect_err("should fail");
        assert!(err.to_string().contains("LogicalName"), "got: {err}");
    }
}

//! Compute-function composition.
//!
//! Builds the base graph a trigger composition extends: the function
//! itself, its log group, and, when the caller does not bring an external
//! role, a generated execution role with a single `main` inline policy for
//! log writes. The [`FunctionComposer`] trait is the seam other composers
//! hold a capability reference to.

use serde::Deserialize;
use stratus_common::constants::{
    DEFAULT_FUNCTION_TIMEOUT_SECONDS, DEFAULT_HANDLER, DEFAULT_LOG_RETENTION_DAYS,
    DEFAULT_MEMORY_SIZE_MB, DEFAULT_RUNTIME,
};
use stratus_common::error::{Result, StratusError};
use stratus_template::{DependsOn, Resource, ResourceGraph, Value};

use crate::policy::{PolicyDocument, PolicyStatement, assume_role_document, named_policy};

/// Options accepted by a [`FunctionComposer`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionOptions {
    /// Root logical name; every derived resource name is prefixed with it.
    #[serde(default)]
    pub logical_name: String,
    /// Deployment package location or inline source.
    pub code: Option<Value>,
    /// Handler entry point.
    pub handler: Option<Value>,
    /// Runtime identifier.
    pub runtime: Option<Value>,
    /// Memory allocation in megabytes.
    pub memory_size: Option<Value>,
    /// Invocation timeout in seconds.
    pub timeout: Option<Value>,
    /// Physical function name; defaults to a stack-scoped derivation.
    pub function_name: Option<Value>,
    /// Human-readable description.
    pub description: Option<Value>,
    /// Environment variable block.
    pub environment: Option<Value>,
    /// ARN of an externally managed execution role. Supplying one
    /// suppresses role generation entirely.
    pub role_arn: Option<Value>,
    /// Concurrency reservation. Validated by the trigger composer, passed
    /// through here.
    pub reserved_concurrent_executions: Option<i64>,
    /// Log-group retention in days.
    pub log_retention_in_days: Option<Value>,
    /// Template condition inherited by every emitted resource.
    pub condition: Option<String>,
    /// Explicit dependencies, attached to the function only.
    pub depends_on: Option<DependsOn>,
}

/// Builds the base compute-function graph a trigger composition extends.
pub trait FunctionComposer {
    /// Expands `options` into a graph containing the function under
    /// `LogicalName` and, when no external role is supplied, its generated
    /// execution role under `<LogicalName>Role`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when required options are missing.
    fn compose(&self, options: &FunctionOptions) -> Result<ResourceGraph>;
}

/// Default [`FunctionComposer`] emitting Lambda resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct LambdaComposer;

impl FunctionComposer for LambdaComposer {
    fn compose(&self, options: &FunctionOptions) -> Result<ResourceGraph> {
        if options.logical_name.is_empty() {
            return Err(StratusError::Config {
                message: "LogicalName is required".to_owned(),
            });
        }
        let code = options.code.clone().ok_or_else(|| StratusError::Config {
            message: "Code is required".to_owned(),
        })?;
        let logical_name = options.logical_name.as_str();
        tracing::debug!(function = %logical_name, "composing function");

        let logs_name = format!("{logical_name}Logs");
        let role_name = format!("{logical_name}Role");
        let function_name = options
            .function_name
            .clone()
            .unwrap_or_else(|| Value::sub(format!("${{AWS::StackName}}-{logical_name}")));
        let role = match &options.role_arn {
            Some(arn) => arn.clone(),
            None => Value::get_att(role_name.as_str(), "Arn"),
        };

        let mut pairs: Vec<(String, Resource)> = Vec::new();

        let function = Resource::new("AWS::Lambda::Function")
            .with_condition(options.condition.clone())
            .with_depends_on(options.depends_on.clone())
            .with_property("Code", code)
            .with_property("Description", options.description.clone())
            .with_property("Environment", options.environment.clone())
            .with_property("FunctionName", function_name.clone())
            .with_property(
                "Handler",
                options.handler.clone().unwrap_or(Value::from(DEFAULT_HANDLER)),
            )
            .with_property(
                "MemorySize",
                options
                    .memory_size
                    .clone()
                    .unwrap_or(Value::Int(DEFAULT_MEMORY_SIZE_MB)),
            )
            .with_property(
                "ReservedConcurrentExecutions",
                options.reserved_concurrent_executions.map(Value::Int),
            )
            .with_property("Role", role)
            .with_property(
                "Runtime",
                options.runtime.clone().unwrap_or(Value::from(DEFAULT_RUNTIME)),
            )
            .with_property(
                "Timeout",
                options
                    .timeout
                    .clone()
                    .unwrap_or(Value::Int(DEFAULT_FUNCTION_TIMEOUT_SECONDS)),
            );
        pairs.push((logical_name.to_owned(), function));

        let log_group = Resource::new("AWS::Logs::LogGroup")
            .with_condition(options.condition.clone())
            .with_property(
                "LogGroupName",
                Value::sub_with("/aws/lambda/${name}", [("name", function_name)]),
            )
            .with_property(
                "RetentionInDays",
                options
                    .log_retention_in_days
                    .clone()
                    .unwrap_or(Value::Int(DEFAULT_LOG_RETENTION_DAYS)),
            );
        pairs.push((logs_name.clone(), log_group));

        if options.role_arn.is_none() {
            let log_statement = PolicyStatement::allow()
                .action("logs:CreateLogStream")
                .action("logs:PutLogEvents")
                .resource(Value::get_att(logs_name.as_str(), "Arn"));
            let role_resource = Resource::new("AWS::IAM::Role")
                .with_condition(options.condition.clone())
                .with_property(
                    "AssumeRolePolicyDocument",
                    assume_role_document("lambda.amazonaws.com"),
                )
                .with_property(
                    "Policies",
                    Value::List(vec![named_policy(
                        "main",
                        PolicyDocument::new(vec![log_statement]),
                    )]),
                );
            pairs.push((role_name, role_resource));
        }

        ResourceGraph::from_pairs(pairs)
    }
}

/// Expands `options` with the default [`LambdaComposer`].
///
/// # Errors
///
/// Returns a configuration error when required options are missing.
pub fn compose(options: &FunctionOptions) -> Result<ResourceGraph> {
    LambdaComposer.compose(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(logical_name: &str) -> FunctionOptions {
        FunctionOptions {
            logical_name: logical_name.into(),
            code: Some(Value::object([
                ("S3Bucket", Value::from("artifacts")),
                ("S3Key", Value::from("worker.zip")),
            ])),
            ..FunctionOptions::default()
        }
    }

    fn property<'a>(graph: &'a ResourceGraph, logical_name: &str, key: &str) -> &'a Value {
        graph
            .get(logical_name)
            .unwrap_or_else(|| panic!("{logical_name} missing"))
            .properties
            .get(key)
            .unwrap_or_else(|| panic!("{logical_name}.{key} missing"))
    }

    #[test]
    fn missing_logical_name_is_a_configuration_error() {
        let err = compose(&FunctionOptions::default()).expect_err("should fail");
        assert!(err.to_string().contains("LogicalName"), "got: {err}");
    }

    #[test]
    fn missing_code_is_a_configuration_error() {
        let err = compose(&FunctionOptions {
            logical_name: "Worker".into(),
            ..FunctionOptions::default()
        })
        .expect_err("should fail");
        assert!(err.to_string().contains("Code"), "got: {err}");
    }

    #[test]
    fn generated_role_case_emits_function_logs_and_role() {
        let graph = compose(&options("Worker")).expect("compose");
        let names: Vec<&str> = graph.logical_names().collect();
        assert_eq!(names, vec!["Worker", "WorkerLogs", "WorkerRole"]);
        assert_eq!(
            property(&graph, "Worker", "Role"),
            &Value::get_att("WorkerRole", "Arn")
        );
    }

    #[test]
    fn external_role_suppresses_role_generation() {
        let arn = Value::from("arn:aws:iam::123456789012:role/worker");
        let graph = compose(&FunctionOptions {
            role_arn: Some(arn.clone()),
            ..options("Worker")
        })
        .expect("compose");
        let names: Vec<&str> = graph.logical_names().collect();
        assert_eq!(names, vec!["Worker", "WorkerLogs"]);
        assert_eq!(property(&graph, "Worker", "Role"), &arn);
    }

    #[test]
    fn defaults_are_applied() {
        let graph = compose(&options("Worker")).expect("compose");
        assert_eq!(property(&graph, "Worker", "Handler"), &Value::from("index.handler"));
        assert_eq!(property(&graph, "Worker", "Runtime"), &Value::from("nodejs22.x"));
        assert_eq!(property(&graph, "Worker", "MemorySize"), &Value::Int(128));
        assert_eq!(property(&graph, "Worker", "Timeout"), &Value::Int(300));
        assert_eq!(
            property(&graph, "WorkerLogs", "RetentionInDays"),
            &Value::Int(14)
        );
    }

    #[test]
    fn log_group_name_substitutes_the_function_name() {
        let graph = compose(&options("Worker")).expect("compose");
        assert_eq!(
            property(&graph, "WorkerLogs", "LogGroupName"),
            &Value::sub_with(
                "/aws/lambda/${name}",
                [("name", Value::sub("${AWS::StackName}-Worker"))]
            )
        );
    }

    #[test]
    fn generated_role_carries_the_main_log_policy() {
        let graph = compose(&options("Worker")).expect("compose");
        let policies = property(&graph, "WorkerRole", "Policies");
        let json = serde_json::to_string(policies).expect("serialize");
        assert!(json.contains(r#""PolicyName":"main""#), "got: {json}");
        assert!(json.contains("logs:CreateLogStream"), "got: {json}");
        assert!(json.contains("logs:PutLogEvents"), "got: {json}");
        assert!(
            serde_json::to_string(property(&graph, "WorkerRole", "AssumeRolePolicyDocument"))
                .expect("serialize")
                .contains("lambda.amazonaws.com")
        );
    }

    #[test]
    fn reserved_concurrency_passes_through_when_present() {
        let graph = compose(&FunctionOptions {
            reserved_concurrent_executions: Some(0),
            ..options("Worker")
        })
        .expect("compose");
        assert_eq!(
            property(&graph, "Worker", "ReservedConcurrentExecutions"),
            &Value::Int(0)
        );

        let without = compose(&options("Worker")).expect("compose");
        assert!(
            !without
                .get("Worker")
                .expect("function")
                .properties
                .contains_key("ReservedConcurrentExecutions")
        );
    }

    #[test]
    fn condition_propagates_to_every_resource() {
        let graph = compose(&FunctionOptions {
            condition: Some("HasWorker".into()),
            ..options("Worker")
        })
        .expect("compose");
        for (name, resource) in graph.iter() {
            assert_eq!(
                resource.condition.as_deref(),
                Some("HasWorker"),
                "{name} lost the condition"
            );
        }
    }
}

//! Queue-trigger composition.
//!
//! Delegates scaffolding to a [`FunctionComposer`], then wires the event
//! source and merges the consumer permission statement into the generated
//! execution role. The merge mutates the delegate's graph in place; that
//! graph is never aliased elsewhere, so the mutation stays local to one
//! composition.

use serde::Deserialize;
use stratus_common::constants::DEFAULT_BATCH_SIZE;
use stratus_common::error::{Result, StratusError};
use stratus_template::{Resource, ResourceGraph, Value};

use crate::function::{FunctionComposer, FunctionOptions, LambdaComposer};
use crate::policy::{PolicyDocument, PolicyStatement, named_policy};

/// Options accepted by [`compose`].
///
/// Everything the function composer accepts, plus the event-source wiring.
/// `ReservedConcurrentExecutions` is required here: an unbounded consumer
/// can drain the account's concurrency pool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueTriggerOptions {
    /// Options forwarded to the function composer.
    #[serde(flatten)]
    pub function: FunctionOptions,
    /// ARN of the queue the function consumes from.
    pub event_source_arn: Option<Value>,
    /// Messages fetched per invocation.
    pub batch_size: Option<Value>,
    /// Whether the event source starts enabled.
    pub enabled: Option<bool>,
}

/// Expands `options` with the default [`LambdaComposer`].
///
/// # Errors
///
/// Returns a configuration error when `EventSourceArn` or
/// `ReservedConcurrentExecutions` is missing, or when the reservation is
/// negative.
pub fn compose(options: &QueueTriggerOptions) -> Result<ResourceGraph> {
    compose_with(&LambdaComposer, options)
}

/// Expands `options`, obtaining the base graph from `functions`.
///
/// The base graph is extended in place: an event-source mapping is added
/// under `<LogicalName>EventSource`, and the consumer permission statement
/// is merged into the generated execution role when one exists. A caller
/// supplying an external role manages its permissions themselves, so the
/// graph is then left untouched beyond the event source.
///
/// # Errors
///
/// Returns a configuration error when `EventSourceArn` or
/// `ReservedConcurrentExecutions` is missing, or when the reservation is
/// negative; errors from `functions` propagate unchanged.
pub fn compose_with(
    functions: &dyn FunctionComposer,
    options: &QueueTriggerOptions,
) -> Result<ResourceGraph> {
    let event_source_arn = options
        .event_source_arn
        .clone()
        .ok_or_else(|| StratusError::Config {
            message: "EventSourceArn is required".to_owned(),
        })?;
    let reserved = options
        .function
        .reserved_concurrent_executions
        .ok_or_else(|| StratusError::Config {
            message: "ReservedConcurrentExecutions is required".to_owned(),
        })?;
    if reserved < 0 {
        return Err(StratusError::Config {
            message: format!("ReservedConcurrentExecutions must be zero or greater, got {reserved}"),
        });
    }

    let mut graph = functions.compose(&options.function)?;
    let logical_name = options.function.logical_name.as_str();
    tracing::debug!(function = %logical_name, "composing queue trigger");

    let event_source = Resource::new("AWS::Lambda::EventSourceMapping")
        .with_condition(options.function.condition.clone())
        .with_property(
            "BatchSize",
            options.batch_size.clone().unwrap_or(Value::Int(DEFAULT_BATCH_SIZE)),
        )
        .with_property("Enabled", Value::Bool(options.enabled.unwrap_or(true)))
        .with_property("EventSourceArn", event_source_arn.clone())
        .with_property("FunctionName", Value::reference(logical_name));
    graph.insert(format!("{logical_name}EventSource"), event_source)?;

    merge_role_statement(&mut graph, logical_name, consumer_statement(&event_source_arn));
    Ok(graph)
}

/// Permission statement letting the function consume from the queue and
/// from any sub-resource addressed beneath its ARN.
fn consumer_statement(event_source_arn: &Value) -> PolicyStatement {
    PolicyStatement::allow()
        .action("sqs:ReceiveMessage")
        .action("sqs:DeleteMessage")
        .action("sqs:GetQueueAttributes")
        .resource(event_source_arn.clone())
        .resource(Value::sub_with("${arn}/*", [("arn", event_source_arn.clone())]))
}

/// Merges `statement` into the generated execution role, if one exists.
///
/// A role already carrying inline policies gets the statement appended to
/// the first policy document's statement list; a role without policies
/// gets a single new named policy. The first-policy append assumes exactly
/// one caller-relevant inline policy is present.
fn merge_role_statement(graph: &mut ResourceGraph, logical_name: &str, statement: PolicyStatement) {
    let role_name = format!("{logical_name}Role");
    let Some(role) = graph.get_mut(&role_name) else {
        return;
    };

    let policies = role
        .properties
        .entry("Policies".to_owned())
        .or_insert_with(|| Value::List(Vec::new()));
    match policies.as_list_mut() {
        Some(list) if !list.is_empty() => {
            let statements = list
                .first_mut()
                .and_then(Value::as_map_mut)
                .and_then(|policy| policy.get_mut("PolicyDocument"))
                .and_then(Value::as_map_mut)
                .and_then(|document| document.get_mut("Statement"))
                .and_then(Value::as_list_mut);
            if let Some(statements) = statements {
                statements.push(statement.into_value());
            }
        }
        Some(list) => list.push(named_policy(
            format!("{logical_name}-event-source"),
            PolicyDocument::new(vec![statement]),
        )),
        // A `Policies` entry that is not a list is outside the function
        // composer's contract; it passes through uninspected.
        None => {}
    }
}

//! Durable-queue composition.
//!
//! Expands queue options into a primary queue, its dead-letter queue, and,
//! for non-FIFO queues, the pub/sub fan-in: a topic (or an existing topic
//! ARN), a subscription, and the delivery policy that actually lets the
//! topic send into the queue. FIFO queues cannot subscribe to pub/sub
//! topics, so the fan-in sub-graph is skipped entirely for them.

use serde::Deserialize;
use stratus_common::constants::{
    DEAD_LETTER_SUFFIX, DEFAULT_MAX_RECEIVE_COUNT, DEFAULT_VISIBILITY_TIMEOUT_SECONDS,
    FIFO_SUFFIX, MAX_MESSAGE_RETENTION_SECONDS,
};
use stratus_common::error::{Result, StratusError};
use stratus_template::{DependsOn, Resource, ResourceGraph, Value};

use crate::policy::{PolicyDocument, PolicyStatement};

/// Options accepted by [`compose`].
///
/// Keys follow their platform spellings (including the platform's
/// camelCase `maxReceiveCount`), so a manifest entry reads like the
/// resource properties it expands into. Pass-through options are
/// [`Value`]s because callers may supply intrinsics instead of literals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueOptions {
    /// Root logical name; every derived resource name is prefixed with it.
    #[serde(default)]
    pub logical_name: String,
    /// Seconds a delivered message stays hidden from other consumers.
    pub visibility_timeout: Option<Value>,
    /// Delivery attempts before a message moves to the dead-letter queue.
    #[serde(rename = "maxReceiveCount")]
    pub max_receive_count: Option<Value>,
    /// Enables content-based deduplication on FIFO queues.
    pub content_based_deduplication: Option<Value>,
    /// Seconds every delivery is delayed.
    pub delay_seconds: Option<Value>,
    /// Makes the queue FIFO. The platform rejects an explicit `false`, so
    /// falsy values are normalized to absent.
    pub fifo_queue: Option<bool>,
    /// KMS key for server-side encryption.
    pub kms_master_key_id: Option<Value>,
    /// Seconds a data key may be reused before KMS is called again.
    pub kms_data_key_reuse_period_seconds: Option<Value>,
    /// Maximum message size in bytes.
    pub maximum_message_size: Option<Value>,
    /// Seconds the primary queue retains a message.
    pub message_retention_period: Option<Value>,
    /// Physical queue name; defaults to a stack-scoped derivation.
    pub queue_name: Option<Value>,
    /// Long-polling wait time in seconds.
    pub receive_message_wait_time_seconds: Option<Value>,
    /// Template condition inherited by every emitted resource.
    pub condition: Option<String>,
    /// Explicit dependencies, attached to the primary queue only.
    pub depends_on: Option<DependsOn>,
    /// ARN of an existing topic to subscribe to instead of creating one.
    pub existing_topic_arn: Option<Value>,
    /// Physical topic name; defaults like `QueueName`.
    pub topic_name: Option<Value>,
    /// Human-readable topic display name.
    pub display_name: Option<Value>,
    /// Visibility timeout of the dead-letter queue, in seconds.
    pub dead_letter_visibility_timeout: Option<Value>,
}

/// Expands `options` into a durable-queue resource graph.
///
/// Always emits the primary queue under `LogicalName` and its dead-letter
/// queue under `<LogicalName>DeadLetter`. Non-FIFO queues additionally get
/// `<LogicalName>Topic` (unless `ExistingTopicArn` is supplied),
/// `<LogicalName>Subscription`, and `<LogicalName>Policy`. Every emitted
/// resource inherits `Condition`.
///
/// # Errors
///
/// Returns a configuration error if `LogicalName` is missing or empty.
pub fn compose(options: &QueueOptions) -> Result<ResourceGraph> {
    if options.logical_name.is_empty() {
        return Err(StratusError::Config {
            message: "LogicalName is required".to_owned(),
        });
    }
    let logical_name = options.logical_name.as_str();
    let fifo = options.fifo_queue.unwrap_or(false);
    tracing::debug!(queue = %logical_name, fifo, "composing durable queue");

    let dead_letter_name = format!("{logical_name}DeadLetter");
    let base_queue_name = options
        .queue_name
        .clone()
        .unwrap_or_else(|| Value::sub(format!("${{AWS::StackName}}-{logical_name}")));

    let mut pairs: Vec<(String, Resource)> = Vec::new();

    let primary_queue_name = if fifo {
        Value::sub_with(
            format!("${{name}}{FIFO_SUFFIX}"),
            [("name", base_queue_name.clone())],
        )
    } else {
        base_queue_name.clone()
    };
    let redrive_policy = Value::object([
        ("deadLetterTargetArn", Value::get_att(dead_letter_name.as_str(), "Arn")),
        (
            "maxReceiveCount",
            options
                .max_receive_count
                .clone()
                .unwrap_or(Value::Int(DEFAULT_MAX_RECEIVE_COUNT)),
        ),
    ]);
    let primary = Resource::new("AWS::SQS::Queue")
        .with_condition(options.condition.clone())
        .with_depends_on(options.depends_on.clone())
        .with_property(
            "ContentBasedDeduplication",
            options.content_based_deduplication.clone(),
        )
        .with_property("DelaySeconds", options.delay_seconds.clone())
        .with_property("FifoQueue", fifo.then_some(Value::Bool(true)))
        .with_property("KmsMasterKeyId", options.kms_master_key_id.clone())
        .with_property(
            "KmsDataKeyReusePeriodSeconds",
            options.kms_data_key_reuse_period_seconds.clone(),
        )
        .with_property("MaximumMessageSize", options.maximum_message_size.clone())
        .with_property(
            "MessageRetentionPeriod",
            options
                .message_retention_period
                .clone()
                .unwrap_or(Value::Int(MAX_MESSAGE_RETENTION_SECONDS)),
        )
        .with_property("QueueName", primary_queue_name)
        .with_property(
            "ReceiveMessageWaitTimeSeconds",
            options.receive_message_wait_time_seconds.clone(),
        )
        .with_property("RedrivePolicy", redrive_policy)
        .with_property(
            "VisibilityTimeout",
            options
                .visibility_timeout
                .clone()
                .unwrap_or(Value::Int(DEFAULT_VISIBILITY_TIMEOUT_SECONDS)),
        );
    pairs.push((logical_name.to_owned(), primary));

    // A FIFO primary must have a FIFO dead-letter: the queue types have to
    // match for redrive to work. Retention is pinned to the platform
    // maximum so failed messages outlive the primary's window.
    let dead_letter_queue_name = if fifo {
        Value::sub_with(
            format!("${{name}}{DEAD_LETTER_SUFFIX}{FIFO_SUFFIX}"),
            [("name", base_queue_name.clone())],
        )
    } else {
        Value::sub_with(
            format!("${{name}}{DEAD_LETTER_SUFFIX}"),
            [("name", base_queue_name)],
        )
    };
    let dead_letter = Resource::new("AWS::SQS::Queue")
        .with_condition(options.condition.clone())
        .with_property("FifoQueue", fifo.then_some(Value::Bool(true)))
        .with_property(
            "MessageRetentionPeriod",
            Value::Int(MAX_MESSAGE_RETENTION_SECONDS),
        )
        .with_property("QueueName", dead_letter_queue_name)
        .with_property(
            "VisibilityTimeout",
            options
                .dead_letter_visibility_timeout
                .clone()
                .unwrap_or(Value::Int(DEFAULT_VISIBILITY_TIMEOUT_SECONDS)),
        );
    pairs.push((dead_letter_name, dead_letter));

    // FIFO queues cannot subscribe to pub/sub topics; the fan-in options
    // are silently ignored for them.
    if !fifo {
        let topic_arn = match &options.existing_topic_arn {
            Some(arn) => arn.clone(),
            None => {
                let topic = Resource::new("AWS::SNS::Topic")
                    .with_condition(options.condition.clone())
                    .with_property(
                        "TopicName",
                        options.topic_name.clone().unwrap_or_else(|| {
                            Value::sub(format!("${{AWS::StackName}}-{logical_name}"))
                        }),
                    )
                    .with_property("DisplayName", options.display_name.clone());
                pairs.push((format!("{logical_name}Topic"), topic));
                Value::reference(format!("{logical_name}Topic"))
            }
        };

        let subscription = Resource::new("AWS::SNS::Subscription")
            .with_condition(options.condition.clone())
            .with_property("Endpoint", Value::get_att(logical_name, "Arn"))
            .with_property("Protocol", Value::from("sqs"))
            .with_property("TopicArn", topic_arn.clone());
        pairs.push((format!("{logical_name}Subscription"), subscription));

        // Subscribing alone does not let the topic deliver; the queue needs
        // an explicit policy granting send access scoped to the topic.
        let statement = PolicyStatement::allow()
            .principal(Value::from("*"))
            .action("sqs:SendMessage")
            .resource(Value::get_att(logical_name, "Arn"))
            .condition(Value::object([(
                "ArnEquals",
                Value::object([("aws:SourceArn", topic_arn)]),
            )]));
        let policy = Resource::new("AWS::SQS::QueuePolicy")
            .with_condition(options.condition.clone())
            .with_property("Queues", Value::List(vec![Value::reference(logical_name)]))
            .with_property(
                "PolicyDocument",
                PolicyDocument::new(vec![statement]).into_value(),
            );
        pairs.push((format!("{logical_name}Policy"), policy));
    }

    ResourceGraph::from_pairs(pairs)
}

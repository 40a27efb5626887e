//! End-to-end composition tests: expand capabilities, merge the fragments
//! into one template document, and check the produced graph as a whole.

use stratus_compose::{function, queue, trigger};
use stratus_template::order::deploy_order;
use stratus_template::{Template, Value};

fn queue_options(logical_name: &str) -> queue::QueueOptions {
    queue::QueueOptions {
        logical_name: logical_name.into(),
        ..queue::QueueOptions::default()
    }
}

fn trigger_options(logical_name: &str, queue_logical_name: &str) -> trigger::QueueTriggerOptions {
    trigger::QueueTriggerOptions {
        function: function::FunctionOptions {
            logical_name: logical_name.into(),
            code: Some(Value::object([
                ("S3Bucket", Value::from("artifacts")),
                ("S3Key", Value::from("consumer.zip")),
            ])),
            reserved_concurrent_executions: Some(8),
            ..function::FunctionOptions::default()
        },
        event_source_arn: Some(Value::get_att(queue_logical_name, "Arn")),
        ..trigger::QueueTriggerOptions::default()
    }
}

#[test]
fn queue_and_trigger_merge_into_one_document() {
    let mut template = Template::new().with_description("upload processing");
    template
        .resources
        .merge(queue::compose(&queue_options("Uploads")).expect("queue"))
        .expect("merge queue");
    template
        .resources
        .merge(trigger::compose(&trigger_options("Processor", "Uploads")).expect("trigger"))
        .expect("merge trigger");

    for name in [
        "Uploads",
        "UploadsDeadLetter",
        "UploadsTopic",
        "UploadsSubscription",
        "UploadsPolicy",
        "Processor",
        "ProcessorLogs",
        "ProcessorRole",
        "ProcessorEventSource",
    ] {
        assert!(template.resources.contains(name), "{name} missing");
    }
    assert_eq!(template.resources.len(), 9);
}

#[test]
fn two_compositions_on_the_same_root_name_collide() {
    let mut template = Template::new();
    template
        .resources
        .merge(queue::compose(&queue_options("Uploads")).expect("queue"))
        .expect("merge queue");
    let err = template
        .resources
        .merge(queue::compose(&queue_options("Uploads")).expect("queue"))
        .expect_err("should collide");
    assert!(err.to_string().contains("Uploads"), "got: {err}");
}

#[test]
fn merged_document_orders_dependencies_before_dependents() {
    let mut template = Template::new();
    template
        .resources
        .merge(queue::compose(&queue_options("Uploads")).expect("queue"))
        .expect("merge queue");
    template
        .resources
        .merge(trigger::compose(&trigger_options("Processor", "Uploads")).expect("trigger"))
        .expect("merge trigger");

    let order = deploy_order(&template.resources).expect("order");
    let position = |name: &str| {
        order
            .iter()
            .position(|entry| entry == name)
            .unwrap_or_else(|| panic!("{name} missing from {order:?}"))
    };
    assert!(position("UploadsDeadLetter") < position("Uploads"));
    assert!(position("UploadsTopic") < position("UploadsSubscription"));
    assert!(position("Uploads") < position("ProcessorEventSource"));
    assert!(position("Processor") < position("ProcessorEventSource"));
    assert!(position("ProcessorRole") < position("Processor"));
}

#[test]
fn consumer_statement_lands_in_the_generated_roles_main_policy() {
    let graph = trigger::compose(&trigger_options("Processor", "Uploads")).expect("trigger");
    let json = serde_json::to_string(graph.get("ProcessorRole").expect("role")).expect("serialize");
    // The log-write statement comes first, then the appended consumer
    // statement, both inside the single "main" policy.
    assert!(json.contains(r#""PolicyName":"main""#), "got: {json}");
    let logs = json.find("logs:PutLogEvents").expect("log statement");
    let sqs = json.find("sqs:ReceiveMessage").expect("consumer statement");
    assert!(logs < sqs, "consumer statement should be appended after log statement");
    assert_eq!(json.matches(r#""PolicyName""#).count(), 1);
}

#[test]
fn rendered_template_is_deterministic() {
    let compose_once = || {
        let mut template = Template::new();
        template
            .resources
            .merge(queue::compose(&queue_options("Uploads")).expect("queue"))
            .expect("merge");
        template.to_json_pretty().expect("render")
    };
    assert_eq!(compose_once(), compose_once());
}

#[test]
fn fifo_composition_serializes_without_fan_in() {
    let graph = queue::compose(&queue::QueueOptions {
        fifo_queue: Some(true),
        ..queue_options("Orders")
    })
    .expect("queue");
    let json = serde_json::to_string(&graph).expect("serialize");
    assert!(!json.contains("AWS::SNS"), "got: {json}");
    assert!(json.contains(r#""FifoQueue":true"#), "got: {json}");
    assert!(json.contains("${name}.fifo"), "got: {json}");
    assert!(json.contains("${name}-dead-letter.fifo"), "got: {json}");
}

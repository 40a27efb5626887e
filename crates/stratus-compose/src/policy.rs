//! Typed IAM policy fragments embedded in composed resources.
//!
//! Statements and documents are built in memory and rendered to property
//! [`Value`]s at the point they are attached to a resource; `Action` and
//! `Resource` always render as lists so generated and appended statements
//! share one shape.

use stratus_common::constants::IAM_POLICY_VERSION;
use stratus_template::Value;

/// A single permission statement.
#[derive(Debug, Clone)]
pub struct PolicyStatement {
    effect: String,
    principal: Option<Value>,
    actions: Vec<String>,
    resources: Vec<Value>,
    condition: Option<Value>,
}

impl PolicyStatement {
    /// Creates an `Allow` statement with no actions or resources yet.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            effect: "Allow".to_owned(),
            principal: None,
            actions: Vec::new(),
            resources: Vec::new(),
            condition: None,
        }
    }

    /// Adds an action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Adds a resource scope. Scopes may be intrinsics.
    #[must_use]
    pub fn resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Sets the principal the statement applies to.
    #[must_use]
    pub fn principal(mut self, principal: impl Into<Value>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Sets the condition block.
    #[must_use]
    pub fn condition(mut self, condition: impl Into<Value>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Renders the statement as a property value.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut entries = Vec::new();
        entries.push(("Effect".to_owned(), Value::String(self.effect)));
        if let Some(principal) = self.principal {
            entries.push(("Principal".to_owned(), principal));
        }
        entries.push((
            "Action".to_owned(),
            Value::List(self.actions.into_iter().map(Value::String).collect()),
        ));
        entries.push(("Resource".to_owned(), Value::List(self.resources)));
        if let Some(condition) = self.condition {
            entries.push(("Condition".to_owned(), condition));
        }
        Value::object(entries)
    }
}

/// An inline policy document.
#[derive(Debug, Clone)]
pub struct PolicyDocument {
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Creates a document containing `statements`.
    #[must_use]
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self { statements }
    }

    /// Renders the document as a property value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::object([
            ("Version", Value::from(IAM_POLICY_VERSION)),
            (
                "Statement",
                Value::List(
                    self.statements
                        .into_iter()
                        .map(PolicyStatement::into_value)
                        .collect(),
                ),
            ),
        ])
    }
}

/// Renders a named inline-policy entry for a role's `Policies` list.
#[must_use]
pub fn named_policy(name: impl Into<String>, document: PolicyDocument) -> Value {
    Value::object([
        ("PolicyName", Value::String(name.into())),
        ("PolicyDocument", document.into_value()),
    ])
}

/// Returns the assume-role document trusting `service`.
#[must_use]
pub fn assume_role_document(service: &str) -> Value {
    Value::object([
        ("Version", Value::from(IAM_POLICY_VERSION)),
        (
            "Statement",
            Value::List(vec![Value::object([
                ("Effect", Value::from("Allow")),
                ("Principal", Value::object([("Service", Value::from(service))])),
                ("Action", Value::List(vec![Value::from("sts:AssumeRole")])),
            ])]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_renders_fields_in_document_order() {
        let statement = PolicyStatement::allow()
            .principal(Value::from("*"))
            .action("sqs:SendMessage")
            .resource(Value::get_att("Uploads", "Arn"))
            .condition(Value::object([(
                "ArnEquals",
                Value::object([("aws:SourceArn", Value::reference("UploadsTopic"))]),
            )]));

        let json = serde_json::to_string(&statement.into_value()).expect("serialize");
        assert_eq!(
            json,
            concat!(
                r#"{"Effect":"Allow","Principal":"*","Action":["sqs:SendMessage"],"#,
                r#""Resource":[{"Fn::GetAtt":["Uploads","Arn"]}],"#,
                r#""Condition":{"ArnEquals":{"aws:SourceArn":{"Ref":"UploadsTopic"}}}}"#
            )
        );
    }

    #[test]
    fn statement_without_principal_or_condition_omits_them() {
        let json = serde_json::to_string(
            &PolicyStatement::allow()
                .action("logs:PutLogEvents")
                .resource(Value::get_att("WorkerLogs", "Arn"))
                .into_value(),
        )
        .expect("serialize");
        assert!(!json.contains("Principal"), "got: {json}");
        assert!(!json.contains("Condition"), "got: {json}");
    }

    #[test]
    fn document_carries_version_and_statements() {
        let document = PolicyDocument::new(vec![
            PolicyStatement::allow().action("sqs:ReceiveMessage"),
        ]);
        let json = serde_json::to_string(&document.into_value()).expect("serialize");
        assert!(json.contains(r#""Version":"2012-10-17""#), "got: {json}");
        assert!(json.contains(r#""Statement":[{"#), "got: {json}");
    }

    #[test]
    fn named_policy_wraps_document() {
        let value = named_policy(
            "main",
            PolicyDocument::new(vec![PolicyStatement::allow().action("logs:PutLogEvents")]),
        );
        let map = value.as_map().expect("map");
        assert_eq!(map.get("PolicyName"), Some(&Value::from("main")));
        assert!(map.contains_key("PolicyDocument"));
    }

    #[test]
    fn assume_role_document_trusts_service() {
        let json =
            serde_json::to_string(&assume_role_document("lambda.amazonaws.com")).expect("serialize");
        assert!(
            json.contains(r#""Principal":{"Service":"lambda.amazonaws.com"}"#),
            "got: {json}"
        );
        assert!(json.contains(r#""Action":["sts:AssumeRole"]"#), "got: {json}");
    }
}

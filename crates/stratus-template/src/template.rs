//! Complete template documents and their declaration sections.
//!
//! A [`Template`] is the unit handed to the provisioning engine: parameter,
//! mapping, and condition declarations, the resource graph, and outputs.
//! Fragments produced by individual composers are folded together with
//! [`Template::merge`], which treats any name collision as an error.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stratus_common::constants::TEMPLATE_FORMAT_VERSION;
use stratus_common::error::{Result, StratusError};

use crate::resource::ResourceGraph;
use crate::value::Value;

/// A parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter type, e.g. `String` or `Number`.
    #[serde(rename = "Type")]
    pub parameter_type: String,
    /// Human-readable description.
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value used when the caller supplies none.
    #[serde(rename = "Default", default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Values the caller may choose from.
    #[serde(rename = "AllowedValues", default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
}

impl Parameter {
    /// Creates a parameter of the given type.
    #[must_use]
    pub fn new(parameter_type: impl Into<String>) -> Self {
        Self {
            parameter_type: parameter_type.into(),
            description: None,
            default: None,
            allowed_values: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// An export declaration attached to an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Export {
    /// Cross-stack export name.
    #[serde(rename = "Name")]
    pub name: Value,
}

/// An output declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Value surfaced after provisioning.
    #[serde(rename = "Value")]
    pub value: Value,
    /// Human-readable description.
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cross-stack export, if any.
    #[serde(rename = "Export", default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

impl Output {
    /// Creates an output surfacing `value`.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            description: None,
            export: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Exports the output under `name` for other stacks to import.
    #[must_use]
    pub fn with_export(mut self, name: impl Into<Value>) -> Self {
        self.export = Some(Export { name: name.into() });
        self
    }
}

/// A declarative template document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Template format version understood by the provisioning engine.
    #[serde(
        rename = "AWSTemplateFormatVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub format_version: Option<String>,
    /// Human-readable description.
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parameter declarations.
    #[serde(rename = "Parameters", default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,
    /// Static lookup tables.
    #[serde(rename = "Mappings", default, skip_serializing_if = "IndexMap::is_empty")]
    pub mappings: IndexMap<String, Value>,
    /// Condition expressions referenced by resources.
    #[serde(rename = "Conditions", default, skip_serializing_if = "IndexMap::is_empty")]
    pub conditions: IndexMap<String, Value>,
    /// The resource graph.
    #[serde(rename = "Resources", default, skip_serializing_if = "ResourceGraph::is_empty")]
    pub resources: ResourceGraph,
    /// Output declarations.
    #[serde(rename = "Outputs", default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    /// Creates an empty template carrying the platform format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            format_version: Some(TEMPLATE_FORMAT_VERSION.to_owned()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Folds `fragment` into this template section by section.
    ///
    /// The first format version and description win; every named
    /// declaration collides rather than overwrites.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter, mapping, condition, resource, or
    /// output name appears in both documents.
    pub fn merge(&mut self, fragment: Self) -> Result<()> {
        if self.format_version.is_none() {
            self.format_version = fragment.format_version;
        }
        if self.description.is_none() {
            self.description = fragment.description;
        }
        merge_section(&mut self.parameters, fragment.parameters)?;
        merge_section(&mut self.mappings, fragment.mappings)?;
        merge_section(&mut self.conditions, fragment.conditions)?;
        self.resources.merge(fragment.resources)?;
        merge_section(&mut self.outputs, fragment.outputs)?;
        Ok(())
    }

    /// Renders the template as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(self)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

fn merge_section<V>(into: &mut IndexMap<String, V>, from: IndexMap<String, V>) -> Result<()> {
    for (name, declaration) in from {
        if into.contains_key(&name) {
            return Err(StratusError::DuplicateLogicalName { logical_name: name });
        }
        let _ = into.insert(name, declaration);
    }
    Ok(())
}

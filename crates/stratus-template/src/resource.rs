//! Declarative resource definitions and the insertion-ordered resource
//! graph they are collected into.
//!
//! A graph is built by folding an explicit ordered list of
//! `(logical name, resource)` pairs; a duplicate logical name is a
//! construction-time error, never a silent overwrite. Insertion order is
//! preserved through serialization so produced documents are
//! deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stratus_common::error::{Result, StratusError};

use crate::value::Value;

/// Explicit creation-order dependencies of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    /// A single logical name.
    One(String),
    /// Several logical names, ordered as written.
    Many(Vec<String>),
}

impl DependsOn {
    /// Logical names referenced by this declaration.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// A single declarative resource definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Platform resource type, e.g. `AWS::SQS::Queue`.
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Name of a template condition gating this resource.
    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Resources that must exist before this one is created.
    #[serde(rename = "DependsOn", default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
    /// Resource properties, serialized in insertion order.
    #[serde(rename = "Properties", default)]
    pub properties: IndexMap<String, Value>,
}

impl Resource {
    /// Creates a resource of the given platform type with no properties.
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            condition: None,
            depends_on: None,
            properties: IndexMap::new(),
        }
    }

    /// Sets the gating condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Option<String>) -> Self {
        self.condition = condition;
        self
    }

    /// Sets explicit creation-order dependencies.
    #[must_use]
    pub fn with_depends_on(mut self, depends_on: Option<DependsOn>) -> Self {
        self.depends_on = depends_on;
        self
    }

    /// Adds a property when `value` is present.
    ///
    /// Absent values are omitted entirely rather than emitted as a
    /// sentinel, so optional inputs never materialize in the document.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Option<Value>>) -> Self {
        if let Some(value) = value.into() {
            let _ = self.properties.insert(key.into(), value);
        }
        self
    }
}

/// Insertion-ordered mapping of logical names to resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceGraph {
    resources: IndexMap<String, Resource>,
}

impl ResourceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: IndexMap::new(),
        }
    }

    /// Folds an ordered list of `(logical name, resource)` pairs into a
    /// graph.
    ///
    /// # Errors
    ///
    /// Returns an error if two pairs share a logical name.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Resource)>,
    {
        let mut graph = Self::new();
        for (logical_name, resource) in pairs {
            graph.insert(logical_name, resource)?;
        }
        Ok(graph)
    }

    /// Adds a resource under `logical_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn insert(&mut self, logical_name: impl Into<String>, resource: Resource) -> Result<()> {
        let logical_name = logical_name.into();
        if self.resources.contains_key(&logical_name) {
            return Err(StratusError::DuplicateLogicalName { logical_name });
        }
        let _ = self.resources.insert(logical_name, resource);
        Ok(())
    }

    /// Moves every resource of `other` into this graph.
    ///
    /// Two compositions rooted at the same logical name collide here, so
    /// the caller must rename one before combining them.
    ///
    /// # Errors
    ///
    /// Returns an error on any logical-name collision.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        for (logical_name, resource) in other.resources {
            self.insert(logical_name, resource)?;
        }
        Ok(())
    }

    /// Looks up a resource by logical name.
    #[must_use]
    pub fn get(&self, logical_name: &str) -> Option<&Resource> {
        self.resources.get(logical_name)
    }

    /// Mutable lookup by logical name.
    pub fn get_mut(&mut self, logical_name: &str) -> Option<&mut Resource> {
        self.resources.get_mut(logical_name)
    }

    /// Whether a resource exists under `logical_name`.
    #[must_use]
    pub fn contains(&self, logical_name: &str) -> bool {
        self.resources.contains_key(logical_name)
    }

    /// Iterates resources in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resource)> {
        self.resources.iter()
    }

    /// Iterates logical names in insertion order.
    pub fn logical_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Number of resources in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the graph holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl IntoIterator for ResourceGraph {
    type Item = (String, Resource);
    type IntoIter = indexmap::map::IntoIter<String, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

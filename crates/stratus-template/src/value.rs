//! Template property values and intrinsic references.
//!
//! A [`Value`] is the recursive property tree the provisioning engine
//! consumes: scalars, ordered sequences, insertion-ordered mappings, and
//! the intrinsic references (`Ref`, `Fn::GetAtt`, `Fn::Sub`) it substitutes
//! at deploy time. This crate only constructs intrinsics; it never
//! resolves them.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A template property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Insertion-ordered mapping of string keys to values.
    Map(IndexMap<String, Value>),
    /// Reference to another resource's primary identifier.
    Ref(String),
    /// Reference to a named attribute of another resource.
    GetAtt {
        /// Logical name of the referenced resource.
        logical_name: String,
        /// Attribute read at provisioning time.
        attribute: String,
    },
    /// Template-time string substitution.
    Sub {
        /// Substitution template, e.g. `"${AWS::StackName}-uploads"`.
        template: String,
        /// Named values substituted into the template.
        variables: Option<IndexMap<String, Value>>,
    },
}

impl Value {
    /// Creates a `Ref` intrinsic pointing at `logical_name`.
    #[must_use]
    pub fn reference(logical_name: impl Into<String>) -> Self {
        Self::Ref(logical_name.into())
    }

    /// Creates an `Fn::GetAtt` intrinsic reading `attribute` of `logical_name`.
    #[must_use]
    pub fn get_att(logical_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            logical_name: logical_name.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an `Fn::Sub` intrinsic without explicit variables.
    #[must_use]
    pub fn sub(template: impl Into<String>) -> Self {
        Self::Sub {
            template: template.into(),
            variables: None,
        }
    }

    /// Creates an `Fn::Sub` intrinsic with named variables.
    ///
    /// Variable values may themselves be intrinsics, which is what makes
    /// substitution over a not-yet-resolved name possible.
    #[must_use]
    pub fn sub_with<I, K>(template: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Sub {
            template: template.into(),
            variables: Some(variables.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Creates a map value from `(key, value)` pairs, preserving order.
    #[must_use]
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the contained string, if this value is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the contained sequence, if this value is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable view of the contained sequence, if this value is one.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the contained mapping, if this value is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutable view of the contained mapping, if this value is one.
    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::List(items) => items.serialize(serializer),
            Self::Map(entries) => entries.serialize(serializer),
            Self::Ref(logical_name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", logical_name)?;
                map.end()
            }
            Self::GetAtt {
                logical_name,
                attribute,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[logical_name.as_str(), attribute.as_str()])?;
                map.end()
            }
            Self::Sub {
                template,
                variables,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                match variables {
                    None => map.serialize_entry("Fn::Sub", template)?,
                    Some(vars) => map.serialize_entry("Fn::Sub", &(template, vars))?,
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a template property value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::Int(value))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(i64::try_from(value).map_or(Value::Float(value as f64), Value::Int))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = access.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: IndexMap<String, Value> = IndexMap::new();
        while let Some((key, value)) = access.next_entry()? {
            let _ = entries.insert(key, value);
        }
        Ok(reduce_intrinsic(entries))
    }
}

/// Recognizes the single-key intrinsic encodings inside a freshly
/// deserialized mapping. Anything that does not match an encoding exactly
/// stays a plain mapping and is passed through uninspected.
fn reduce_intrinsic(entries: IndexMap<String, Value>) -> Value {
    if entries.len() != 1 {
        return Value::Map(entries);
    }
    let key = entries.keys().next().cloned().unwrap_or_default();
    let reduced = match (key.as_str(), entries.values().next()) {
        ("Ref", Some(Value::String(logical_name))) => Some(Value::Ref(logical_name.clone())),
        ("Fn::GetAtt", Some(value)) => get_att_from(value),
        ("Fn::Sub", Some(value)) => sub_from(value),
        _ => None,
    };
    reduced.unwrap_or(Value::Map(entries))
}

fn get_att_from(value: &Value) -> Option<Value> {
    match value {
        Value::List(items) => match items.as_slice() {
            [Value::String(logical_name), Value::String(attribute)] => {
                Some(Value::get_att(logical_name.as_str(), attribute.as_str()))
            }
            _ => None,
        },
        Value::String(dotted) => {
            let mut parts = dotted.splitn(2, '.');
            match (parts.next(), parts.next()) {
                (Some(logical_name), Some(attribute)) => {
                    Some(Value::get_att(logical_name, attribute))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn sub_from(value: &Value) -> Option<Value> {
    match value {
        Value::String(template) => Some(Value::sub(template.as_str())),
        Value::List(items) => match items.as_slice() {
            [Value::String(template), Value::Map(variables)] => Some(Value::Sub {
                template: template.clone(),
                variables: Some(variables.clone()),
            }),
            _ => None,
        },
        _ => None,
    }
}

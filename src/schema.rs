//! Compiled schema types
//!
//! Field names serialize exactly as JSON Schema draft 6 expects them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::BuiltinKind;

/// Prefix of every `$ref` the compiler emits
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// JSON type name of a non-complex property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Function,
}

impl SchemaType {
    /// Schema type for a non-complex kind; `None` for kinds that are emitted as `$ref`
    pub fn for_kind(kind: BuiltinKind) -> Option<Self> {
        match kind {
            BuiltinKind::String => Some(SchemaType::String),
            BuiltinKind::Number => Some(SchemaType::Number),
            BuiltinKind::Boolean => Some(SchemaType::Boolean),
            BuiltinKind::Array => Some(SchemaType::Array),
            BuiltinKind::Object => Some(SchemaType::Object),
            BuiltinKind::Function => Some(SchemaType::Function),
            BuiltinKind::Date | BuiltinKind::Buffer => None,
        }
    }
}

/// Schema of a single property: a primitive leaf, an array wrapper or a reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFragment {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaFragment>>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl SchemaFragment {
    /// `{"type": <ty>}`
    pub fn primitive(ty: SchemaType) -> Self {
        Self {
            ty: Some(ty),
            ..Self::default()
        }
    }

    /// `{"$ref": "#/definitions/<name>"}`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{DEFINITIONS_PREFIX}{name}")),
            ..Self::default()
        }
    }

    /// `{"type": "array", "items": <items>}`
    pub fn array(items: SchemaFragment) -> Self {
        Self {
            ty: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            reference: None,
        }
    }
}

/// Compiled schema of a model entity
///
/// An entity without model metadata compiles to the empty schema, which
/// serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaFragment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Flat: entries never carry `definitions` of their own
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, CompiledSchema>,
}

impl CompiledSchema {
    /// Schema with only a title set
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// True for the "no model metadata" schema
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.definitions.is_empty()
    }

    /// Copy of this schema without its `definitions`
    pub fn without_definitions(&self) -> Self {
        Self {
            title: self.title.clone(),
            description: self.description.clone(),
            properties: self.properties.clone(),
            required: self.required.clone(),
            definitions: IndexMap::new(),
        }
    }

    /// Whether `definitions` is one level deep
    pub fn has_flat_definitions(&self) -> bool {
        self.definitions.values().all(|d| d.definitions.is_empty())
    }

    /// The schema as a JSON document
    pub fn to_json(&self) -> serde_json::Value {
        // Every field is a string, list or map with string keys, so this cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

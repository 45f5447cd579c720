//! Model Loading
//!
//! Loads model documents from a directory (JSON or TOML, one model per file),
//! declares every model first and then resolves `{ "model": "<Name>" }`
//! references between them.
//!
//! ```json
//! {
//!   "name": "Customer",
//!   "title": "Customer record",
//!   "properties": {
//!     "name": { "type": "string", "required": true },
//!     "address": { "type": { "model": "Address" } },
//!     "tags": { "type": ["string"] }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::ModelsConfig;
use crate::error::{Result, SchemaError};
use crate::model::{EntityRef, ModelDescription, PropertyDescription, PropertyType, TypeToken};
use crate::registry::InMemoryRegistry;

/// On-disk form of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDocument>,
}

/// On-disk form of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDocument {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeDocument>,
    #[serde(default)]
    pub required: bool,
}

/// A property type: one token or a list of tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDocument {
    One(TokenDocument),
    Many(Vec<TokenDocument>),
}

/// A primitive name or a reference to another model by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenDocument {
    Name(String),
    Model { model: String },
}

/// Parse a model document, picking the format from the file extension
pub fn parse_document(path: &Path, content: &str) -> Result<ModelDocument> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(toml::from_str(content)?),
        Some("json") => Ok(serde_json::from_str(content)?),
        other => Err(SchemaError::InvalidFormat(format!(
            "unsupported model file extension {:?} for {}",
            other,
            path.display()
        ))),
    }
}

/// Load every model document under `dir`
pub fn load_from_directory(dir: &Path, config: &ModelsConfig) -> Result<InMemoryRegistry> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !config.accepts(path) {
            continue;
        }
        let content = fs::read_to_string(path)?;
        let document = parse_document(path, &content)?;
        debug!(model = %document.name, path = %path.display(), "parsed model document");
        documents.push(document);
    }

    let registry = build_registry(documents)?;
    info!(models = registry.len(), dir = %dir.display(), "loaded model registry");
    Ok(registry)
}

/// Build a registry from already-parsed documents, keeping their order
pub fn build_registry(documents: Vec<ModelDocument>) -> Result<InMemoryRegistry> {
    let mut registry = InMemoryRegistry::new();
    let mut by_name: HashMap<String, EntityRef> = HashMap::with_capacity(documents.len());

    for document in &documents {
        if by_name.contains_key(&document.name) {
            return Err(SchemaError::DuplicateModel {
                name: document.name.clone(),
            });
        }
        let entity = registry.declare(document.name.as_str());
        by_name.insert(document.name.clone(), entity);
    }

    for document in documents {
        let entity = by_name[&document.name].clone();
        let description = to_description(document, &by_name)?;
        registry.define(&entity, description);
    }

    Ok(registry)
}

fn to_description(document: ModelDocument, by_name: &HashMap<String, EntityRef>) -> Result<ModelDescription> {
    let mut description = ModelDescription::new(document.name.as_str());
    description.title = document.title;
    description.description = document.description;

    for (property_name, property) in document.properties {
        let ty = property
            .ty
            .map(|ty| to_property_type(ty, &document.name, by_name))
            .transpose()?;
        description.properties.insert(
            property_name,
            PropertyDescription {
                ty,
                required: property.required,
            },
        );
    }

    Ok(description)
}

fn to_property_type(ty: TypeDocument, owner: &str, by_name: &HashMap<String, EntityRef>) -> Result<PropertyType> {
    match ty {
        TypeDocument::One(token) => Ok(PropertyType::Scalar(to_token(token, owner, by_name)?)),
        TypeDocument::Many(tokens) => Ok(PropertyType::Sequence(
            tokens
                .into_iter()
                .map(|token| to_token(token, owner, by_name))
                .collect::<Result<_>>()?,
        )),
    }
}

fn to_token(token: TokenDocument, owner: &str, by_name: &HashMap<String, EntityRef>) -> Result<TypeToken> {
    match token {
        TokenDocument::Name(name) => Ok(TypeToken::Named(name)),
        TokenDocument::Model { model } => by_name
            .get(&model)
            .cloned()
            .map(TypeToken::Entity)
            .ok_or_else(|| SchemaError::UnknownModel {
                name: model,
                referenced_by: owner.to_string(),
            }),
    }
}

//! Model description types
//!
//! These are the inputs of the compiler. A [`ModelDescription`] is produced by
//! whatever attaches metadata to a model entity and is only ever read here.

use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a model entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a model entity: an identity plus the name used in `$ref`s
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    id: EntityId,
    name: Arc<str>,
}

impl EntityRef {
    /// Create a handle with a fresh identity
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Built-in type kinds a string token can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Date,
    Buffer,
    /// Only reachable programmatically; never produced from a name string
    Function,
}

impl BuiltinKind {
    /// Canonical (capitalized) name, as used in `$ref`s for complex kinds
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinKind::String => "String",
            BuiltinKind::Number => "Number",
            BuiltinKind::Boolean => "Boolean",
            BuiltinKind::Array => "Array",
            BuiltinKind::Object => "Object",
            BuiltinKind::Date => "Date",
            BuiltinKind::Buffer => "Buffer",
            BuiltinKind::Function => "Function",
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single type token as attached to a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeToken {
    /// Primitive type name, resolved case-insensitively
    Named(String),
    /// Already-resolved built-in kind
    Builtin(BuiltinKind),
    /// Reference to another model entity
    Entity(EntityRef),
}

impl TypeToken {
    /// An empty name counts as "no type"
    pub fn is_absent(&self) -> bool {
        matches!(self, TypeToken::Named(name) if name.is_empty())
    }
}

impl From<&str> for TypeToken {
    fn from(name: &str) -> Self {
        TypeToken::Named(name.to_string())
    }
}

impl From<String> for TypeToken {
    fn from(name: String) -> Self {
        TypeToken::Named(name)
    }
}

impl From<BuiltinKind> for TypeToken {
    fn from(kind: BuiltinKind) -> Self {
        TypeToken::Builtin(kind)
    }
}

impl From<EntityRef> for TypeToken {
    fn from(entity: EntityRef) -> Self {
        TypeToken::Entity(entity)
    }
}

impl From<&EntityRef> for TypeToken {
    fn from(entity: &EntityRef) -> Self {
        TypeToken::Entity(entity.clone())
    }
}

/// Declared type of a property: a scalar token or a sequence of tokens
///
/// Only one-element sequences are valid; the length is checked when the
/// property is resolved, not when it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(TypeToken),
    Sequence(Vec<TypeToken>),
}

impl PropertyType {
    /// Array of a single element type
    pub fn array_of(token: impl Into<TypeToken>) -> Self {
        PropertyType::Sequence(vec![token.into()])
    }

    pub fn is_absent(&self) -> bool {
        match self {
            PropertyType::Scalar(token) => token.is_absent(),
            PropertyType::Sequence(_) => false,
        }
    }
}

impl From<TypeToken> for PropertyType {
    fn from(token: TypeToken) -> Self {
        PropertyType::Scalar(token)
    }
}

impl From<&str> for PropertyType {
    fn from(name: &str) -> Self {
        PropertyType::Scalar(name.into())
    }
}

impl From<String> for PropertyType {
    fn from(name: String) -> Self {
        PropertyType::Scalar(name.into())
    }
}

impl From<BuiltinKind> for PropertyType {
    fn from(kind: BuiltinKind) -> Self {
        PropertyType::Scalar(kind.into())
    }
}

impl From<EntityRef> for PropertyType {
    fn from(entity: EntityRef) -> Self {
        PropertyType::Scalar(entity.into())
    }
}

impl From<&EntityRef> for PropertyType {
    fn from(entity: &EntityRef) -> Self {
        PropertyType::Scalar(entity.into())
    }
}

/// Metadata for one property of a model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDescription {
    pub ty: Option<PropertyType>,
    pub required: bool,
}

impl PropertyDescription {
    /// Property of the given type, not required
    pub fn of(ty: impl Into<PropertyType>) -> Self {
        Self {
            ty: Some(ty.into()),
            required: false,
        }
    }

    /// Property whose type is a one-element array of `token`
    pub fn array_of(token: impl Into<TypeToken>) -> Self {
        Self::of(PropertyType::array_of(token))
    }

    /// Property with no type information; skipped by the compiler
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Mark the property as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The declared type, unless it is missing or empty
    pub fn modeled_type(&self) -> Option<&PropertyType> {
        self.ty.as_ref().filter(|ty| !ty.is_absent())
    }
}

/// Metadata describing a whole model entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescription {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Properties in declaration order
    pub properties: IndexMap<String, PropertyDescription>,
}

impl ModelDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            properties: IndexMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a property; re-declaring a name replaces it in place
    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDescription) -> Self {
        self.properties.insert(name.into(), property);
        self
    }
}

//! Type resolution
//!
//! Maps type tokens to canonical types and decides which of them are complex,
//! i.e. need a `$ref` into `definitions` instead of an inline `type`.

use crate::error::{Result, SchemaError};
use crate::model::{BuiltinKind, EntityRef, PropertyType, TypeToken};

/// A type token after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Builtin(BuiltinKind),
    Entity(EntityRef),
}

impl ResolvedType {
    /// Canonical name of the type
    pub fn name(&self) -> &str {
        match self {
            ResolvedType::Builtin(kind) => kind.name(),
            ResolvedType::Entity(entity) => entity.name(),
        }
    }

    /// Everything except the six plain kinds is complex, including `Date` and `Buffer`
    pub fn is_complex(&self) -> bool {
        match self {
            ResolvedType::Builtin(kind) => !matches!(
                kind,
                BuiltinKind::String
                    | BuiltinKind::Number
                    | BuiltinKind::Boolean
                    | BuiltinKind::Object
                    | BuiltinKind::Function
                    | BuiltinKind::Array
            ),
            ResolvedType::Entity(_) => true,
        }
    }

    /// The referenced entity, if this is a model type
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            ResolvedType::Entity(entity) => Some(entity),
            ResolvedType::Builtin(_) => None,
        }
    }
}

/// A property type after resolution, with the array wrapper unpacked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperty {
    /// The scalar type, or the element type of an array property
    pub element: ResolvedType,
    pub is_array: bool,
}

/// Resolves type tokens into [`ResolvedType`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeResolver;

impl TypeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a single token
    pub fn resolve(&self, token: &TypeToken) -> Result<ResolvedType> {
        match token {
            TypeToken::Named(name) => Self::kind_for_name(name).map(ResolvedType::Builtin),
            TypeToken::Builtin(kind) => Ok(ResolvedType::Builtin(*kind)),
            TypeToken::Entity(entity) => Ok(ResolvedType::Entity(entity.clone())),
        }
    }

    /// Resolve a property's declared type, validating array arity
    pub fn resolve_property(&self, ty: &PropertyType) -> Result<ResolvedProperty> {
        match ty {
            PropertyType::Scalar(token) => Ok(ResolvedProperty {
                element: self.resolve(token)?,
                is_array: false,
            }),
            PropertyType::Sequence(tokens) => match tokens.as_slice() {
                [token] => Ok(ResolvedProperty {
                    element: self.resolve(token)?,
                    is_array: true,
                }),
                _ => Err(SchemaError::InvalidArrayType { len: tokens.len() }),
            },
        }
    }

    /// Case-insensitive lookup of a primitive type name
    pub fn kind_for_name(name: &str) -> Result<BuiltinKind> {
        let lowered = name.to_lowercase();
        match lowered.as_str() {
            "number" => Ok(BuiltinKind::Number),
            "string" => Ok(BuiltinKind::String),
            "boolean" => Ok(BuiltinKind::Boolean),
            "array" => Ok(BuiltinKind::Array),
            "object" => Ok(BuiltinKind::Object),
            "date" => Ok(BuiltinKind::Date),
            "buffer" => Ok(BuiltinKind::Buffer),
            _ => Err(SchemaError::UnsupportedType { token: lowered }),
        }
    }
}

//! Per-property schema fragments

use crate::error::Result;
use crate::model::PropertyType;
use crate::resolver::{ResolvedProperty, ResolvedType, TypeResolver};
use crate::schema::{SchemaFragment, SchemaType};

/// Turns a property's declared type into a [`SchemaFragment`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertySchemaBuilder {
    resolver: TypeResolver,
}

impl PropertySchemaBuilder {
    pub fn new(resolver: TypeResolver) -> Self {
        Self { resolver }
    }

    /// Resolve and build in one step
    pub fn build(&self, ty: &PropertyType) -> Result<SchemaFragment> {
        let resolved = self.resolver.resolve_property(ty)?;
        Ok(Self::fragment_for(&resolved))
    }

    /// Fragment for an already resolved property type
    pub fn fragment_for(resolved: &ResolvedProperty) -> SchemaFragment {
        let element = Self::scalar_fragment(&resolved.element);
        if resolved.is_array {
            SchemaFragment::array(element)
        } else {
            element
        }
    }

    fn scalar_fragment(ty: &ResolvedType) -> SchemaFragment {
        match ty {
            ResolvedType::Builtin(kind) => match SchemaType::for_kind(*kind) {
                Some(schema_type) => SchemaFragment::primitive(schema_type),
                None => SchemaFragment::reference(kind.name()),
            },
            ResolvedType::Entity(entity) => SchemaFragment::reference(entity.name()),
        }
    }
}

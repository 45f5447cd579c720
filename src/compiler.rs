//! Model schema compiler
//!
//! Compiles one model entity into a [`CompiledSchema`]. Referenced entities are
//! compiled through the shared [`SchemaCache`] and hoisted into a single flat
//! `definitions` map.
//!
//! ## Cycles
//! Each top-level request tracks the entities it is currently compiling. With
//! [`CyclePolicy::Reference`], reaching one of them again leaves the `$ref` in
//! place without expanding the entity a second time. Once the re-entered entity
//! is finished, its own body is added to its `definitions` so every `$ref` in
//! the document resolves. A nested result that skipped an *outer* in-flight
//! entity is only valid inside that outer document and is not cached; it is
//! kept for the rest of the request instead, so each entity is compiled at
//! most once per top-level call however many paths lead to it.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::cache::SchemaCache;
use crate::config::CompilerConfig;
use crate::definitions::{CompilationStack, CyclePolicy, DefinitionCollector, NestedSchema};
use crate::error::Result;
use crate::model::{EntityRef, ModelDescription};
use crate::property::PropertySchemaBuilder;
use crate::registry::ModelRegistry;
use crate::resolver::TypeResolver;
use crate::schema::CompiledSchema;

/// Compiles model entities into schemas
pub struct ModelSchemaCompiler<'a, R: ModelRegistry + ?Sized> {
    registry: &'a R,
    cache: &'a SchemaCache,
    resolver: TypeResolver,
    collector: DefinitionCollector,
}

impl<'a, R: ModelRegistry + ?Sized> ModelSchemaCompiler<'a, R> {
    /// Compiler with the default cycle policy
    pub fn new(registry: &'a R, cache: &'a SchemaCache) -> Self {
        Self::with_policy(registry, cache, CyclePolicy::default())
    }

    pub fn with_policy(registry: &'a R, cache: &'a SchemaCache, policy: CyclePolicy) -> Self {
        Self {
            registry,
            cache,
            resolver: TypeResolver::new(),
            collector: DefinitionCollector::new(policy),
        }
    }

    pub fn from_config(registry: &'a R, cache: &'a SchemaCache, config: &CompilerConfig) -> Self {
        Self::with_policy(registry, cache, config.cycle_policy)
    }

    pub fn cache(&self) -> &SchemaCache {
        self.cache
    }

    pub fn policy(&self) -> CyclePolicy {
        self.collector.policy()
    }

    /// Cached schema for `entity`, compiling it on first request
    pub fn schema_for(&self, entity: &EntityRef) -> Result<Arc<CompiledSchema>> {
        self.cache.get_or_compile(entity.id(), || {
            debug!(entity = entity.name(), "schema cache miss");
            let mut stack = CompilationStack::new();
            let nested = self.compile_entity(entity, &mut stack)?;
            // A top-level result has no outer entities left to depend on
            debug_assert!(nested.is_self_contained());
            debug_assert!(nested.schema.has_flat_definitions());
            Ok(nested.schema)
        })
    }

    /// Compile `entity` without consulting or filling the cache for the entity
    /// itself; referenced entities still go through the cache.
    pub fn compile(&self, entity: &EntityRef) -> Result<CompiledSchema> {
        let mut stack = CompilationStack::new();
        Ok(self.compile_entity(entity, &mut stack)?.schema)
    }

    /// Nested lookup used while another entity is in flight
    fn lookup(&self, entity: &EntityRef, stack: &mut CompilationStack) -> Result<NestedSchema> {
        if let Some(hit) = self.cache.get(entity.id()) {
            trace!(entity = entity.name(), "nested schema cache hit");
            return Ok(NestedSchema::complete(CompiledSchema::clone(&hit)));
        }
        if let Some(finished) = stack.recall(entity.id()) {
            trace!(entity = entity.name(), "reusing schema finished earlier in this request");
            return Ok(finished.clone());
        }
        let nested = self.compile_entity(entity, stack)?;
        if nested.is_self_contained() {
            self.cache.insert(entity.id(), nested.schema.clone());
        } else {
            trace!(entity = entity.name(), "nested schema depends on an outer entity, not cached");
            stack.remember(entity, &nested);
        }
        Ok(nested)
    }

    fn compile_entity(&self, entity: &EntityRef, stack: &mut CompilationStack) -> Result<NestedSchema> {
        let Some(description) = self.registry.describe(entity) else {
            debug!(entity = entity.name(), "no model metadata, compiling to empty schema");
            return Ok(NestedSchema::default());
        };

        debug!(entity = entity.name(), depth = stack.depth(), "compiling model schema");
        stack.push(entity);
        let compiled = self.compile_description(entity, description, stack);
        stack.pop();

        let mut nested = compiled?;
        if nested.cut.remove(entity) {
            let body = nested.schema.without_definitions();
            nested.schema.definitions.insert(entity.name().to_string(), body);
        }
        nested.settle();
        Ok(nested)
    }

    fn compile_description(
        &self,
        entity: &EntityRef,
        description: &ModelDescription,
        stack: &mut CompilationStack,
    ) -> Result<NestedSchema> {
        let title = description
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(entity.name());
        let mut schema = CompiledSchema::titled(title);
        schema.description = description.description.clone();
        let mut cut = HashSet::new();

        for (name, property) in &description.properties {
            let Some(ty) = property.modeled_type() else {
                trace!(entity = entity.name(), property = %name, "skipping untyped property");
                continue;
            };

            let resolved = self.resolver.resolve_property(ty)?;
            trace!(entity = entity.name(), property = %name, ty = resolved.element.name(), array = resolved.is_array, "resolved property");
            schema
                .properties
                .insert(name.clone(), PropertySchemaBuilder::fragment_for(&resolved));

            if resolved.element.is_complex() {
                self.collector.collect_into(
                    &mut schema.definitions,
                    &resolved.element,
                    stack,
                    &mut cut,
                    |nested, stack| self.lookup(nested, stack),
                )?;
            }

            if property.required {
                schema.required.push(name.clone());
            }
        }

        Ok(NestedSchema { schema, cut })
    }
}

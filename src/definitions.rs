//! Definition hoisting
//!
//! Pulls the compiled schemas of referenced entities into the referencing
//! schema's `definitions`, flattening anything those schemas define in turn.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::model::{EntityId, EntityRef};
use crate::resolver::ResolvedType;
use crate::schema::CompiledSchema;

/// What to do when an entity is reached again while it is still being compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Keep the `$ref` and do not expand the entity a second time
    #[default]
    Reference,
    /// Fail with [`SchemaError::CyclicModel`]
    Reject,
}

/// State of one top-level compilation: the entities in flight, outermost
/// first, and the nested results already finished during this call
#[derive(Debug, Default)]
pub struct CompilationStack {
    entities: Vec<EntityRef>,
    finished: HashMap<EntityId, NestedSchema>,
}

impl CompilationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: &EntityRef) {
        self.entities.push(entity.clone());
    }

    pub fn pop(&mut self) {
        self.entities.pop();
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|e| e.id() == id)
    }

    pub fn depth(&self) -> usize {
        self.entities.len()
    }

    /// Keep a nested result for reuse by later references in this call
    pub fn remember(&mut self, entity: &EntityRef, nested: &NestedSchema) {
        self.finished.insert(entity.id(), nested.clone());
    }

    pub fn recall(&self, id: EntityId) -> Option<&NestedSchema> {
        self.finished.get(&id)
    }

    /// `A -> B -> A` style rendering of the stack closed by `reentered`
    pub fn path_to(&self, reentered: &EntityRef) -> String {
        self.entities
            .iter()
            .map(EntityRef::name)
            .chain(std::iter::once(reentered.name()))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// A nested entity's schema together with the entities it references but
/// does not define
#[derive(Debug, Clone, Default)]
pub struct NestedSchema {
    pub schema: CompiledSchema,
    /// Entities left as bare `$ref`s because they were in flight
    pub cut: HashSet<EntityRef>,
}

impl NestedSchema {
    pub fn complete(schema: CompiledSchema) -> Self {
        Self {
            schema,
            cut: HashSet::new(),
        }
    }

    /// Only schemas that skipped nothing outside themselves stand on their own
    pub fn is_self_contained(&self) -> bool {
        self.cut.is_empty()
    }

    /// Forget cut entities whose definition has since been hoisted into this schema
    pub fn settle(&mut self) {
        let definitions = &self.schema.definitions;
        self.cut.retain(|entity| !definitions.contains_key(entity.name()));
    }
}

/// Collects definitions for complex property types
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionCollector {
    policy: CyclePolicy,
}

impl DefinitionCollector {
    pub fn new(policy: CyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> CyclePolicy {
        self.policy
    }

    /// Add the definition of `element` (and everything it defines) to `target`
    ///
    /// `lookup` obtains the nested schema, normally through the cache, and may
    /// push further entities onto `stack` while it runs. Built-in
    /// complex kinds such as `Date` carry no model metadata and are skipped.
    pub fn collect_into<F>(
        &self,
        target: &mut IndexMap<String, CompiledSchema>,
        element: &ResolvedType,
        stack: &mut CompilationStack,
        cut: &mut HashSet<EntityRef>,
        lookup: F,
    ) -> Result<()>
    where
        F: FnOnce(&EntityRef, &mut CompilationStack) -> Result<NestedSchema>,
    {
        let Some(entity) = element.entity() else {
            trace!(kind = element.name(), "no model metadata for built-in kind");
            return Ok(());
        };

        if stack.contains(entity.id()) {
            return match self.policy {
                CyclePolicy::Reference => {
                    debug!(entity = entity.name(), path = %stack.path_to(entity), "cycle cut, keeping $ref");
                    cut.insert(entity.clone());
                    Ok(())
                }
                CyclePolicy::Reject => Err(SchemaError::CyclicModel {
                    path: stack.path_to(entity),
                }),
            };
        }

        let nested = lookup(entity, stack)?;
        cut.extend(nested.cut);
        merge_nested(target, entity.name(), nested.schema);
        Ok(())
    }
}

/// Hoist `schema`'s own definitions into `target`, then store the stripped
/// schema under `name`. Later entries overwrite earlier ones with the same name.
///
/// Empty schemas (entities without metadata) are dropped.
pub fn merge_nested(target: &mut IndexMap<String, CompiledSchema>, name: &str, mut schema: CompiledSchema) {
    if schema.is_empty() {
        debug!(entity = name, "referenced entity has no model metadata, omitting definition");
        return;
    }
    for (key, definition) in std::mem::take(&mut schema.definitions) {
        target.insert(key, definition);
    }
    target.insert(name.to_string(), schema);
}

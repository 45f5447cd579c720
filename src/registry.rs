//! Model Registry
//!
//! The compiler never inspects types itself; it asks a [`ModelRegistry`] for
//! the metadata attached to an entity.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::ModelsConfig;
use crate::error::Result;
use crate::loader;
use crate::model::{EntityId, EntityRef, ModelDescription};

/// Source of model metadata
pub trait ModelRegistry {
    /// Metadata for `entity`, or `None` if the entity is not a modeled type
    fn describe(&self, entity: &EntityRef) -> Option<&ModelDescription>;
}

impl<T: ModelRegistry + ?Sized> ModelRegistry for &T {
    fn describe(&self, entity: &EntityRef) -> Option<&ModelDescription> {
        (**self).describe(entity)
    }
}

impl<T: ModelRegistry + ?Sized> ModelRegistry for Box<T> {
    fn describe(&self, entity: &EntityRef) -> Option<&ModelDescription> {
        (**self).describe(entity)
    }
}

impl<T: ModelRegistry + ?Sized> ModelRegistry for Arc<T> {
    fn describe(&self, entity: &EntityRef) -> Option<&ModelDescription> {
        (**self).describe(entity)
    }
}

/// Registry holding model descriptions in memory
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    /// Entities in declaration order
    entities: Vec<EntityRef>,
    descriptions: HashMap<EntityId, ModelDescription>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every model document under `dir`
    pub fn load_from_directory(dir: impl AsRef<Path>, config: &ModelsConfig) -> Result<Self> {
        loader::load_from_directory(dir.as_ref(), config)
    }

    /// Create a handle without metadata yet
    ///
    /// Lets descriptions refer to entities that are defined later, including
    /// themselves.
    pub fn declare(&mut self, name: impl Into<Arc<str>>) -> EntityRef {
        let entity = EntityRef::new(name);
        self.entities.push(entity.clone());
        entity
    }

    /// Attach metadata to a declared entity, replacing any previous description
    pub fn define(&mut self, entity: &EntityRef, description: ModelDescription) {
        if !self.entities.contains(entity) {
            self.entities.push(entity.clone());
        }
        self.descriptions.insert(entity.id(), description);
    }

    /// Declare and define in one step
    pub fn register(&mut self, description: ModelDescription) -> EntityRef {
        let entity = self.declare(description.name.as_str());
        self.define(&entity, description);
        entity
    }

    /// First entity declared under `name`
    pub fn find(&self, name: &str) -> Option<&EntityRef> {
        self.entities.iter().find(|e| e.name() == name)
    }

    /// All entities in declaration order, with or without metadata
    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    /// Entities that carry metadata, in declaration order
    pub fn described(&self) -> impl Iterator<Item = &EntityRef> {
        self.entities
            .iter()
            .filter(|e| self.descriptions.contains_key(&e.id()))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl ModelRegistry for InMemoryRegistry {
    fn describe(&self, entity: &EntityRef) -> Option<&ModelDescription> {
        self.descriptions.get(&entity.id())
    }
}

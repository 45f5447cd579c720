//! Cache behaviour observed through a counting registry

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use model_json_schema::{
    CompiledSchema, EntityRef, InMemoryRegistry, ModelDescription, ModelRegistry, ModelSchemaCompiler,
    PropertyDescription, SchemaCache,
};
use serde_json::Value;

/// Registry that counts metadata lookups, i.e. compilations
struct CountingRegistry {
    inner: InMemoryRegistry,
    lookups: AtomicUsize,
}

impl CountingRegistry {
    fn new(inner: InMemoryRegistry) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ModelRegistry for CountingRegistry {
    fn describe(&self, entity: &EntityRef) -> Option<&ModelDescription> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.describe(entity)
    }
}

fn shop() -> (CountingRegistry, EntityRef, EntityRef) {
    let mut registry = InMemoryRegistry::new();
    let line = registry.register(
        ModelDescription::new("OrderLine")
            .with_property("sku", PropertyDescription::of("string").required())
            .with_property("quantity", PropertyDescription::of("number")),
    );
    let order = registry.register(
        ModelDescription::new("Order")
            .with_property("lines", PropertyDescription::array_of(&line).required())
            .with_property("first", PropertyDescription::of(&line)),
    );
    (CountingRegistry::new(registry), order, line)
}

#[test]
fn test_second_request_does_no_work() {
    let (registry, order, _) = shop();
    let cache = SchemaCache::new();
    let compiler = ModelSchemaCompiler::new(&registry, &cache);

    let first = compiler.schema_for(&order).unwrap();
    let after_first = registry.lookups();
    // Order and OrderLine, each described exactly once
    assert_eq!(after_first, 2);

    let second = compiler.schema_for(&order).unwrap();
    assert_eq!(registry.lookups(), after_first);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.hits(), 2);
}

#[test]
fn test_referenced_entity_is_reused() {
    let (registry, order, line) = shop();
    let cache = SchemaCache::new();
    let compiler = ModelSchemaCompiler::new(&registry, &cache);

    compiler.schema_for(&order).unwrap();
    let lookups = registry.lookups();

    let line_schema = compiler.schema_for(&line).unwrap();
    assert_eq!(registry.lookups(), lookups);
    assert_eq!(line_schema.required, vec!["sku"]);
}

#[test]
fn test_uncached_compile_is_idempotent() {
    let (registry, order, _) = shop();
    let cache = SchemaCache::new();
    let compiler = ModelSchemaCompiler::new(&registry, &cache);

    let first = compiler.compile(&order).unwrap();
    let second = compiler.compile(&order).unwrap();
    assert_eq!(first, second);
    assert_eq!(*compiler.schema_for(&order).unwrap(), first);
}

#[test]
fn test_separate_caches_are_isolated() {
    let (registry, order, _) = shop();
    let first_cache = SchemaCache::new();
    let second_cache = SchemaCache::new();

    ModelSchemaCompiler::new(&registry, &first_cache).schema_for(&order).unwrap();
    let lookups = registry.lookups();
    ModelSchemaCompiler::new(&registry, &second_cache).schema_for(&order).unwrap();

    assert_eq!(registry.lookups(), lookups * 2);
    assert_eq!(first_cache.len(), second_cache.len());
}

#[test]
fn test_cache_keys_on_identity_not_name() {
    let mut first = InMemoryRegistry::new();
    let a = first.register(ModelDescription::new("Item").with_property("x", PropertyDescription::of("number")));
    let mut second = InMemoryRegistry::new();
    let b = second.register(ModelDescription::new("Item").with_property("y", PropertyDescription::of("string")));

    let cache = SchemaCache::new();
    let schema_a = ModelSchemaCompiler::new(&first, &cache).schema_for(&a).unwrap();
    let schema_b = ModelSchemaCompiler::new(&second, &cache).schema_for(&b).unwrap();

    assert!(schema_a.properties.contains_key("x"));
    assert!(schema_b.properties.contains_key("y"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_concurrent_requests_agree() {
    let (registry, order, _) = shop();
    let cache = SchemaCache::new();
    let compiler = ModelSchemaCompiler::new(&registry, &cache);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| compiler.schema_for(&order).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for schema in &results {
        assert_eq!(**schema, *results[0]);
    }
    assert_eq!(cache.len(), 2);
}

// =============================================================================
// Cyclic Models
// =============================================================================

/// Every `$ref` anywhere in `value`
fn collect_refs<'v>(value: &'v Value, refs: &mut Vec<&'v str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", Value::String(target)) => refs.push(target),
                    _ => collect_refs(child, refs),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, refs)),
        _ => {}
    }
}

fn assert_refs_resolve(schema: &CompiledSchema) {
    assert!(schema.has_flat_definitions());
    let document = schema.to_json();
    let mut refs = Vec::new();
    collect_refs(&document, &mut refs);
    for target in refs {
        let name = target.strip_prefix("#/definitions/").unwrap();
        assert!(schema.definitions.contains_key(name), "dangling $ref {}", target);
    }
}

/// `size` models, each with a property referencing every other model
fn fully_connected(size: usize) -> (CountingRegistry, Vec<EntityRef>) {
    let mut registry = InMemoryRegistry::new();
    let models: Vec<_> = (0..size).map(|i| registry.declare(format!("M{}", i))).collect();
    for model in &models {
        let mut description = ModelDescription::new(model.name());
        for other in models.iter().filter(|other| *other != model) {
            description = description.with_property(format!("to_{}", other.name()), PropertyDescription::of(other));
        }
        registry.define(model, description);
    }
    (CountingRegistry::new(registry), models)
}

#[test]
fn test_fully_connected_models_compile_each_entity_once() {
    for size in [3, 8, 12] {
        let (registry, models) = fully_connected(size);
        let cache = SchemaCache::new();
        let compiler = ModelSchemaCompiler::new(&registry, &cache);

        let schema = compiler.schema_for(&models[0]).unwrap();

        assert_eq!(registry.lookups(), size, "lookups for {} models", size);
        assert_eq!(schema.definitions.len(), size);
        assert_refs_resolve(&schema);
    }
}

#[test]
fn test_diamond_with_back_edge() {
    let mut inner = InMemoryRegistry::new();
    let root = inner.declare("Root");
    let left = inner.declare("Left");
    let right = inner.declare("Right");
    let shared = inner.declare("Shared");
    inner.define(
        &root,
        ModelDescription::new("Root")
            .with_property("left", PropertyDescription::of(&left))
            .with_property("right", PropertyDescription::of(&right)),
    );
    inner.define(&left, ModelDescription::new("Left").with_property("shared", PropertyDescription::of(&shared)));
    inner.define(&right, ModelDescription::new("Right").with_property("shared", PropertyDescription::of(&shared)));
    inner.define(&shared, ModelDescription::new("Shared").with_property("root", PropertyDescription::of(&root)));
    let registry = CountingRegistry::new(inner);
    let cache = SchemaCache::new();
    let compiler = ModelSchemaCompiler::new(&registry, &cache);

    let schema = compiler.schema_for(&root).unwrap();

    // Shared is reached through both Left and Right but compiled once
    assert_eq!(registry.lookups(), 4);
    assert_eq!(
        schema.definitions.keys().collect::<Vec<_>>(),
        vec!["Shared", "Left", "Right", "Root"]
    );
    assert_refs_resolve(&schema);

    // Everything below Root depended on Root being in flight
    assert_eq!(cache.len(), 1);
    let shared_schema = compiler.schema_for(&shared).unwrap();
    assert_refs_resolve(&shared_schema);
}

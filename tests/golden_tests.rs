//! Golden Tests for Compiled Schemas
//!
//! Loads the model documents under `tests/fixtures/models`, compiles them and
//! compares the output with the documents under `tests/fixtures/expected`.

use std::path::{Path, PathBuf};

use jsonschema::{Draft, JSONSchema};
use model_json_schema::{
    CompilerConfig, CyclePolicy, ExportConfig, InMemoryRegistry, ModelSchemaCompiler, ModelsConfig, SchemaCache,
    SchemaError, SchemaExporter,
};
use serde_json::json;

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_registry() -> InMemoryRegistry {
    InMemoryRegistry::load_from_directory(fixtures_path().join("models"), &ModelsConfig::default()).unwrap()
}

fn expected(name: &str) -> serde_json::Value {
    let path = fixtures_path().join("expected").join(format!("{}.schema.json", name));
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn compiled(registry: &InMemoryRegistry, cache: &SchemaCache, name: &str) -> serde_json::Value {
    let entity = registry.find(name).unwrap();
    ModelSchemaCompiler::new(registry, cache).schema_for(entity).unwrap().to_json()
}

fn draft6(schema: &serde_json::Value) -> JSONSchema {
    JSONSchema::options()
        .with_draft(Draft::Draft6)
        .compile(schema)
        .expect("compiled document should be a valid draft 6 schema")
}

// =============================================================================
// Golden Documents
// =============================================================================

#[test]
fn test_golden_documents() {
    let registry = load_registry();
    let cache = SchemaCache::new();

    for name in ["Country", "Address", "Customer", "Category"] {
        assert_eq!(compiled(&registry, &cache, name), expected(name), "schema for {}", name);
    }
}

#[test]
fn test_golden_documents_independent_of_compile_order() {
    let registry = load_registry();
    let cache = SchemaCache::new();

    for name in ["Category", "Customer", "Address", "Country"] {
        assert_eq!(compiled(&registry, &cache, name), expected(name), "schema for {}", name);
    }
}

#[test]
fn test_property_order_follows_declaration() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let customer = compiled(&registry, &cache, "Customer");

    let keys: Vec<_> = customer["properties"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["id", "name", "addresses", "primary", "tags", "active", "metadata", "created"]
    );
    assert_eq!(customer["required"], json!(["id", "name"]));
}

#[test]
fn test_definitions_are_flat() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let customer = compiled(&registry, &cache, "Customer");

    let definitions = customer["definitions"].as_object().unwrap();
    assert!(definitions.contains_key("Address"));
    assert!(definitions.contains_key("Country"));
    assert!(!definitions.contains_key("Date"));
    for (name, definition) in definitions {
        assert!(definition.get("definitions").is_none(), "{} carries nested definitions", name);
    }
}

#[test]
fn test_untyped_required_property_is_ignored() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let customer = compiled(&registry, &cache, "Customer");

    assert!(customer["properties"].get("note").is_none());
    assert!(!customer["required"].as_array().unwrap().contains(&json!("note")));
}

// =============================================================================
// Draft 6 Validation
// =============================================================================

#[test]
fn test_address_schema_validates_instances() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let schema = draft6(&compiled(&registry, &cache, "Address"));

    assert!(schema.is_valid(&json!({"street": "1 Main St", "city": "Utrecht", "country": {"code": "NL"}})));
    assert!(!schema.is_valid(&json!({"street": "1 Main St"})));
    assert!(!schema.is_valid(&json!({"street": 1, "city": "Utrecht"})));
    // Checked through #/definitions/Country
    assert!(!schema.is_valid(&json!({"street": "1 Main St", "city": "Utrecht", "country": {"name": "Netherlands"}})));
}

#[test]
fn test_recursive_schema_validates_instances() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let schema = draft6(&compiled(&registry, &cache, "Category"));

    assert!(schema.is_valid(&json!({
        "name": "root",
        "children": [{"name": "leaf", "children": []}]
    })));
    assert!(!schema.is_valid(&json!({
        "name": "root",
        "children": [{"children": []}]
    })));
}

// =============================================================================
// Policies and Export
// =============================================================================

#[test]
fn test_reject_policy_on_fixtures() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let compiler = ModelSchemaCompiler::with_policy(&registry, &cache, CyclePolicy::Reject);

    let customer = registry.find("Customer").unwrap();
    assert!(compiler.schema_for(customer).is_ok());

    let category = registry.find("Category").unwrap();
    match compiler.schema_for(category) {
        Err(SchemaError::CyclicModel { path }) => assert_eq!(path, "Category -> Category"),
        other => panic!("Expected CyclicModel, got {:?}", other),
    }
}

#[test]
fn test_export_matches_golden_documents() {
    let registry = load_registry();
    let cache = SchemaCache::new();
    let compiler = CompilerConfig::default();
    let export = ExportConfig::default();
    let output = tempfile::tempdir().unwrap();

    let manifest = SchemaExporter::new(&registry, &cache, &compiler, &export)
        .export_to(output.path())
        .unwrap();

    assert_eq!(manifest.schemas.len(), 4);
    for schema in &manifest.schemas {
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.path().join(&schema.file)).unwrap()).unwrap();
        assert_eq!(written, expected(&schema.name));
        assert!(schema.checksum.verify_json(&written));
    }
}

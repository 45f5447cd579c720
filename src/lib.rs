//! Model JSON Schema
//!
//! Compiles data-model descriptions into JSON Schema draft 6 documents.
//!
//! ## Features
//!
//! - **Type Resolution**: primitive type names map to built-in kinds, case-insensitively
//! - **Definition Hoisting**: referenced models land in one flat `definitions` map
//! - **Cycle Handling**: self and mutual references compile to `$ref`s instead of recursing forever
//! - **Caching**: each entity is compiled once per [`SchemaCache`]
//! - **Model Files**: JSON and TOML model documents, loaded from a directory
//!
//! ## Architecture
//!
//! ```text
//! ModelRegistry ──describe──▶ ModelSchemaCompiler ──▶ CompiledSchema
//!                                │   │   │
//!                   TypeResolver ┘   │   └ DefinitionCollector ──▶ SchemaCache
//!                  PropertySchemaBuilder
//! ```
//!
//! ## Example
//!
//! ```
//! use model_json_schema::{InMemoryRegistry, ModelDescription, ModelSchemaCompiler,
//!     PropertyDescription, SchemaCache};
//!
//! let mut registry = InMemoryRegistry::new();
//! let address = registry.register(
//!     ModelDescription::new("Address").with_property("city", PropertyDescription::of("string")),
//! );
//! let customer = registry.register(
//!     ModelDescription::new("Customer")
//!         .with_property("address", PropertyDescription::of(&address).required()),
//! );
//!
//! let cache = SchemaCache::new();
//! let compiler = ModelSchemaCompiler::new(&registry, &cache);
//! let schema = compiler.schema_for(&customer).unwrap();
//!
//! assert_eq!(schema.required, vec!["address"]);
//! assert!(schema.definitions.contains_key("Address"));
//! ```

pub mod cache;
pub mod checksum;
pub mod compiler;
pub mod config;
pub mod definitions;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod property;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use cache::SchemaCache;
pub use checksum::Checksum;
pub use compiler::ModelSchemaCompiler;
pub use config::{CompilerConfig, ExportConfig, ModelsConfig, OutputFormat, SchemaConfig};
pub use definitions::{CyclePolicy, DefinitionCollector};
pub use error::{Result, SchemaError};
pub use export::{ExportManifest, SchemaExporter};
pub use model::{
    BuiltinKind, EntityId, EntityRef, ModelDescription, PropertyDescription, PropertyType, TypeToken,
};
pub use property::PropertySchemaBuilder;
pub use registry::{InMemoryRegistry, ModelRegistry};
pub use resolver::{ResolvedProperty, ResolvedType, TypeResolver};
pub use schema::{CompiledSchema, SchemaFragment, SchemaType};

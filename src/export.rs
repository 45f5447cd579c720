//! Schema Export
//!
//! Compiles every described entity of a registry and writes the documents to
//! a directory:
//!
//! ```text
//! schemas/
//! ├── Address.schema.json
//! ├── Customer.schema.json
//! ├── manifest.json
//! └── checksums.sha256
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::cache::SchemaCache;
use crate::checksum::Checksum;
use crate::compiler::ModelSchemaCompiler;
use crate::config::{CompilerConfig, ExportConfig};
use crate::error::{Result, SchemaError};
use crate::registry::InMemoryRegistry;

/// File name for an entity's schema document
pub fn schema_filename(name: &str) -> String {
    format!("{}.schema.json", name)
}

/// One exported document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSchema {
    pub name: String,
    pub file: String,
    pub checksum: Checksum,
}

/// Index of an export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub schemas: Vec<ExportedSchema>,
}

impl ExportManifest {
    pub fn get(&self, name: &str) -> Option<&ExportedSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// `<checksum>  <file>` lines, as understood by `sha256sum -c`
    pub fn checksums_file(&self) -> String {
        self.schemas
            .iter()
            .map(|s| format!("{}  {}", s.checksum, s.file))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Writes compiled schemas for a whole registry
pub struct SchemaExporter<'a> {
    registry: &'a InMemoryRegistry,
    cache: &'a SchemaCache,
    compiler: &'a CompilerConfig,
    export: &'a ExportConfig,
}

impl<'a> SchemaExporter<'a> {
    pub fn new(
        registry: &'a InMemoryRegistry,
        cache: &'a SchemaCache,
        compiler: &'a CompilerConfig,
        export: &'a ExportConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            compiler,
            export,
        }
    }

    /// Compile every described entity, in declaration order, without writing anything
    pub fn compile_all(&self) -> Result<Vec<(String, serde_json::Value)>> {
        let compiler = ModelSchemaCompiler::from_config(self.registry, self.cache, self.compiler);
        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for entity in self.registry.described() {
            if !seen.insert(entity.name()) {
                return Err(SchemaError::DuplicateModel {
                    name: entity.name().to_string(),
                });
            }
            let schema = compiler.schema_for(entity)?;
            documents.push((entity.name().to_string(), schema.to_json()));
        }

        Ok(documents)
    }

    /// Compile and write every described entity into `output_dir`
    pub fn export_to(&self, output_dir: impl AsRef<Path>) -> Result<ExportManifest> {
        let output = output_dir.as_ref();
        let documents = self.compile_all()?;
        fs::create_dir_all(output)?;

        let mut schemas = Vec::with_capacity(documents.len());
        for (name, document) in documents {
            let file = schema_filename(&name);
            let content = self.export.output_format.render(&document)?;
            fs::write(output.join(&file), content)?;
            debug!(model = %name, file = %file, "wrote schema");

            schemas.push(ExportedSchema {
                checksum: Checksum::from_json(&document),
                name,
                file,
            });
        }

        let manifest = ExportManifest {
            generated_at: Utc::now(),
            schemas,
        };

        if self.export.include_manifest {
            let content = self.export.output_format.render(&manifest)?;
            fs::write(output.join("manifest.json"), content)?;
        }
        if self.export.include_checksums {
            fs::write(output.join("checksums.sha256"), manifest.checksums_file())?;
        }

        info!(schemas = manifest.schemas.len(), dir = %output.display(), "exported schemas");
        Ok(manifest)
    }
}

//! Configuration management for schema compilation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (model-schema.toml)
//! - Environment variables (MODEL_SCHEMA__*)
//!
//! ## Example config file (model-schema.toml):
//! ```toml
//! [compiler]
//! cycle_policy = "reference"
//!
//! [models]
//! path = "./models"
//! extensions = ["json", "toml"]
//!
//! [export]
//! output_dir = "./schemas"
//! output_format = "pretty"
//! include_manifest = true
//! include_checksums = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::definitions::CyclePolicy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Compiler settings
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Where model documents are read from
    #[serde(default)]
    pub models: ModelsConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Compiler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Handling of entities that reference themselves, directly or indirectly
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
}

/// Model document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding model documents
    #[serde(default = "default_models_path")]
    pub path: PathBuf,

    /// File extensions treated as model documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory compiled schemas are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Write manifest.json
    #[serde(default = "default_true")]
    pub include_manifest: bool,

    /// Write checksums.sha256
    #[serde(default = "default_true")]
    pub include_checksums: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

// Default value functions
fn default_models_path() -> PathBuf {
    PathBuf::from("models")
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string(), "toml".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_true() -> bool {
    true
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            path: default_models_path(),
            extensions: default_extensions(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            output_format: OutputFormat::Pretty,
            include_manifest: true,
            include_checksums: true,
        }
    }
}

impl ModelsConfig {
    /// Whether `path` has one of the configured extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "model-schema.toml",
            ".model-schema.toml",
            "config/model-schema.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "model-schema") {
            let xdg_config = config_dir.config_dir().join("model-schema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // MODEL_SCHEMA__COMPILER__CYCLE_POLICY=reject etc.
        builder = builder.add_source(
            Environment::with_prefix("MODEL_SCHEMA")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Models directory, resolved against the current directory when relative
    pub fn models_path(&self) -> PathBuf {
        absolutize(&self.models.path)
    }

    /// Export directory, resolved against the current directory when relative
    pub fn output_dir(&self) -> PathBuf {
        absolutize(&self.export.output_dir)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

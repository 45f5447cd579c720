//! Schema Export CLI
//!
//! Compiles model documents into JSON Schema documents, either one model to
//! stdout or the whole model directory to an output directory.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use model_json_schema::{
    CyclePolicy, InMemoryRegistry, ModelSchemaCompiler, OutputFormat, SchemaCache, SchemaConfig, SchemaExporter,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-export")]
#[command(about = "Compile model documents into JSON Schema documents")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory of model documents (overrides config)
    #[arg(short, long, global = true)]
    models: Option<PathBuf>,

    /// Cycle policy (overrides config)
    #[arg(long, global = true, value_parser = parse_policy)]
    cycles: Option<CyclePolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled schema of one model
    Compile {
        /// Model name
        name: String,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Compile every model and write the documents to a directory
    Export {
        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only compile, don't write anything
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_policy(value: &str) -> Result<CyclePolicy, String> {
    match value {
        "reference" => Ok(CyclePolicy::Reference),
        "reject" => Ok(CyclePolicy::Reject),
        other => Err(format!("unknown cycle policy '{}', expected 'reference' or 'reject'", other)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = SchemaConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(models) = cli.models {
        config.models.path = models;
    }
    if let Some(policy) = cli.cycles {
        config.compiler.cycle_policy = policy;
    }

    let models_dir = config.models_path();
    let registry = InMemoryRegistry::load_from_directory(&models_dir, &config.models)
        .with_context(|| format!("loading models from {}", models_dir.display()))?;
    let cache = SchemaCache::new();

    match cli.command {
        Commands::Compile { name, compact } => {
            let entity = registry
                .find(&name)
                .ok_or_else(|| anyhow!("no model named '{}' in {}", name, models_dir.display()))?;
            let compiler = ModelSchemaCompiler::from_config(&registry, &cache, &config.compiler);
            let schema = compiler.schema_for(entity)?;

            let format = if compact { OutputFormat::Compact } else { config.export.output_format };
            println!("{}", format.render(&*schema)?);
        }

        Commands::Export { output, dry_run } => {
            if let Some(output) = output {
                config.export.output_dir = output;
            }
            let exporter = SchemaExporter::new(&registry, &cache, &config.compiler, &config.export);

            if dry_run {
                let documents = exporter.compile_all()?;
                println!("🔍 Dry run: {} schemas compiled", documents.len());
                for (name, document) in &documents {
                    let definitions = document
                        .get("definitions")
                        .and_then(|d| d.as_object())
                        .map(|d| d.len())
                        .unwrap_or(0);
                    println!("  - {} ({} definitions)", name, definitions);
                }
                return Ok(());
            }

            let output_dir = config.output_dir();
            let manifest = exporter.export_to(&output_dir)?;
            println!("📦 Exported {} schemas to {}", manifest.schemas.len(), output_dir.display());
            for schema in &manifest.schemas {
                println!("  ✓ {} -> {}", schema.name, schema.file);
            }
        }
    }

    Ok(())
}

//! Schema Config CLI
//!
//! View and manage schema compilation configuration.

use clap::{Parser, Subcommand};
use model_json_schema::SchemaConfig;

#[derive(Parser)]
#[command(name = "schema-config")]
#[command(about = "View and manage schema compilation configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "model-schema.toml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = SchemaConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Schema Configuration\n");
                println!("Compiler:");
                println!("  Cycle policy: {:?}", cfg.compiler.cycle_policy);
                println!("\nModels:");
                println!("  Path: {:?}", cfg.models.path);
                println!("  Extensions: {}", cfg.models.extensions.join(", "));
                println!("\nExport:");
                println!("  Output dir: {:?}", cfg.export.output_dir);
                println!("  Format: {:?}", cfg.export.output_format);
                println!("  Manifest: {}", cfg.export.include_manifest);
                println!("  Checksums: {}", cfg.export.include_checksums);
            }
        }

        Commands::Init { output, force } => {
            if std::path::Path::new(&output).exists() && !force {
                return Err(format!("{} already exists (use --force to overwrite)", output).into());
            }
            SchemaConfig::default().save(&output)?;
            println!("✅ Wrote default configuration to {}", output);
        }

        Commands::Validate { config } => {
            let cfg = SchemaConfig::load_from(config.as_deref())?;
            let models = cfg.models_path();

            if cfg.models.extensions.is_empty() {
                return Err("models.extensions is empty, no model documents would be loaded".into());
            }
            if !models.is_dir() {
                println!("⚠️  Models directory {} does not exist", models.display());
            }
            println!("✅ Configuration is valid");
        }
    }

    Ok(())
}

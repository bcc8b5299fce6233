//! Command-line interface for rowbind
//!
//! # Usage Examples
//!
//! ## Map
//! ```bash
//! # Bind every row of a CSV file onto a schema-defined record
//! rowbind map \
//!   --schema person.yaml \
//!   --input people.csv \
//!   --profile mapping.yaml
//!
//! # Headerless, semicolon separated input with "NULL" cells
//! rowbind map --schema person.yaml --input data.csv \
//!   --no-headers --columns OperatorId,FirstName,SurName \
//!   --delimiter ';' --null-marker NULL
//! ```
//!
//! ## Fields
//! ```bash
//! rowbind fields --schema person.yaml
//! ```
//!
//! Set `RUST_LOG=bind_core=debug` to trace how each column is bound.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rowbind::{list_fields, map_rows, MapArgs, RecordSchema};

#[derive(Parser)]
#[command(name = "rowbind")]
#[command(about = "Bind CSV rows onto typed records and print them as JSON")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map CSV rows onto records of a schema (one JSON object per line)
    Map {
        #[command(flatten)]
        args: MapArgs,
    },

    /// List the fields of a record schema
    Fields {
        /// Record schema (YAML)
        #[arg(long, value_name = "PATH")]
        schema: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Map { args } => {
            let stdout = std::io::stdout();
            map_rows(&args, stdout.lock())?;
        }
        Commands::Fields { schema } => {
            let schema = RecordSchema::from_file(&schema)
                .with_context(|| format!("Failed to load record schema from {schema:?}"))?;
            list_fields(&schema, std::io::stdout().lock())?;
        }
    }

    Ok(())
}

//! The `map` and `fields` commands.

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bind_core::{Binder, MappingConfig, MappingProfile};
use clap::Parser;
use rowbind_csv_source::{Config, CsvRecordSource};
use tracing::{debug, info};

use crate::schema::RecordSchema;

/// Options of `rowbind map`
#[derive(Parser, Debug, Clone)]
pub struct MapArgs {
    /// Record schema (YAML)
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// CSV input file, or "-" for stdin
    #[arg(long, default_value = "-")]
    pub input: String,

    /// Mapping profile (YAML)
    #[arg(long, value_name = "PATH", env = "ROWBIND_PROFILE")]
    pub profile: Option<PathBuf>,

    /// CSV delimiter character
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Cell content read as null (default: empty cell)
    #[arg(long, default_value_t)]
    pub null_marker: String,

    /// The CSV input has no header row
    #[arg(long)]
    pub no_headers: bool,

    /// Column names, used instead of the header row (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Fallback name transformation (format: 'pattern=replacement')
    #[arg(long, value_name = "RULE")]
    pub name_transform: Option<String>,

    /// Skip columns that do not match any field
    #[arg(long)]
    pub ignore_unmapped: bool,
}

impl MapArgs {
    /// The mapping configuration: the profile, if any, then the command-line
    /// switches on top.
    pub fn mapping_config(&self) -> Result<MappingConfig> {
        let mut config = match &self.profile {
            Some(path) => MappingProfile::from_file(path)
                .and_then(MappingProfile::into_config)
                .with_context(|| format!("Failed to load mapping profile {path:?}"))?,
            None => MappingConfig::new(),
        };

        if let Some(rule) = &self.name_transform {
            let (pattern, replacement) = parse_name_transform(rule)?;
            config.set_name_transformation(pattern, replacement);
        }
        if self.ignore_unmapped {
            config.set_ignore_unmapped(true);
        }
        Ok(config)
    }

    /// CSV reader options.
    pub fn csv_config(&self) -> Result<Config> {
        let delimiter = u8::try_from(self.delimiter).map_err(|_| {
            anyhow::anyhow!(
                "Delimiter must be a single-byte character, got '{}'",
                self.delimiter
            )
        })?;

        Ok(Config {
            has_headers: !self.no_headers,
            delimiter,
            column_names: (!self.columns.is_empty()).then(|| self.columns.clone()),
            null_marker: self.null_marker.clone(),
        })
    }

    fn open_input(&self) -> Result<Box<dyn Read>> {
        if self.input == "-" {
            return Ok(Box::new(std::io::stdin()));
        }
        let file = File::open(&self.input)
            .with_context(|| format!("Failed to open CSV input {}", self.input))?;
        Ok(Box::new(file))
    }
}

/// Split a `pattern=replacement` name transformation.
pub fn parse_name_transform(rule: &str) -> Result<(String, String)> {
    let Some((pattern, replacement)) = rule.split_once('=') else {
        anyhow::bail!("Invalid name transformation '{rule}': expected 'pattern=replacement'");
    };
    if pattern.is_empty() {
        anyhow::bail!("Invalid name transformation '{rule}': pattern is empty");
    }
    Ok((pattern.to_string(), replacement.to_string()))
}

/// Map every CSV row onto a record of the schema and write it to `out` as
/// one JSON object per line. Stops at the first row that fails.
///
/// Returns the number of rows written.
pub fn map_rows<W: Write>(args: &MapArgs, mut out: W) -> Result<usize> {
    let schema = RecordSchema::from_file(&args.schema)?;
    let config = args.mapping_config()?;
    let source = CsvRecordSource::new(args.open_input()?, args.csv_config()?)?;

    info!("Mapping CSV from {} onto record '{}'", args.input, schema.name);
    debug!("Mapping rules: {:?}", config.rules());

    let template = schema.new_record();
    let mut binder = Binder::with_field_table(source, schema.field_table(), move || {
        template.clone()
    })
    .with_config(config);

    let mut count = 0;
    while binder.source_mut().advance()? {
        let row = binder.source().row_number();
        let record = binder
            .build()
            .with_context(|| format!("Failed to map CSV row {row}"))?;
        serde_json::to_writer(&mut out, &record).context("Failed to write record")?;
        writeln!(out)?;
        count += 1;
    }
    out.flush()?;

    info!("Mapped {count} rows");
    Ok(count)
}

/// Write the field directory of a schema, one `name<TAB>type` line per field.
pub fn list_fields<W: Write>(schema: &RecordSchema, mut out: W) -> Result<()> {
    for field in schema.field_table().fields() {
        writeln!(out, "{}\t{}", field.name(), field.declared_type())?;
    }
    Ok(())
}

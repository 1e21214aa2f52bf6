//! `gridyn decode`: decode one file and report what came out of it.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use gridyn_core::{IssueSummary, ValidationIssue};
use gridyn_cli::{DecodeArgs, GridynConfig, OutputFormat};
use gridyn_io::{DecodeResult, DecodedRecords, Format};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use super::load_schemas;

#[derive(Serialize)]
struct DecodeReport<'a> {
    source: &'a str,
    used_schemas: bool,
    total_records: usize,
    models: Vec<ModelReport<'a>>,
    issues: &'a [ValidationIssue],
    summary: IssueSummary,
}

#[derive(Serialize)]
struct ModelReport<'a> {
    name: &'a str,
    records: usize,
    #[serde(flatten)]
    data: &'a DecodedRecords,
}

impl<'a> DecodeReport<'a> {
    fn new(result: &'a DecodeResult<'_>) -> Self {
        Self {
            source: &result.source,
            used_schemas: result.used_schemas(),
            total_records: result.total_records(),
            models: result
                .models
                .iter()
                .map(|(name, data)| ModelReport {
                    name,
                    records: data.len(),
                    data,
                })
                .collect(),
            issues: &result.issues,
            summary: result.issue_summary(),
        }
    }
}

pub fn handle(args: &DecodeArgs, config: &GridynConfig) -> Result<()> {
    let registry = load_schemas(args.schemas.as_deref(), config)?;
    let options = config.decode_options();

    let result = Format::decode(&args.input, registry.as_ref(), &options)
        .with_context(|| format!("decoding '{}'", args.input.display()))?;
    info!(
        models = result.models.len(),
        records = result.total_records(),
        issues = result.issues.len(),
        "decode finished"
    );

    match args.format {
        OutputFormat::Summary => print_summary(&result)?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&DecodeReport::new(&result))?;
            println!("{json}");
        }
    }

    if (args.strict || config.core.strict) && result.has_issues() {
        bail!(
            "{} validation issue(s) reported in strict mode",
            result.issues.len()
        );
    }
    Ok(())
}

/// Number of fields: schema columns, or the widest indexed row.
fn field_count(records: &DecodedRecords) -> usize {
    match records {
        DecodedRecords::Named { columns, .. } => columns.num_columns(),
        DecodedRecords::Indexed { rows, .. } => rows.iter().map(Vec::len).max().unwrap_or(0),
    }
}

fn print_summary(result: &DecodeResult<'_>) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "Source: {}", result.source)?;
    writeln!(
        writer,
        "Schemas: {}",
        result
            .registry
            .map_or("none (indexed fallback)".to_string(), |r| format!(
                "{} loaded",
                r.len()
            ))
    )?;
    writeln!(writer)?;

    writeln!(writer, "MODEL\tKIND\tCATEGORY\tRECORDS\tFIELDS\tISSUES")?;
    for (name, records) in &result.models {
        let (kind, category) = match records {
            DecodedRecords::Named { category, .. } if !category.is_empty() => {
                ("named", category.as_str())
            }
            DecodedRecords::Named { .. } => ("named", "-"),
            DecodedRecords::Indexed { .. } => ("indexed", "-"),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            name,
            kind,
            category,
            records.len(),
            field_count(records),
            result.issues_for(name).count()
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Total records: {}", result.total_records())?;

    if result.has_issues() {
        writeln!(writer, "Issues:")?;
        for issue in &result.issues {
            writeln!(writer, "  {}", issue)?;
        }
    } else {
        writeln!(writer, "Issues: none")?;
    }
    writer.flush()?;
    Ok(())
}

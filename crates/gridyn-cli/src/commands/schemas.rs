use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gridyn_cli::{GridynConfig, SchemaCommands};
use tabwriter::TabWriter;

use super::require_schemas;

pub fn handle(command: &SchemaCommands, config: &GridynConfig) -> Result<()> {
    match command {
        SchemaCommands::List { schemas, category } => {
            handle_list(schemas.as_deref(), category.as_deref(), config)
        }
        SchemaCommands::Show { model, schemas } => handle_show(model, schemas.as_deref(), config),
    }
}

fn handle_list(
    schemas: Option<&Path>,
    category: Option<&str>,
    config: &GridynConfig,
) -> Result<()> {
    let registry = require_schemas(schemas, config)?;

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "MODEL\tCATEGORY\tFIELDS\tLINES\tDESCRIPTION")?;
    for model in registry
        .models()
        .filter(|m| category.map_or(true, |c| m.category() == c))
    {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            model.name(),
            model.category(),
            model.fields().len(),
            model.line_count().unwrap_or(1),
            model.description()
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn handle_show(model: &str, schemas: Option<&Path>, config: &GridynConfig) -> Result<()> {
    let registry = require_schemas(schemas, config)?;
    let schema = registry
        .get(model)
        .with_context(|| format!("no schema for model '{}'", model))?;

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "Model: {}", schema.name())?;
    if !schema.description().is_empty() {
        writeln!(writer, "Description: {}", schema.description())?;
    }
    writeln!(
        writer,
        "Model name position: {}  Lines: {}  Terminator: {}",
        schema.model_name_field(),
        schema.line_count().unwrap_or(1),
        schema.terminator()
    )?;
    writeln!(writer)?;

    writeln!(writer, "POS\tNAME\tTYPE\tREQUIRED\tDEFAULT\tRANGE\tUNIT")?;
    for field in schema.fields() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            field.position(),
            field.name(),
            field.field_type(),
            if field.is_required() { "yes" } else { "no" },
            field.default().map_or("-".to_string(), ToString::to_string),
            field.range().map_or("-".to_string(), ToString::to_string),
            field.unit()
        )?;
    }
    writer.flush()?;
    Ok(())
}

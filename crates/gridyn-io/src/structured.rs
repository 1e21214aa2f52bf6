//! TOML (structured keyed) decoding.
//!
//! The document maps model names to arrays of tables, one table per record:
//!
//! ```toml
//! [[GENCLS]]
//! BUS = 1
//! ID = "1"
//! H = 5.0
//! D = 0.0
//! ```
//!
//! Top-level entries that are not arrays are metadata and are skipped.
//! Record fields are looked up by name and coerced from their native TOML
//! types; keys the schema does not declare are reported with a warning.

use std::path::Path;

use gridyn_core::{
    ConversionError, FieldSchema, GridynError, GridynResult, ModelSchema, RawValue,
    SchemaRegistry, Value,
};
use tracing::{debug, info, warn};

use crate::coerce::coerce_dynamic;
use crate::decoder::RecordFormat;
use crate::helpers::{read_source, DecodeOptions};
use crate::result::{decode_groups, DecodeResult};

/// One record: field entries in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredRecord {
    pub entries: Vec<(String, RawValue)>,
}

impl StructuredRecord {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values ordered by key name.
    pub fn values_by_sorted_key(&self) -> Vec<RawValue> {
        let mut entries: Vec<&(String, RawValue)> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, v)| v.clone()).collect()
    }
}

impl From<toml::Table> for StructuredRecord {
    fn from(table: toml::Table) -> Self {
        Self {
            entries: table
                .into_iter()
                .map(|(k, v)| (k, raw_from_toml(v)))
                .collect(),
        }
    }
}

/// Convert a TOML value into the closed [`RawValue`] set.
///
/// Arrays become lists. Nested tables become lists of their values so they
/// never pass as a scalar. Datetimes keep their TOML text.
pub fn raw_from_toml(value: toml::Value) -> RawValue {
    match value {
        toml::Value::String(s) => RawValue::Text(s),
        toml::Value::Integer(i) => RawValue::Integer(i),
        toml::Value::Float(f) => RawValue::Float(f),
        toml::Value::Boolean(b) => RawValue::Boolean(b),
        toml::Value::Datetime(dt) => RawValue::Text(dt.to_string()),
        toml::Value::Array(items) => RawValue::List(items.into_iter().map(raw_from_toml).collect()),
        toml::Value::Table(table) => {
            RawValue::List(table.into_iter().map(|(_, v)| raw_from_toml(v)).collect())
        }
    }
}

/// Keyed extraction and dynamic coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl RecordFormat for TomlFormat {
    type Record = StructuredRecord;
    type Raw = RawValue;

    fn extract<'r>(
        &self,
        record: &'r StructuredRecord,
        field: &FieldSchema,
    ) -> Option<&'r RawValue> {
        record.get(field.name())
    }

    fn convert(&self, field: &FieldSchema, raw: &RawValue) -> Result<Value, ConversionError> {
        coerce_dynamic(field.field_type(), raw)
    }

    fn check_unknown_fields(&self, schema: &ModelSchema, record: &StructuredRecord, index: usize) {
        for key in record.keys().filter(|k| !schema.has_field(k)) {
            warn!(
                model = schema.name(),
                record = index,
                field = key,
                "ignoring field not declared by the model schema"
            );
        }
    }
}

/// Frame a TOML document into per-model record groups.
///
/// Fails only when the document is not valid TOML.
pub fn frame_toml(text: &str) -> GridynResult<Vec<(String, Vec<StructuredRecord>)>> {
    let document: toml::Table = text
        .parse()
        .map_err(|e: toml::de::Error| GridynError::Parse(e.to_string()))?;

    let mut groups = Vec::new();
    for (name, value) in document {
        let toml::Value::Array(items) = value else {
            debug!(entry = name.as_str(), "skipping non-array top-level entry");
            continue;
        };
        let records: Vec<StructuredRecord> = items
            .into_iter()
            .filter_map(|item| match item {
                toml::Value::Table(table) => Some(StructuredRecord::from(table)),
                other => {
                    debug!(
                        model = name.as_str(),
                        kind = other.type_str(),
                        "skipping non-table array element"
                    );
                    None
                }
            })
            .collect();
        if !records.is_empty() {
            groups.push((name, records));
        }
    }
    Ok(groups)
}

/// Decode a TOML document.
pub fn decode_toml_str<'r>(
    text: &str,
    source: &str,
    registry: Option<&'r SchemaRegistry>,
) -> GridynResult<DecodeResult<'r>> {
    let groups = frame_toml(text).map_err(|e| match e {
        GridynError::Parse(msg) => GridynError::Parse(format!("{}: {}", source, msg)),
        other => other,
    })?;

    let result = decode_groups(
        source,
        registry,
        groups,
        &TomlFormat,
        StructuredRecord::values_by_sorted_key,
    );

    info!(
        source,
        models = result.models.len(),
        records = result.total_records(),
        issues = result.issues.len(),
        "decoded TOML source"
    );
    Ok(result)
}

/// Read and decode a TOML file, applying the size guard first.
pub fn decode_toml<'r>(
    path: &Path,
    registry: Option<&'r SchemaRegistry>,
    options: &DecodeOptions,
) -> GridynResult<DecodeResult<'r>> {
    let text = read_source(path, options)?;
    decode_toml_str(&text, &path.display().to_string(), registry)
}

//! PSS/E DYR (legacy positional) decoding.
//!
//! Records are framed by [`lexer::frame_records`], attributed to a model by
//! their quoted model-name token, grouped by model, and decoded positionally
//! against the model's schema. Models without a schema keep their raw tokens.
//!
//! ```
//! use gridyn_core::{FieldSchema, FieldType, ModelSchema, SchemaRegistry, Value};
//! use gridyn_io::dyr::decode_dyr_str;
//!
//! let gencls = ModelSchema::new(
//!     "GENCLS",
//!     vec![
//!         FieldSchema::new("BUS", 1, FieldType::Integer),
//!         FieldSchema::new("ID", 3, FieldType::Text),
//!         FieldSchema::new("H", 4, FieldType::Float),
//!         FieldSchema::new("D", 5, FieldType::Float),
//!     ],
//! )?;
//! let registry = SchemaRegistry::from_models([gencls]);
//!
//! let result = decode_dyr_str("1 'GENCLS' 1 5.0 0.0 /", "inline", Some(&registry));
//! let columns = result.model("GENCLS").and_then(|m| m.columns()).unwrap();
//! assert_eq!(columns.value("H", 0), Some(Value::Float(5.0)));
//! assert!(result.issues.is_empty());
//! # Ok::<(), gridyn_core::GridynError>(())
//! ```

pub mod lexer;

use std::collections::BTreeSet;
use std::path::Path;

use gridyn_core::{
    ConversionError, FieldSchema, GridynResult, RawValue, SchemaRegistry, Value,
    DEFAULT_MODEL_NAME_FIELD, DEFAULT_TERMINATOR,
};
use tracing::{debug, info};

use crate::coerce::{coerce_text, strip_quotes};
use crate::decoder::RecordFormat;
use crate::helpers::{read_source, DecodeOptions};
use crate::result::{decode_groups, group_by_model, DecodeResult};

pub use lexer::{frame_records, tokenize, DyrRecord};

/// Positional extraction and text-token coercion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DyrFormat;

impl RecordFormat for DyrFormat {
    type Record = DyrRecord;
    type Raw = str;

    fn extract<'r>(&self, record: &'r DyrRecord, field: &FieldSchema) -> Option<&'r str> {
        record.token(field.position())
    }

    fn convert(&self, field: &FieldSchema, raw: &str) -> Result<Value, ConversionError> {
        coerce_text(field.field_type(), raw)
    }
}

/// Quoted model name at a 1-based token position, without its quotes.
pub fn model_name_at(record: &DyrRecord, position: usize) -> Option<String> {
    let token = record.token(position)?;
    let name = strip_quotes(token);
    if name.len() == token.len() || name.trim().is_empty() {
        return None;
    }
    Some(name.trim().to_string())
}

/// Attribute a record to a model, or `None` if it has no recognizable name.
///
/// Positions declared by schemas in the registry are tried first, and only
/// accepted for a model the registry knows at that position. Otherwise the
/// quoted token at the default position names the model.
fn identify_model(record: &DyrRecord, registry: Option<&SchemaRegistry>) -> Option<String> {
    if record.tokens.len() < 3 {
        return None;
    }

    if let Some(registry) = registry {
        let positions: BTreeSet<usize> = registry
            .models()
            .map(|m| m.model_name_field())
            .filter(|p| *p != DEFAULT_MODEL_NAME_FIELD)
            .collect();
        let declared = positions.into_iter().find_map(|position| {
            model_name_at(record, position).filter(|name| {
                registry
                    .get(name)
                    .is_some_and(|m| m.model_name_field() == position)
            })
        });
        if declared.is_some() {
            return declared;
        }
    }

    model_name_at(record, DEFAULT_MODEL_NAME_FIELD)
}

/// Decode DYR text.
///
/// `source` labels the result (a path or a synthetic name). Without a
/// registry every model takes the indexed fallback path.
pub fn decode_dyr_str<'r>(
    text: &str,
    source: &str,
    registry: Option<&'r SchemaRegistry>,
) -> DecodeResult<'r> {
    let framed = frame_records(text, DEFAULT_TERMINATOR);
    let total = framed.len();

    let attributed = framed.into_iter().filter_map(|record| {
        let name = identify_model(&record, registry);
        if name.is_none() {
            debug!(
                line = record.line,
                "dropping DYR record without a quoted model name"
            );
        }
        name.map(|n| (n, record))
    });
    let groups = group_by_model(attributed);

    if let Some(registry) = registry {
        for (name, records) in &groups {
            let Some(expected) = registry.get(name).and_then(|m| m.line_count()) else {
                continue;
            };
            for record in records.iter().filter(|r| r.line_span != expected) {
                debug!(
                    model = name.as_str(),
                    line = record.line,
                    expected,
                    actual = record.line_span,
                    "DYR record spans an unexpected number of lines"
                );
            }
        }
    }

    let result = decode_groups(source, registry, groups, &DyrFormat, |record| {
        record
            .tokens
            .iter()
            .map(|t| RawValue::Text(t.clone()))
            .collect()
    });

    info!(
        source,
        framed = total,
        models = result.models.len(),
        records = result.total_records(),
        issues = result.issues.len(),
        "decoded DYR source"
    );
    result
}

/// Read and decode a DYR file.
pub fn decode_dyr<'r>(
    path: &Path,
    registry: Option<&'r SchemaRegistry>,
    options: &DecodeOptions,
) -> GridynResult<DecodeResult<'r>> {
    let text = read_source(path, options)?;
    Ok(decode_dyr_str(
        &text,
        &path.display().to_string(),
        registry,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridyn_core::{Cell, FieldRange, FieldType, IssueKind, ModelSchema};

    use crate::result::DecodedRecords;

    fn registry() -> SchemaRegistry {
        let gencls = ModelSchema::new(
            "GENCLS",
            vec![
                FieldSchema::new("BUS", 1, FieldType::Integer).required(true),
                FieldSchema::new("ID", 3, FieldType::Text),
                FieldSchema::new("H", 4, FieldType::Float)
                    .with_range(FieldRange::at_least(0.0).unwrap())
                    .unwrap(),
                FieldSchema::new("D", 5, FieldType::Float),
                FieldSchema::new("EXTRA", 6, FieldType::Float)
                    .with_default(Value::Float(1.0))
                    .unwrap(),
            ],
        )
        .unwrap()
        .with_category("generator");
        let shifted = ModelSchema::new(
            "CUSTOM",
            vec![FieldSchema::new("BUS", 1, FieldType::Integer)],
        )
        .unwrap()
        .with_model_name_field(3);
        SchemaRegistry::from_models([gencls, shifted])
    }

    #[test]
    fn decodes_named_records() {
        let registry = registry();
        let result = decode_dyr_str(
            "1 'GENCLS' 1 5.0 0.0 /\n2 'GENCLS' '2' 4.0 0.5 2.0 /",
            "test",
            Some(&registry),
        );

        assert!(result.issues.is_empty());
        let columns = result.model("GENCLS").and_then(|m| m.columns()).unwrap();
        assert_eq!(columns.num_records(), 2);
        assert_eq!(columns.value("BUS", 1), Some(Value::Integer(2)));
        assert_eq!(columns.value("ID", 1), Some(Value::Text("2".into())));
        assert_eq!(columns.value("EXTRA", 0), Some(Value::Float(1.0)));
        assert_eq!(columns.value("EXTRA", 1), Some(Value::Float(2.0)));
        match result.model("GENCLS").unwrap() {
            DecodedRecords::Named { category, .. } => assert_eq!(category, "generator"),
            other => panic!("expected named records, got {:?}", other),
        }
    }

    #[test]
    fn drops_records_without_model_name() {
        let registry = registry();
        let result = decode_dyr_str(
            "1 GENCLS 1 5.0 /\n1 'GENCLS' /\n1 'GENCLS' 1 5.0 0.0 /",
            "test",
            Some(&registry),
        );
        assert_eq!(result.model("GENCLS").unwrap().len(), 1);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn model_name_at_nondefault_position() {
        let registry = registry();
        let result = decode_dyr_str("7 X 'CUSTOM' 1.0 /", "test", Some(&registry));
        let columns = result.model("CUSTOM").and_then(|m| m.columns()).unwrap();
        assert_eq!(columns.value("BUS", 0), Some(Value::Integer(7)));

        // Unknown models are only recognized at the default position
        let unknown = decode_dyr_str("7 X 'OTHER' 1.0 /", "test", Some(&registry));
        assert!(unknown.models.is_empty());
    }

    #[test]
    fn declared_position_wins_over_quoted_default() {
        let registry = registry();
        let result = decode_dyr_str("7 '1' 'CUSTOM' 1.0 /", "test", Some(&registry));
        assert_eq!(result.model_names().collect::<Vec<_>>(), vec!["CUSTOM"]);
        let columns = result.model("CUSTOM").and_then(|m| m.columns()).unwrap();
        assert_eq!(columns.value("BUS", 0), Some(Value::Integer(7)));
    }

    #[test]
    fn stray_quote_does_not_swallow_next_record() {
        let registry = registry();
        let result = decode_dyr_str(
            "1 'GENCLS 1 5.0 0.0 /\n2 'GENCLS' 1 3.0 0.0 /\n",
            "test",
            Some(&registry),
        );
        assert_eq!(result.model_names().collect::<Vec<_>>(), vec!["GENCLS"]);
        let columns = result.model("GENCLS").and_then(|m| m.columns()).unwrap();
        assert_eq!(columns.num_records(), 1);
        assert_eq!(columns.value("BUS", 0), Some(Value::Integer(2)));
        assert_eq!(columns.value("H", 0), Some(Value::Float(3.0)));
    }

    #[test]
    fn parse_failure_and_out_of_range_recorded() {
        let registry = registry();
        let result = decode_dyr_str("x 'GENCLS' 1 -2.0 abc /", "test", Some(&registry));

        let kinds: Vec<_> = result
            .issues
            .iter()
            .map(|i| (i.field_name.as_str(), i.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("BUS", IssueKind::ParseError),
                ("H", IssueKind::OutOfRange),
                ("D", IssueKind::ParseError),
            ]
        );
        let columns = result.model("GENCLS").and_then(|m| m.columns()).unwrap();
        assert_eq!(columns.column("BUS").unwrap().get(0), Some(Cell::Missing));
        assert_eq!(columns.value("H", 0), Some(Value::Float(-2.0)));
    }

    #[test]
    fn unknown_model_falls_back_to_indexed() {
        let registry = registry();
        let result = decode_dyr_str("3 'TGOV1' 1 0.05 0.49 /", "test", Some(&registry));
        match result.model("TGOV1").unwrap() {
            DecodedRecords::Indexed { rows, .. } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].len(), 5);
                assert_eq!(rows[0][1], RawValue::Text("'TGOV1'".into()));
            }
            other => panic!("expected indexed records, got {:?}", other),
        }
        assert!(result.registry.is_some());
    }

    #[test]
    fn no_registry_forces_indexed() {
        let result = decode_dyr_str("1 'GENCLS' 1 5.0 0.0 /", "test", None);
        assert!(result.registry.is_none());
        assert!(!result.model("GENCLS").unwrap().is_named());
    }
}

//! Schema-driven record decoding shared by every source format.
//!
//! A source format plugs in through [`RecordFormat`]: it says how to find a
//! field's raw value in one of its records and how to coerce that raw value.
//! [`decode_model`] runs the same per-record, per-field algorithm for all of
//! them:
//!
//! 1. notify the format of the record (unknown-field detection)
//! 2. for each field in schema order, extract, coerce and range-check
//! 3. fall back to the field default, or the missing marker, when needed
//! 4. pack each field's cells into a [`Column`]
//!
//! Data problems never abort decoding; they are appended to the caller's
//! issue list.

use std::fmt::Display;

use gridyn_core::{
    Cell, Column, ColumnStore, ConversionError, FieldSchema, IssueKind, ModelSchema,
    ValidationIssue, Value,
};
use tracing::debug;

/// How one source format exposes raw field values.
pub trait RecordFormat {
    /// One framed record as produced by the format's framing pass
    type Record;
    /// Raw, not yet coerced field value
    type Raw: Display + ?Sized;

    /// Raw value of `field` in `record`, or `None` when absent.
    fn extract<'r>(&self, record: &'r Self::Record, field: &FieldSchema) -> Option<&'r Self::Raw>;

    /// Coerce a raw value into the field's declared type.
    fn convert(&self, field: &FieldSchema, raw: &Self::Raw) -> Result<Value, ConversionError>;

    /// Called once per record before its fields are decoded. Side effects
    /// only; it cannot change what gets decoded.
    fn check_unknown_fields(&self, _schema: &ModelSchema, _record: &Self::Record, _index: usize) {}
}

/// Decode every record of one model into columns, appending issues.
///
/// `records` must all belong to `schema`'s model. Issues are appended
/// per record, then per field in schema order; `record_index` is 1-based.
pub fn decode_model<F: RecordFormat>(
    schema: &ModelSchema,
    records: &[F::Record],
    format: &F,
    issues: &mut Vec<ValidationIssue>,
) -> ColumnStore {
    let fields = schema.fields();
    let mut cells: Vec<Vec<Cell>> = fields
        .iter()
        .map(|_| Vec::with_capacity(records.len()))
        .collect();
    let issues_before = issues.len();

    for (offset, record) in records.iter().enumerate() {
        let index = offset + 1;
        format.check_unknown_fields(schema, record, index);

        for (field, column) in fields.iter().zip(cells.iter_mut()) {
            let cell = decode_field(schema, field, record, index, format, issues);
            column.push(cell);
        }
    }

    let mut store = ColumnStore::new(records.len());
    for (field, column) in fields.iter().zip(cells) {
        store.push(field.name(), Column::from_cells(field.field_type(), column));
    }

    debug!(
        model = schema.name(),
        records = records.len(),
        missing = store.iter().map(|(_, c)| c.missing_count()).sum::<usize>(),
        issues = issues.len() - issues_before,
        "decoded model records"
    );
    store
}

fn decode_field<F: RecordFormat>(
    schema: &ModelSchema,
    field: &FieldSchema,
    record: &F::Record,
    index: usize,
    format: &F,
    issues: &mut Vec<ValidationIssue>,
) -> Cell {
    let issue = |kind: IssueKind, message: String| {
        ValidationIssue::new(schema.name(), index, field.name(), kind, message)
    };

    let Some(raw) = format.extract(record, field) else {
        return match (field.is_required(), field.default()) {
            (true, None) => {
                issues.push(issue(
                    IssueKind::MissingRequiredNoDefault,
                    format!("required field {} is missing and has no default", field.name()),
                ));
                Cell::Missing
            }
            (true, Some(default)) => {
                issues.push(issue(
                    IssueKind::MissingRequiredWithDefault,
                    format!(
                        "required field {} is missing; using default {}",
                        field.name(),
                        default
                    ),
                ));
                Cell::Present(default.clone())
            }
            (false, default) => Cell::from(default.cloned()),
        };
    };

    match format.convert(field, raw) {
        Ok(value) => {
            if let (Some(range), Some(number)) = (field.range(), value.as_f64()) {
                if !range.contains(number) {
                    issues.push(
                        issue(
                            IssueKind::OutOfRange,
                            format!("{} = {} is outside {}", field.name(), value, range),
                        )
                        .with_offending_value(value.to_string()),
                    );
                }
            }
            Cell::Present(value)
        }
        Err(err) => {
            issues.push(
                issue(
                    IssueKind::ParseError,
                    format!("failed to parse {}: {}", field.name(), err.reason),
                )
                .with_offending_value(raw.to_string()),
            );
            Cell::from(field.default().cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use gridyn_core::{FieldRange, FieldType, Severity};

    use crate::coerce::coerce_text;

    /// Keyed string records, for exercising the algorithm independently of
    /// the real adapters.
    #[derive(Default)]
    struct MapFormat {
        seen: RefCell<Vec<usize>>,
    }

    impl RecordFormat for MapFormat {
        type Record = HashMap<&'static str, &'static str>;
        type Raw = str;

        fn extract<'r>(&self, record: &'r Self::Record, field: &FieldSchema) -> Option<&'r str> {
            record.get(field.name()).copied()
        }

        fn convert(&self, field: &FieldSchema, raw: &str) -> Result<Value, ConversionError> {
            coerce_text(field.field_type(), raw)
        }

        fn check_unknown_fields(&self, _schema: &ModelSchema, _record: &Self::Record, index: usize) {
            self.seen.borrow_mut().push(index);
        }
    }

    fn schema() -> ModelSchema {
        ModelSchema::new(
            "GENCLS",
            vec![
                FieldSchema::new("BUS", 1, FieldType::Integer).required(true),
                FieldSchema::new("ID", 3, FieldType::Text)
                    .required(true)
                    .with_default(Value::Text("1".into()))
                    .unwrap(),
                FieldSchema::new("H", 4, FieldType::Float)
                    .with_range(FieldRange::at_least(0.0).unwrap())
                    .unwrap(),
                FieldSchema::new("D", 5, FieldType::Float)
                    .with_default(Value::Float(0.0))
                    .unwrap(),
            ],
        )
        .unwrap()
    }

    fn record(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn clean_records_produce_dense_columns() {
        let records = vec![
            record(&[("BUS", "1"), ("ID", "'1'"), ("H", "5.0"), ("D", "0.0")]),
            record(&[("BUS", "2"), ("ID", "'2'"), ("H", "3.5"), ("D", "1.0")]),
        ];
        let mut issues = Vec::new();
        let store = decode_model(&schema(), &records, &MapFormat::default(), &mut issues);

        assert!(issues.is_empty());
        assert_eq!(store.num_records(), 2);
        assert_eq!(store.column("BUS"), Some(&Column::Integer(vec![1, 2])));
        assert_eq!(
            store.column("ID"),
            Some(&Column::Text(vec!["1".into(), "2".into()]))
        );
        assert!(store.iter().all(|(_, c)| c.is_dense()));
    }

    #[test]
    fn out_of_range_value_is_kept() {
        let records = vec![record(&[("BUS", "1"), ("ID", "1"), ("H", "-5.0")])];
        let mut issues = Vec::new();
        let store = decode_model(&schema(), &records, &MapFormat::default(), &mut issues);

        assert_eq!(store.value("H", 0), Some(Value::Float(-5.0)));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::OutOfRange);
        assert_eq!(issues[0].field_name, "H");
        assert_eq!(issues[0].offending_value.as_deref(), Some("-5.0"));
    }

    #[test]
    fn parse_error_falls_back_to_default_or_missing() {
        let records = vec![record(&[("BUS", "one"), ("ID", "1"), ("H", "x"), ("D", "y")])];
        let mut issues = Vec::new();
        let store = decode_model(&schema(), &records, &MapFormat::default(), &mut issues);

        let kinds: Vec<_> = issues.iter().map(|i| (i.field_name.as_str(), i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("BUS", IssueKind::ParseError),
                ("H", IssueKind::ParseError),
                ("D", IssueKind::ParseError),
            ]
        );
        assert_eq!(issues[0].offending_value.as_deref(), Some("one"));
        assert_eq!(store.column("BUS").unwrap().get(0), Some(Cell::Missing));
        assert_eq!(store.column("H").unwrap().get(0), Some(Cell::Missing));
        assert_eq!(store.value("D", 0), Some(Value::Float(0.0)));
        // still an error even though D was filled from its default
        assert!(issues.iter().all(|i| i.severity() == Severity::Error));
    }

    #[test]
    fn missing_fields_follow_requiredness() {
        let records = vec![record(&[])];
        let mut issues = Vec::new();
        let store = decode_model(&schema(), &records, &MapFormat::default(), &mut issues);

        let kinds: Vec<_> = issues.iter().map(|i| (i.field_name.as_str(), i.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("BUS", IssueKind::MissingRequiredNoDefault),
                ("ID", IssueKind::MissingRequiredWithDefault),
            ]
        );
        assert_eq!(store.column("BUS").unwrap().get(0), Some(Cell::Missing));
        assert_eq!(store.value("ID", 0), Some(Value::Text("1".into())));
        assert_eq!(store.column("H").unwrap().get(0), Some(Cell::Missing));
        assert_eq!(store.value("D", 0), Some(Value::Float(0.0)));
        assert!(!store.column("BUS").unwrap().is_dense());
        assert!(store.column("D").unwrap().is_dense());
        assert_eq!(store.column("BUS").unwrap().missing_count(), 1);
        assert_eq!(store.column("D").unwrap().missing_count(), 0);
    }

    #[test]
    fn issues_ordered_by_record_then_field() {
        let records = vec![
            record(&[("ID", "1"), ("H", "-1")]),
            record(&[("BUS", "x"), ("ID", "1"), ("H", "-2")]),
        ];
        let mut issues = Vec::new();
        let format = MapFormat::default();
        decode_model(&schema(), &records, &format, &mut issues);

        let order: Vec<_> = issues
            .iter()
            .map(|i| (i.record_index, i.field_name.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "BUS"), (1, "H"), (2, "BUS"), (2, "H")]);
        assert_eq!(*format.seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn no_records_yields_empty_columns() {
        let mut issues = Vec::new();
        let store = decode_model(&schema(), &[], &MapFormat::default(), &mut issues);
        assert_eq!(store.num_records(), 0);
        assert_eq!(store.num_columns(), 4);
        assert!(issues.is_empty());
    }
}

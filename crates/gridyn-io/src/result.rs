//! Decode results and per-model aggregation.

use std::collections::{BTreeMap, HashMap};

use gridyn_core::{
    ColumnStore, IssueSummary, RawValue, SchemaRegistry, Severity, ValidationIssue,
};
use serde::Serialize;

use crate::decoder::{decode_model, RecordFormat};

/// All records decoded for one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedRecords {
    /// Schema-typed columns, one per field
    Named {
        model_name: String,
        category: String,
        columns: ColumnStore,
    },
    /// Raw values per record, used when no schema is known
    Indexed {
        model_name: String,
        rows: Vec<Vec<RawValue>>,
    },
}

impl DecodedRecords {
    pub fn model_name(&self) -> &str {
        match self {
            DecodedRecords::Named { model_name, .. } | DecodedRecords::Indexed { model_name, .. } => {
                model_name
            }
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            DecodedRecords::Named { columns, .. } => columns.num_records(),
            DecodedRecords::Indexed { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, DecodedRecords::Named { .. })
    }

    pub fn columns(&self) -> Option<&ColumnStore> {
        match self {
            DecodedRecords::Named { columns, .. } => Some(columns),
            DecodedRecords::Indexed { .. } => None,
        }
    }

    pub fn rows(&self) -> Option<&[Vec<RawValue>]> {
        match self {
            DecodedRecords::Indexed { rows, .. } => Some(rows),
            DecodedRecords::Named { .. } => None,
        }
    }
}

/// Output of one decode call.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeResult<'r> {
    /// Path or synthetic label of the decoded source
    pub source: String,
    pub models: BTreeMap<String, DecodedRecords>,
    /// Registry used for decoding; `None` when every model took the indexed path
    #[serde(skip)]
    pub registry: Option<&'r SchemaRegistry>,
    pub issues: Vec<ValidationIssue>,
}

impl<'r> DecodeResult<'r> {
    pub fn new(source: impl Into<String>, registry: Option<&'r SchemaRegistry>) -> Self {
        Self {
            source: source.into(),
            models: BTreeMap::new(),
            registry,
            issues: Vec::new(),
        }
    }

    pub fn model(&self, name: &str) -> Option<&DecodedRecords> {
        self.models.get(name)
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn total_records(&self) -> usize {
        self.models.values().map(DecodedRecords::len).sum()
    }

    pub fn used_schemas(&self) -> bool {
        self.registry.is_some()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn issue_summary(&self) -> IssueSummary {
        IssueSummary::from_issues(&self.issues)
    }

    pub fn issues_for<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.model_name == model)
    }
}

/// Group records by model name, keeping first-seen model order and the
/// input order of records within each model.
pub fn group_by_model<R>(records: impl IntoIterator<Item = (String, R)>) -> Vec<(String, Vec<R>)> {
    let mut groups: Vec<(String, Vec<R>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for (name, record) in records {
        match slots.get(&name) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                slots.insert(name.clone(), groups.len());
                groups.push((name, vec![record]));
            }
        }
    }
    groups
}

/// Decode grouped records into a [`DecodeResult`].
///
/// Groups with a schema in `registry` go through [`decode_model`]; the rest
/// are stored as indexed rows built by `index`. Empty groups are skipped.
pub(crate) fn decode_groups<'r, F, I>(
    source: &str,
    registry: Option<&'r SchemaRegistry>,
    groups: Vec<(String, Vec<F::Record>)>,
    format: &F,
    index: I,
) -> DecodeResult<'r>
where
    F: RecordFormat,
    I: Fn(&F::Record) -> Vec<RawValue>,
{
    let mut result = DecodeResult::new(source, registry);

    for (name, records) in groups {
        if records.is_empty() {
            continue;
        }
        let decoded = match registry.and_then(|r| r.get(&name)) {
            Some(schema) => DecodedRecords::Named {
                model_name: name.clone(),
                category: schema.category().to_string(),
                columns: decode_model(schema, &records, format, &mut result.issues),
            },
            None => DecodedRecords::Indexed {
                model_name: name.clone(),
                rows: records.iter().map(&index).collect(),
            },
        };
        result.models.insert(name, decoded);
    }

    result
}

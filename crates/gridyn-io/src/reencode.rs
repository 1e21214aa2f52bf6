//! Re-encode decoded records as a TOML document.
//!
//! Named records become one table per record with fields in schema order;
//! missing cells are left out so they decode as missing again. Indexed
//! records become tables keyed `field_1`, `field_2`, ... in their stored
//! order. Models are written in name order.

use gridyn_core::{
    Cell, ColumnStore, GridynError, GridynResult, ModelSchema, RawValue, SchemaRegistry, Value,
};

use crate::result::{DecodeResult, DecodedRecords};

/// Render `result` as TOML text.
///
/// `registry` overrides the result's own registry when choosing field order.
pub fn reencode(result: &DecodeResult<'_>, registry: Option<&SchemaRegistry>) -> GridynResult<String> {
    let registry = registry.or(result.registry);
    let mut document = toml::Table::new();

    for (name, records) in &result.models {
        let tables = match records {
            DecodedRecords::Named { columns, .. } => {
                let schema = registry.and_then(|r| r.get(name));
                named_tables(columns, schema)
            }
            DecodedRecords::Indexed { rows, .. } => rows.iter().map(|row| indexed_table(row)).collect(),
        };
        document.insert(
            name.clone(),
            toml::Value::Array(tables.into_iter().map(toml::Value::Table).collect()),
        );
    }

    toml::to_string(&document).map_err(|e| GridynError::Serialization(e.to_string()))
}

fn field_order<'a>(columns: &'a ColumnStore, schema: Option<&'a ModelSchema>) -> Vec<&'a str> {
    let Some(schema) = schema else {
        return columns.column_names().collect();
    };
    let mut order: Vec<&str> = schema
        .field_names()
        .filter(|n| columns.column(n).is_some())
        .collect();
    order.extend(columns.column_names().filter(|n| !schema.has_field(n)));
    order
}

fn named_tables(columns: &ColumnStore, schema: Option<&ModelSchema>) -> Vec<toml::Table> {
    let order = field_order(columns, schema);
    (0..columns.num_records())
        .map(|index| {
            let mut table = toml::Table::new();
            for name in &order {
                let cell = columns.column(name).and_then(|c| c.get(index));
                if let Some(Cell::Present(value)) = cell {
                    table.insert(name.to_string(), value_to_toml(&value));
                }
            }
            table
        })
        .collect()
}

fn indexed_table(row: &[RawValue]) -> toml::Table {
    row.iter()
        .enumerate()
        .map(|(i, value)| (format!("field_{}", i + 1), raw_to_toml(value)))
        .collect()
}

fn value_to_toml(value: &Value) -> toml::Value {
    match value {
        Value::Integer(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::Text(s) => toml::Value::String(s.clone()),
        Value::Boolean(b) => toml::Value::Boolean(*b),
    }
}

fn raw_to_toml(value: &RawValue) -> toml::Value {
    match value {
        RawValue::Integer(i) => toml::Value::Integer(*i),
        RawValue::Float(f) => toml::Value::Float(*f),
        RawValue::Text(s) => toml::Value::String(s.clone()),
        RawValue::Boolean(b) => toml::Value::Boolean(*b),
        RawValue::List(items) => toml::Value::Array(items.iter().map(raw_to_toml).collect()),
    }
}

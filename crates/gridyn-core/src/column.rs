//! Column-oriented record storage.
//!
//! A [`Column`] holds one field's values across all records of a model. When
//! every cell is present and of the declared type the column is stored as a
//! dense primitive vector; otherwise it keeps per-cell [`Cell`]s so a missing
//! marker is never confused with a legitimate default.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::schema::FieldType;
use crate::value::{Cell, Value};

/// One field's values for every record of a model.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
    Boolean(Vec<bool>),
    /// Typed-or-missing cells
    Sparse {
        field_type: FieldType,
        cells: Vec<Cell>,
    },
}

impl Column {
    /// Build a column, choosing the dense form when every cell is a present
    /// value of `field_type`.
    pub fn from_cells(field_type: FieldType, cells: Vec<Cell>) -> Self {
        let dense = cells
            .iter()
            .all(|c| c.value().is_some_and(|v| v.field_type() == field_type));
        if !dense {
            return Column::Sparse { field_type, cells };
        }

        let values = cells.into_iter().filter_map(Cell::into_value);
        match field_type {
            FieldType::Integer => Column::Integer(
                values
                    .filter_map(|v| match v {
                        Value::Integer(i) => Some(i),
                        _ => None,
                    })
                    .collect(),
            ),
            FieldType::Float => Column::Float(
                values
                    .filter_map(|v| match v {
                        Value::Float(x) => Some(x),
                        _ => None,
                    })
                    .collect(),
            ),
            FieldType::Text => Column::Text(
                values
                    .filter_map(|v| match v {
                        Value::Text(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            FieldType::Boolean => Column::Boolean(
                values
                    .filter_map(|v| match v {
                        Value::Boolean(b) => Some(b),
                        _ => None,
                    })
                    .collect(),
            ),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            Column::Integer(_) => FieldType::Integer,
            Column::Float(_) => FieldType::Float,
            Column::Text(_) => FieldType::Text,
            Column::Boolean(_) => FieldType::Boolean,
            Column::Sparse { field_type, .. } => *field_type,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Integer(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Boolean(v) => v.len(),
            Column::Sparse { cells, .. } => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dense(&self) -> bool {
        !matches!(self, Column::Sparse { .. })
    }

    /// Cell at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<Cell> {
        let value = match self {
            Column::Integer(v) => Value::Integer(*v.get(index)?),
            Column::Float(v) => Value::Float(*v.get(index)?),
            Column::Text(v) => Value::Text(v.get(index)?.clone()),
            Column::Boolean(v) => Value::Boolean(*v.get(index)?),
            Column::Sparse { cells, .. } => return cells.get(index).cloned(),
        };
        Some(Cell::Present(value))
    }

    /// Present value at `index`; missing cells and out-of-bounds are `None`.
    pub fn value(&self, index: usize) -> Option<Value> {
        self.get(index).and_then(Cell::into_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Sparse { cells, .. } => cells.iter().filter(|c| c.is_missing()).count(),
            _ => 0,
        }
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Named columns of equal length, in schema field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStore {
    columns: Vec<(String, Column)>,
    num_records: usize,
}

impl ColumnStore {
    pub fn new(num_records: usize) -> Self {
        Self {
            columns: Vec::new(),
            num_records,
        }
    }

    /// Append a column. Panics in debug builds if its length disagrees with
    /// the store's record count.
    pub fn push(&mut self, name: impl Into<String>, column: Column) {
        debug_assert_eq!(column.len(), self.num_records, "column length mismatch");
        self.columns.push((name.into(), column));
    }

    pub fn num_records(&self) -> usize {
        self.num_records
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Present value of `field` in record `index` (0-based).
    pub fn value(&self, field: &str, index: usize) -> Option<Value> {
        self.column(field)?.value(index)
    }

    /// Row view: every column's cell for record `index` (0-based).
    pub fn row(&self, index: usize) -> Option<Vec<(&str, Cell)>> {
        if index >= self.num_records {
            return None;
        }
        self.columns
            .iter()
            .map(|(n, c)| c.get(index).map(|cell| (n.as_str(), cell)))
            .collect()
    }
}

impl Serialize for ColumnStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, column) in &self.columns {
            map.serialize_entry(name, column)?;
        }
        map.end()
    }
}

impl fmt::Display for ColumnStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records x {} columns",
            self.num_records,
            self.columns.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_when_all_present() {
        let col = Column::from_cells(
            FieldType::Float,
            vec![
                Cell::Present(Value::Float(1.0)),
                Cell::Present(Value::Float(2.5)),
            ],
        );
        assert_eq!(col, Column::Float(vec![1.0, 2.5]));
        assert!(col.is_dense());
        assert_eq!(col.value(1), Some(Value::Float(2.5)));
        assert_eq!(col.get(2), None);
    }

    #[test]
    fn sparse_when_any_missing() {
        let col = Column::from_cells(
            FieldType::Integer,
            vec![Cell::Present(Value::Integer(1)), Cell::Missing],
        );
        assert!(!col.is_dense());
        assert_eq!(col.field_type(), FieldType::Integer);
        assert_eq!(col.missing_count(), 1);
        assert_eq!(col.get(1), Some(Cell::Missing));
        assert_eq!(col.value(1), None);
    }

    #[test]
    fn sparse_when_type_mismatched() {
        let col = Column::from_cells(FieldType::Float, vec![Cell::Present(Value::Integer(1))]);
        assert!(!col.is_dense());
    }

    #[test]
    fn empty_column_is_dense() {
        let col = Column::from_cells(FieldType::Text, Vec::new());
        assert_eq!(col, Column::Text(Vec::new()));
        assert!(col.is_empty());
    }

    #[test]
    fn store_rows_and_serialization() {
        let mut store = ColumnStore::new(2);
        store.push("BUS", Column::Integer(vec![1, 2]));
        store.push(
            "H",
            Column::from_cells(
                FieldType::Float,
                vec![Cell::Missing, Cell::Present(Value::Float(3.0))],
            ),
        );

        assert_eq!(store.column_names().collect::<Vec<_>>(), vec!["BUS", "H"]);
        assert_eq!(store.value("BUS", 1), Some(Value::Integer(2)));
        let row = store.row(0).unwrap();
        assert_eq!(row[1], ("H", Cell::Missing));
        assert!(store.row(2).is_none());

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"BUS":[1,2],"H":[null,3.0]}"#);
    }
}

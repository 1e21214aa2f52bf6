//! Arrow export for decoded records
//!
//! Named records map onto a [`RecordBatch`] with one array per schema field:
//!
//! | Field type | Arrow type |
//! |------------|------------|
//! | integer    | Int64      |
//! | float      | Float64    |
//! | text       | Utf8       |
//! | boolean    | Boolean    |
//!
//! Missing cells become nulls, and a field is nullable only when its column
//! is sparse. Indexed records export as all-Utf8 `field_1..field_n` columns.
//! Batches can be written as an Arrow IPC stream for other tools to load.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, StructArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use gridyn_core::{Cell, Column, ColumnStore, FieldType, GridynError, GridynResult, RawValue, Value};

use crate::result::DecodedRecords;

fn arrow_type(field_type: FieldType) -> DataType {
    match field_type {
        FieldType::Integer => DataType::Int64,
        FieldType::Float => DataType::Float64,
        FieldType::Text => DataType::Utf8,
        FieldType::Boolean => DataType::Boolean,
    }
}

fn column_to_array(column: &Column) -> ArrayRef {
    match column {
        Column::Integer(v) => Arc::new(Int64Array::from(v.clone())),
        Column::Float(v) => Arc::new(Float64Array::from(v.clone())),
        Column::Text(v) => Arc::new(StringArray::from(v.clone())),
        Column::Boolean(v) => Arc::new(BooleanArray::from(v.clone())),
        Column::Sparse { field_type, cells } => {
            let values = cells.iter().map(|c| match c {
                Cell::Present(v) => Some(v),
                Cell::Missing => None,
            });
            match field_type {
                FieldType::Integer => Arc::new(
                    values
                        .map(|v| match v {
                            Some(Value::Integer(i)) => Some(*i),
                            _ => None,
                        })
                        .collect::<Int64Array>(),
                ),
                FieldType::Float => Arc::new(
                    values
                        .map(|v| v.and_then(Value::as_f64))
                        .collect::<Float64Array>(),
                ),
                FieldType::Text => Arc::new(
                    values
                        .map(|v| v.and_then(Value::as_str))
                        .collect::<StringArray>(),
                ),
                FieldType::Boolean => Arc::new(
                    values
                        .map(|v| match v {
                            Some(Value::Boolean(b)) => Some(*b),
                            _ => None,
                        })
                        .collect::<BooleanArray>(),
                ),
            }
        }
    }
}

fn build_batch(schema: Schema, arrays: Vec<ArrayRef>, rows: usize) -> GridynResult<RecordBatch> {
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    RecordBatch::try_new_with_options(Arc::new(schema), arrays, &options)
        .map_err(|e| GridynError::Serialization(format!("building Arrow batch: {}", e)))
}

/// Convert one model's columns to a record batch.
pub fn named_records_to_batch(model: &str, columns: &ColumnStore) -> GridynResult<RecordBatch> {
    let mut fields = Vec::with_capacity(columns.num_columns());
    let mut arrays = Vec::with_capacity(columns.num_columns());
    for (name, column) in columns.iter() {
        fields.push(Field::new(
            name,
            arrow_type(column.field_type()),
            !column.is_dense(),
        ));
        arrays.push(column_to_array(column));
    }

    let schema = Schema::new(fields).with_metadata(
        [("model".to_string(), model.to_string())]
            .into_iter()
            .collect(),
    );
    build_batch(schema, arrays, columns.num_records())
}

/// Convert fallback rows to a batch of text columns.
///
/// Rows shorter than the widest row are padded with nulls.
pub fn indexed_records_to_batch(model: &str, rows: &[Vec<RawValue>]) -> GridynResult<RecordBatch> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut fields = Vec::with_capacity(width);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(width);
    for position in 0..width {
        let values: StringArray = rows
            .iter()
            .map(|row| row.get(position).map(|v| v.to_string()))
            .collect();
        fields.push(Field::new(
            format!("field_{}", position + 1),
            DataType::Utf8,
            values.null_count() > 0,
        ));
        arrays.push(Arc::new(values));
    }

    let schema = Schema::new(fields).with_metadata(
        [("model".to_string(), model.to_string())]
            .into_iter()
            .collect(),
    );
    build_batch(schema, arrays, rows.len())
}

/// Convert either kind of decoded records.
pub fn records_to_batch(records: &DecodedRecords) -> GridynResult<RecordBatch> {
    match records {
        DecodedRecords::Named {
            model_name,
            columns,
            ..
        } => named_records_to_batch(model_name, columns),
        DecodedRecords::Indexed { model_name, rows } => indexed_records_to_batch(model_name, rows),
    }
}

/// Wrap a batch as a single struct array, one child per field.
pub fn to_struct_array(batch: RecordBatch) -> StructArray {
    StructArray::from(batch)
}

/// Serialize a batch as an Arrow IPC stream.
pub fn write_ipc_stream(batch: &RecordBatch) -> GridynResult<Vec<u8>> {
    let to_err = |e: arrow::error::ArrowError| {
        GridynError::Serialization(format!("writing Arrow IPC stream: {}", e))
    };

    let mut buf = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buf, &batch.schema()).map_err(to_err)?;
        writer.write(batch).map_err(to_err)?;
        writer.finish().map_err(to_err)?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::ipc::reader::StreamReader;

    fn sample_columns() -> ColumnStore {
        let mut columns = ColumnStore::new(3);
        columns.push("BUS", Column::Integer(vec![1, 2, 3]));
        columns.push(
            "H",
            Column::from_cells(
                FieldType::Float,
                vec![
                    Cell::Present(Value::Float(5.0)),
                    Cell::Missing,
                    Cell::Present(Value::Float(3.5)),
                ],
            ),
        );
        columns.push("ID", Column::Text(vec!["1".into(), "1".into(), "2".into()]));
        columns
    }

    #[test]
    fn named_batch_types_and_nulls() {
        let batch = named_records_to_batch("GENCLS", &sample_columns()).unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 3);

        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(!schema.field(0).is_nullable());
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert!(schema.field(1).is_nullable());
        assert_eq!(schema.metadata().get("model").map(String::as_str), Some("GENCLS"));

        let h = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(h.value(0), 5.0);
        assert!(h.is_null(1));
    }

    #[test]
    fn indexed_batch_pads_short_rows() {
        let rows = vec![
            vec![RawValue::Text("1".into()), RawValue::Text("'TGOV1'".into())],
            vec![
                RawValue::Text("2".into()),
                RawValue::Text("'TGOV1'".into()),
                RawValue::Text("0.05".into()),
            ],
        ];
        let batch = indexed_records_to_batch("TGOV1", &rows).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 3);
        assert!(!batch.schema().field(0).is_nullable());
        assert!(batch.schema().field(2).is_nullable());
        assert!(batch.column(2).is_null(0));
    }

    #[test]
    fn empty_store_keeps_row_count() {
        let batch = named_records_to_batch("EMPTY", &ColumnStore::new(2)).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 0);
    }

    #[test]
    fn struct_array_and_ipc_stream() {
        let batch = named_records_to_batch("GENCLS", &sample_columns()).unwrap();

        let bytes = write_ipc_stream(&batch).unwrap();
        let reader = StreamReader::try_new(std::io::Cursor::new(bytes), None).unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 3);

        let array = to_struct_array(batch);
        assert_eq!(array.len(), 3);
        assert_eq!(array.num_columns(), 3);
    }
}

// src/process/infer.rs

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Narrowest type every non-null value in `values` parses as.
///
/// Returns `None` when the column holds no values at all.
pub fn infer_column_type(values: &StringArray) -> Option<DataType> {
    let mut non_null = values.iter().flatten().peekable();
    non_null.peek()?;

    let (mut int, mut float, mut boolean) = (true, true, true);
    for v in non_null {
        int = int && v.parse::<i64>().is_ok();
        float = float && parse_float(v).is_some();
        boolean = boolean && parse_bool(v).is_some();
        if !(int || float || boolean) {
            return Some(DataType::Utf8);
        }
    }

    Some(if int {
        DataType::Int64
    } else if float {
        DataType::Float64
    } else if boolean {
        DataType::Boolean
    } else {
        DataType::Utf8
    })
}

/// Words like "nan" or "inf" stay text; a number needs at least one digit.
fn parse_float(s: &str) -> Option<f64> {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A batch converted to inferred types.
#[derive(Debug, Clone)]
pub struct TypedBatch {
    pub batch: RecordBatch,
    /// Indices of columns that held no values and defaulted to Utf8.
    pub all_null: Vec<usize>,
}

/// Convert every Utf8 column of a cleaned batch to its inferred type.
/// Non-Utf8 columns are kept as they are. All output fields are nullable.
pub fn apply_inferred_types(batch: &RecordBatch) -> Result<TypedBatch, ArrowError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());
    let mut all_null = Vec::new();

    for (idx, (field, column)) in schema.fields().iter().zip(batch.columns()).enumerate() {
        let typed: ArrayRef = match column.data_type() {
            DataType::Utf8 => {
                let text = column.as_string::<i32>();
                match infer_column_type(text) {
                    None => {
                        all_null.push(idx);
                        column.clone()
                    }
                    Some(DataType::Int64) => Arc::new(
                        text.iter()
                            .map(|v| v.and_then(|s| s.parse::<i64>().ok()))
                            .collect::<Int64Array>(),
                    ),
                    Some(DataType::Float64) => Arc::new(
                        text.iter()
                            .map(|v| v.and_then(parse_float))
                            .collect::<Float64Array>(),
                    ),
                    Some(DataType::Boolean) => Arc::new(
                        text.iter()
                            .map(|v| v.and_then(parse_bool))
                            .collect::<BooleanArray>(),
                    ),
                    Some(_) => column.clone(),
                }
            }
            _ => {
                if column.null_count() == column.len() {
                    all_null.push(idx);
                }
                column.clone()
            }
        };
        fields.push(Field::new(field.name(), typed.data_type().clone(), true));
        columns.push(typed);
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(TypedBatch {
        batch: RecordBatch::try_new(schema, columns)?,
        all_null,
    })
}

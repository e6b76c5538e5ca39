// src/process/schema.rs

use crate::error::ConvertError;
use crate::process::infer::TypedBatch;
use arrow::array::{new_null_array, Array, ArrayRef};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// What to do when a later batch infers a different type than the file schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Reject the batch.
    #[default]
    Strict,
    /// Cast the column to the file type; fail only on values that do not fit.
    Permissive,
}

impl FromStr for SchemaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SchemaPolicy::Strict),
            "permissive" => Ok(SchemaPolicy::Permissive),
            other => Err(format!("expected \"strict\" or \"permissive\", got {:?}", other)),
        }
    }
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPolicy::Strict => f.write_str("strict"),
            SchemaPolicy::Permissive => f.write_str("permissive"),
        }
    }
}

/// Fit batch number `batch_idx` to the schema fixed by the first batch.
///
/// Column names and count must match under every policy. Columns that held
/// no values become null arrays of the file type.
pub fn conform_batch(
    file_schema: &SchemaRef,
    typed: TypedBatch,
    batch_idx: usize,
    policy: SchemaPolicy,
) -> Result<RecordBatch, ConvertError> {
    let batch_schema = typed.batch.schema();
    if batch_schema.fields().len() != file_schema.fields().len() {
        return Err(ConvertError::SchemaMismatch {
            batch: batch_idx,
            detail: format!(
                "{} columns, file has {}",
                batch_schema.fields().len(),
                file_schema.fields().len()
            ),
        });
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(file_schema.fields().len());
    for (idx, (want, column)) in file_schema
        .fields()
        .iter()
        .zip(typed.batch.columns())
        .enumerate()
    {
        let have = batch_schema.field(idx);
        if have.name() != want.name() {
            return Err(ConvertError::SchemaMismatch {
                batch: batch_idx,
                detail: format!("column {} is {:?}, file has {:?}", idx, have.name(), want.name()),
            });
        }

        if column.data_type() == want.data_type() {
            columns.push(column.clone());
        } else if typed.all_null.contains(&idx) || column.null_count() == column.len() {
            columns.push(new_null_array(want.data_type(), column.len()));
        } else {
            match policy {
                SchemaPolicy::Strict => {
                    return Err(ConvertError::ColumnTypeMismatch {
                        batch: batch_idx,
                        column: want.name().clone(),
                        expected: want.data_type().clone(),
                        found: column.data_type().clone(),
                    })
                }
                SchemaPolicy::Permissive => {
                    let opts = CastOptions {
                        safe: false,
                        ..Default::default()
                    };
                    let cast = cast_with_options(column, want.data_type(), &opts).map_err(|e| {
                        ConvertError::SchemaMismatch {
                            batch: batch_idx,
                            detail: format!(
                                "cannot cast column {:?} from {} to {}: {}",
                                want.name(),
                                column.data_type(),
                                want.data_type(),
                                e
                            ),
                        }
                    })?;
                    columns.push(cast);
                }
            }
        }
    }

    Ok(RecordBatch::try_new(file_schema.clone(), columns)?)
}

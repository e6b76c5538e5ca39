// src/process/clean.rs

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, LargeStringArray, StringArray};
use arrow::compute::filter_record_batch;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use std::collections::HashSet;
use std::sync::Arc;

/// Literal cell values that mean "no value".
pub const NULL_SENTINELS: [&str; 5] = ["", "NULL", "null", "N/A", "NA"];

pub fn is_null_sentinel(value: &str) -> bool {
    NULL_SENTINELS.contains(&value)
}

/// Output of [`clean_batch`].
#[derive(Debug, Clone)]
pub struct CleanedBatch {
    pub batch: RecordBatch,
    pub duplicates_removed: usize,
}

/// Clean one batch:
/// 1. trim column names,
/// 2. trim text values,
/// 3. turn sentinel strings into nulls,
/// 4. drop rows repeating an earlier row of this batch (first one wins).
///
/// Duplicates are only looked for inside `batch`, and compare values as they
/// are typed in `batch`. Text that parses to equal values (`1.0` and `1.00`)
/// only collapses once the batch has been typed; see [`drop_duplicate_rows`].
pub fn clean_batch(batch: &RecordBatch) -> Result<CleanedBatch, ArrowError> {
    drop_duplicate_rows(&normalize_text(batch)?)
}

/// Steps 1-3 of [`clean_batch`]: trim names and text, sentinels become null.
pub fn normalize_text(batch: &RecordBatch) -> Result<RecordBatch, ArrowError> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name().trim();
        let (cleaned, nullable) = match column.data_type() {
            DataType::Utf8 => (Arc::new(clean_text(column.as_string::<i32>())) as ArrayRef, true),
            DataType::LargeUtf8 => (
                Arc::new(clean_large_text(column.as_string::<i64>())) as ArrayRef,
                true,
            ),
            _ => (column.clone(), field.is_nullable()),
        };
        fields.push(
            Field::new(name, cleaned.data_type().clone(), nullable)
                .with_metadata(field.metadata().clone()),
        );
        columns.push(cleaned);
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    RecordBatch::try_new(schema, columns)
}

fn clean_text(values: &StringArray) -> StringArray {
    values
        .iter()
        .map(|v| v.map(str::trim).filter(|v| !is_null_sentinel(v)))
        .collect()
}

fn clean_large_text(values: &LargeStringArray) -> LargeStringArray {
    values
        .iter()
        .map(|v| v.map(str::trim).filter(|v| !is_null_sentinel(v)))
        .collect()
}

/// Keep the first occurrence of every distinct row. Nulls compare equal.
pub fn drop_duplicate_rows(batch: &RecordBatch) -> Result<CleanedBatch, ArrowError> {
    if batch.num_rows() < 2 || batch.num_columns() == 0 {
        return Ok(CleanedBatch {
            batch: batch.clone(),
            duplicates_removed: 0,
        });
    }

    let sort_fields = batch
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(sort_fields)?;
    let rows = converter.convert_columns(batch.columns())?;

    let mut seen = HashSet::with_capacity(rows.num_rows());
    let keep: BooleanArray = rows.iter().map(|row| Some(seen.insert(row))).collect();
    let duplicates_removed = keep.len() - keep.true_count();

    if duplicates_removed == 0 {
        return Ok(CleanedBatch {
            batch: batch.clone(),
            duplicates_removed,
        });
    }

    Ok(CleanedBatch {
        batch: filter_record_batch(batch, &keep)?,
        duplicates_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array};

    fn text_batch(names: &[&str], cols: Vec<Vec<Option<&str>>>) -> RecordBatch {
        let fields: Vec<Field> = names
            .iter()
            .map(|n| Field::new(*n, DataType::Utf8, true))
            .collect();
        let arrays: Vec<ArrayRef> = cols
            .into_iter()
            .map(|c| Arc::new(StringArray::from(c)) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    fn strings(batch: &RecordBatch, i: usize) -> Vec<Option<String>> {
        batch
            .column(i)
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn trims_column_names() {
        let batch = text_batch(&["  artist", "title \t"], vec![vec![Some("a")], vec![Some("b")]]);
        let out = clean_batch(&batch).unwrap().batch;
        let names: Vec<_> = out.schema().fields().iter().map(|f| f.name().clone()).collect();
        assert_eq!(names, vec!["artist", "title"]);
    }

    #[test]
    fn trims_text_values() {
        let batch = text_batch(&["a"], vec![vec![Some("  x "), Some("\ty\t"), Some("z")]]);
        let out = clean_batch(&batch).unwrap().batch;
        assert_eq!(
            strings(&out, 0),
            vec![Some("x".into()), Some("y".into()), Some("z".into())]
        );
    }

    #[test]
    fn sentinels_become_null() {
        let batch = text_batch(
            &["a"],
            vec![vec![
                Some(""),
                Some("NULL"),
                Some("null"),
                Some(" N/A "),
                Some("NA"),
                Some("Null"),
                Some("n/a"),
                None,
            ]],
        );
        let cleaned = clean_batch(&batch).unwrap();
        // the batch collapses to one null row plus the two non-sentinels
        assert_eq!(cleaned.duplicates_removed, 5);
        assert_eq!(
            strings(&cleaned.batch, 0),
            vec![None, Some("Null".into()), Some("n/a".into())]
        );
    }

    #[test]
    fn drops_exact_duplicates_keeping_first() {
        let batch = text_batch(
            &["a", "b"],
            vec![
                vec![Some("1"), Some("1"), Some("2"), Some("1"), Some("2")],
                vec![Some(" x "), Some("x"), Some("y"), Some("z"), Some("y")],
            ],
        );
        let cleaned = clean_batch(&batch).unwrap();
        assert_eq!(cleaned.duplicates_removed, 2);
        assert_eq!(
            strings(&cleaned.batch, 0),
            vec![Some("1".into()), Some("2".into()), Some("1".into())]
        );
        assert_eq!(
            strings(&cleaned.batch, 1),
            vec![Some("x".into()), Some("y".into()), Some("z".into())]
        );
    }

    #[test]
    fn removed_count_matches_distinct_rows() {
        let batch = text_batch(
            &["a"],
            vec![vec![Some("p"), Some("q"), Some("p"), Some("p"), Some("r"), Some("q")]],
        );
        let cleaned = clean_batch(&batch).unwrap();
        assert_eq!(cleaned.batch.num_rows(), 3);
        assert_eq!(cleaned.duplicates_removed, batch.num_rows() - 3);
    }

    #[test]
    fn rows_with_different_nulls_are_distinct() {
        let batch = text_batch(
            &["a", "b"],
            vec![vec![Some("1"), Some("1")], vec![None, Some("NULLX")]],
        );
        let cleaned = clean_batch(&batch).unwrap();
        assert_eq!(cleaned.duplicates_removed, 0);
    }

    #[test]
    fn typed_values_compare_by_value() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("score", DataType::Float64, true),
            Field::new("n", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![Some(1.0), Some(1.0), None, None])) as ArrayRef,
                Arc::new(Int64Array::from(vec![Some(1), Some(1), None, Some(2)])) as ArrayRef,
            ],
        )
        .unwrap();
        let cleaned = drop_duplicate_rows(&batch).unwrap();
        assert_eq!(cleaned.duplicates_removed, 1);
        assert_eq!(cleaned.batch.num_rows(), 3);
    }

    #[test]
    fn normalize_text_keeps_repeated_rows() {
        let batch = text_batch(&["a"], vec![vec![Some(" x"), Some("x ")]]);
        let out = normalize_text(&batch).unwrap();
        assert_eq!(strings(&out, 0), vec![Some("x".into()), Some("x".into())]);
    }

    #[test]
    fn non_text_columns_pass_through() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(" n ", DataType::Int64, false),
            Field::new("s", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
                Arc::new(StringArray::from(vec!["NA", " v "])) as ArrayRef,
            ],
        )
        .unwrap();
        let out = clean_batch(&batch).unwrap().batch;
        assert_eq!(out.schema().field(0).name(), "n");
        assert_eq!(out.schema().field(0).data_type(), &DataType::Int64);
        assert!(out.schema().field(1).is_nullable());
        assert_eq!(strings(&out, 1), vec![None, Some("v".into())]);
    }

    #[test]
    fn empty_batch_is_untouched() {
        let batch = text_batch(&["a"], vec![vec![]]);
        let cleaned = clean_batch(&batch).unwrap();
        assert_eq!(cleaned.batch.num_rows(), 0);
        assert_eq!(cleaned.duplicates_removed, 0);
    }
}

// src/process/convert.rs

use crate::error::ConvertError;
use crate::process::clean::{drop_duplicate_rows, normalize_text};
use crate::process::events::{EventSink, IngestEvent, LogSink};
use crate::process::infer::{apply_inferred_types, TypedBatch};
use crate::process::read::CsvBatchReader;
use crate::process::schema::{conform_batch, SchemaPolicy};
use crate::process::sniff::{sniff_delimiter, Delimiter};
use crate::process::DEFAULT_BATCH_SIZE;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Maximum rows read, cleaned and written together.
    pub batch_size: usize,
    pub schema_policy: SchemaPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            schema_policy: SchemaPolicy::default(),
        }
    }
}

/// Totals for one converted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub delimiter: Delimiter,
    /// Rows written to the Parquet file, after cleaning.
    pub rows_written: u64,
    /// Batches written, one row group each.
    pub batches: usize,
    pub duplicates_removed: u64,
    /// Malformed rows dropped while reading.
    pub rows_skipped: u64,
}

/// Owns the destination writer once the first batch has fixed the schema.
struct ParquetSink {
    path: PathBuf,
    writer: Option<(ArrowWriter<File>, SchemaRef)>,
    props: WriterProperties,
}

impl ParquetSink {
    /// Row groups are capped at `batch_size` so each batch stays one group.
    fn new(path: &Path, batch_size: usize) -> Self {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_max_row_group_size(batch_size.max(1))
            .build();
        Self {
            path: path.to_path_buf(),
            writer: None,
            props,
        }
    }

    fn schema(&self) -> Option<&SchemaRef> {
        self.writer.as_ref().map(|(_, schema)| schema)
    }

    /// Write `batch` as its own row group, creating the file on first use.
    fn write(&mut self, batch: &RecordBatch) -> Result<(), ConvertError> {
        if self.writer.is_none() {
            let file = File::create(&self.path).map_err(|e| ConvertError::io(&self.path, e))?;
            let schema = batch.schema();
            let writer = ArrowWriter::try_new(file, schema.clone(), Some(self.props.clone()))?;
            debug!(path = %self.path.display(), "opened parquet writer");
            self.writer = Some((writer, schema));
        }
        if let Some((writer, _)) = self.writer.as_mut() {
            writer.write(batch)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Close the file if anything was written. Returns whether a file exists.
    fn finish(self) -> Result<bool, ConvertError> {
        match self.writer {
            Some((writer, _)) => {
                writer.close()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Convert `source` to a single Parquet file at `destination`, logging events.
pub fn convert_csv_to_parquet(
    source: &Path,
    destination: &Path,
    options: &ConvertOptions,
) -> Result<ConversionReport, ConvertError> {
    convert_with_sink(source, destination, options, &mut LogSink)
}

/// Convert `source` to a single Parquet file at `destination`.
///
/// The delimiter is sniffed from the first line. Each batch has its text
/// cleaned, is typed, loses repeated rows and is appended as one row group.
/// Rows are compared after typing, so `1.0` and `1.00` are the same value. The first batch fixes the file schema and
/// later batches are fitted to it per `options.schema_policy`. Nothing is
/// created when the source has a header but no rows. On error a partially
/// written destination is left in place.
#[instrument(level = "info", skip(source, destination, options, sink), fields(src = %source.display()))]
pub fn convert_with_sink(
    source: &Path,
    destination: &Path,
    options: &ConvertOptions,
    sink: &mut dyn EventSink,
) -> Result<ConversionReport, ConvertError> {
    let start = Instant::now();
    let delimiter = sniff_delimiter(source)?;
    debug!(?delimiter, "sniffed delimiter");

    let file = File::open(source).map_err(|e| ConvertError::io(source, e))?;
    let mut reader = CsvBatchReader::from_reader(file, delimiter, options.batch_size)?
        .ok_or_else(|| ConvertError::EmptyInput {
            path: source.to_path_buf(),
        })?;

    let mut counting = CountingSink {
        inner: sink,
        rows_skipped: 0,
    };
    let mut out = ParquetSink::new(destination, options.batch_size);
    let mut report = ConversionReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        delimiter,
        rows_written: 0,
        batches: 0,
        duplicates_removed: 0,
        rows_skipped: 0,
    };

    while let Some(raw) = reader.next_batch(&mut counting)? {
        let batch_idx = report.batches;
        let typed = apply_inferred_types(&normalize_text(&raw)?)?;
        let deduped = drop_duplicate_rows(&typed.batch)?;
        if deduped.duplicates_removed > 0 {
            counting.emit(IngestEvent::DuplicatesRemoved {
                batch: batch_idx,
                count: deduped.duplicates_removed,
            });
        }

        let typed = TypedBatch {
            batch: deduped.batch,
            all_null: typed.all_null,
        };
        let batch = match out.schema() {
            None => typed.batch,
            Some(file_schema) => {
                conform_batch(file_schema, typed, batch_idx, options.schema_policy)?
            }
        };

        out.write(&batch)?;
        counting.emit(IngestEvent::BatchWritten {
            batch: batch_idx,
            rows: batch.num_rows(),
        });

        report.batches += 1;
        report.rows_written += batch.num_rows() as u64;
        report.duplicates_removed += deduped.duplicates_removed as u64;
    }
    report.rows_skipped = counting.rows_skipped;

    if !out.finish()? {
        debug!("no data rows; nothing written");
    }

    info!(
        rows = report.rows_written,
        batches = report.batches,
        duplicates = report.duplicates_removed,
        skipped = report.rows_skipped,
        elapsed = ?start.elapsed(),
        "converted to parquet"
    );
    Ok(report)
}

/// Passes events through while counting skipped rows.
struct CountingSink<'a> {
    inner: &'a mut dyn EventSink,
    rows_skipped: u64,
}

impl EventSink for CountingSink<'_> {
    fn emit(&mut self, event: IngestEvent) {
        if matches!(event, IngestEvent::RowSkipped { .. }) {
            self.rows_skipped += 1;
        }
        self.inner.emit(event);
    }
}

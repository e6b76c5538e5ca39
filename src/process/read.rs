// src/process/read.rs

use crate::error::ConvertError;
use crate::process::events::{EventSink, IngestEvent};
use crate::process::sniff::Delimiter;
use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use csv::{ByteRecord, ReaderBuilder};
use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Streams a delimited source as all-Utf8 record batches of bounded size.
///
/// Every cell arrives as text; typing happens after cleaning.
pub struct CsvBatchReader<R: Read> {
    reader: csv::Reader<R>,
    schema: SchemaRef,
    batch_size: usize,
    record: ByteRecord,
}

impl<R: Read> CsvBatchReader<R> {
    /// Read the header line. Returns `None` if the source has no header at all.
    pub fn from_reader(
        inner: R,
        delimiter: Delimiter,
        batch_size: usize,
    ) -> Result<Option<Self>, ConvertError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(true)
            .flexible(true)
            .from_reader(inner);

        let raw = reader.byte_headers()?;
        if raw.is_empty() {
            return Ok(None);
        }
        let names = raw
            .iter()
            .map(|h| std::str::from_utf8(h).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConvertError::Encoding { line: 1 })?;
        let names = normalize_headers(names);
        debug!(columns = names.len(), "read header");

        let fields: Vec<Field> = names
            .iter()
            .map(|n| Field::new(n, DataType::Utf8, true))
            .collect();

        Ok(Some(Self {
            reader,
            schema: Arc::new(Schema::new(fields)),
            batch_size: batch_size.max(1),
            record: ByteRecord::new(),
        }))
    }

    /// The all-Utf8 schema every batch from this reader carries.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Read up to `batch_size` well-formed rows. `None` once the source is exhausted.
    ///
    /// Rows with more fields than the header are skipped and reported to `sink`.
    /// Rows with fewer fields are padded with nulls.
    pub fn next_batch(
        &mut self,
        sink: &mut dyn EventSink,
    ) -> Result<Option<RecordBatch>, ConvertError> {
        let width = self.schema.fields().len();
        let mut builders: Vec<StringBuilder> = (0..width).map(|_| StringBuilder::new()).collect();
        let mut rows = 0usize;

        while rows < self.batch_size {
            if !self.reader.read_byte_record(&mut self.record)? {
                break;
            }
            let line = self.record.position().map(|p| p.line()).unwrap_or(0);

            if self.record.len() > width {
                sink.emit(IngestEvent::RowSkipped {
                    line,
                    fields: self.record.len(),
                    expected: width,
                });
                continue;
            }

            let values = self
                .record
                .iter()
                .map(std::str::from_utf8)
                .collect::<Result<Vec<&str>, _>>()
                .map_err(|_| ConvertError::Encoding { line })?;

            for (i, builder) in builders.iter_mut().enumerate() {
                match values.get(i) {
                    Some(v) => builder.append_value(v),
                    None => builder.append_null(),
                }
            }
            rows += 1;
        }

        if rows == 0 {
            return Ok(None);
        }

        let columns: Vec<ArrayRef> = builders
            .into_iter()
            .map(|mut b| Arc::new(b.finish()) as ArrayRef)
            .collect();
        Ok(Some(RecordBatch::try_new(self.schema.clone(), columns)?))
    }
}

/// Name blank headers `Unnamed: <index>` and suffix repeats with `.1`, `.2`, ...
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 0;
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{}.{}", base, n);
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

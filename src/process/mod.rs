// src/process/mod.rs

pub mod clean;
pub mod convert;
pub mod events;
pub mod infer;
pub mod read;
pub mod schema;
pub mod sniff;

pub use clean::{clean_batch, drop_duplicate_rows, normalize_text, CleanedBatch};
pub use convert::{convert_csv_to_parquet, convert_with_sink, ConversionReport, ConvertOptions};
pub use events::{EventSink, IngestEvent, LogSink};
pub use schema::SchemaPolicy;
pub use sniff::{sniff_delimiter, Delimiter};

/// Rows per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

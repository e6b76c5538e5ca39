// src/error.rs

use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the settings read at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Every mandatory variable that was unset or empty, in declaration order.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Anything that can abort a CSV → Parquet conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no header line")]
    EmptyInput { path: PathBuf },

    #[error("invalid UTF-8 on line {line}")]
    Encoding { line: u64 },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("batch {batch}: {detail}")]
    SchemaMismatch { batch: usize, detail: String },

    #[error("batch {batch}: column {column:?} expected {expected}, found {found}")]
    ColumnTypeMismatch {
        batch: usize,
        column: String,
        expected: DataType,
        found: DataType,
    },

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Parquet(#[from] ParquetError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

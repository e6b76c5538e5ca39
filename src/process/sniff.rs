// src/process/sniff.rs

use crate::error::ConvertError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Field separator used for a whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    /// Tab if the line contains one, comma otherwise.
    pub fn from_first_line(line: &[u8]) -> Self {
        if line.contains(&b'\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }
}

/// Peek at the first line of `path` and pick the delimiter for the file.
pub fn sniff_delimiter(path: &Path) -> Result<Delimiter, ConvertError> {
    let file = File::open(path).map_err(|e| ConvertError::io(path, e))?;
    let mut first_line = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut first_line)
        .map_err(|e| ConvertError::io(path, e))?;
    Ok(Delimiter::from_first_line(&first_line))
}

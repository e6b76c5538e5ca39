// src/discover.rs

use anyhow::{anyhow, Context, Result};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions picked up when `LOCAL_DATA_PATH` is a directory.
const SOURCE_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Subdirectory of the data directory that receives Parquet output.
pub const OUTPUT_DIR: &str = "parquet";

/// One source file and where its Parquet goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Work out which files to convert.
///
/// A file converts to `<stem>.parquet` beside it. A directory converts every
/// delimited file directly inside it into `<dir>/parquet/`, sorted by path.
pub fn plan_conversions(data_path: &Path) -> Result<Vec<Conversion>> {
    if data_path.is_file() {
        let destination = data_path.with_extension("parquet");
        return Ok(vec![Conversion {
            source: data_path.to_path_buf(),
            destination,
        }]);
    }
    if !data_path.is_dir() {
        return Err(anyhow!("{} does not exist", data_path.display()));
    }

    let out_dir = data_path.join(OUTPUT_DIR);
    let mut sources = Vec::new();
    for ext in SOURCE_EXTENSIONS {
        let pattern = format!("{}/*.{}", glob::Pattern::escape(&data_path.to_string_lossy()), ext);
        for entry in glob(&pattern).with_context(|| format!("bad glob pattern {}", pattern))? {
            let path = entry.context("reading data directory")?;
            if path.is_file() {
                sources.push(path);
            }
        }
    }
    sources.sort();

    if !sources.is_empty() {
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    }

    Ok(sources
        .into_iter()
        .map(|source| {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let destination = out_dir.join(format!("{}.parquet", stem));
            Conversion {
                source,
                destination,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn single_file_converts_beside_itself() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("streams.csv");
        fs::write(&src, "a\n1\n").unwrap();

        let plan = plan_conversions(&src).unwrap();
        assert_eq!(
            plan,
            vec![Conversion {
                source: src.clone(),
                destination: dir.path().join("streams.parquet"),
            }]
        );
    }

    #[test]
    fn directory_collects_delimited_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.tsv", "a.csv", "c.txt", "notes.md"] {
            fs::write(dir.path().join(name), "a\n1\n").unwrap();
        }

        let plan = plan_conversions(dir.path()).unwrap();
        let names: Vec<_> = plan
            .iter()
            .map(|c| c.source.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.tsv", "c.txt"]);
        assert_eq!(
            plan[0].destination,
            dir.path().join(OUTPUT_DIR).join("a.parquet")
        );
        assert!(dir.path().join(OUTPUT_DIR).is_dir());
    }

    #[test]
    fn dotted_stems_keep_every_part() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("charts.2024.csv"), "a\n1\n").unwrap();

        let plan = plan_conversions(dir.path()).unwrap();
        assert_eq!(
            plan[0].destination,
            dir.path().join(OUTPUT_DIR).join("charts.2024.parquet")
        );
    }

    #[test]
    fn empty_directory_plans_nothing() {
        let dir = tempdir().unwrap();
        assert!(plan_conversions(dir.path()).unwrap().is_empty());
        assert!(!dir.path().join(OUTPUT_DIR).exists());
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(plan_conversions(&dir.path().join("gone")).is_err());
    }
}

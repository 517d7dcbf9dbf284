//! CSV artifacts: raw series, processed indicators, and the summary table.
//!
//! Layout:
//! - `{raw_dir}/{name}.csv`        columns `date,value`
//! - `{processed_dir}/{name}.csv`  `date,value,pct_change` | `date,value,rebased_100` |
//!   `date,value_ripte,value_ipc,real_wage,real_wage_yoy`
//! - `{docs_dir}/series_summary.csv`
//!
//! Dates are written as `YYYY-MM-DD`, numbers in shortest round-trip form,
//! missing cells empty. Output depends only on the data, never on the clock,
//! so identical inputs give byte-identical files. Writes are atomic: write to
//! `.tmp`, then rename into place.

use econtrends_core::domain::{PctChangeRow, RealWageRow, RebasedRow, TidySeries};
use econtrends_core::transform::SummaryTable;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::PipelineConfig;

pub const SUMMARY_FILE: &str = "series_summary.csv";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode CSV for {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },
}

// ─── Artifact map ───────────────────────────────────────────────────

/// Artifact key → written path, in the order artifacts were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactMap {
    entries: Vec<(String, PathBuf)>,
}

impl ArtifactMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path; re-inserting a key replaces its path in place.
    pub fn insert(&mut self, key: impl Into<String>, path: PathBuf) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((key, path)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p.as_path())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// BLAKE3 digest of one artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
    pub key: String,
    pub path: PathBuf,
    pub blake3: String,
}

/// Hash every artifact, in map order.
pub fn digest_artifacts(artifacts: &ArtifactMap) -> Result<Vec<ArtifactDigest>, PersistError> {
    artifacts
        .iter()
        .map(|(key, path)| -> Result<ArtifactDigest, PersistError> {
            Ok(ArtifactDigest {
                key: key.to_string(),
                path: path.to_path_buf(),
                blake3: file_digest(path)?,
            })
        })
        .collect()
}

pub fn file_digest(path: &Path) -> Result<String, PersistError> {
    let bytes = fs::read(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// ─── Store ──────────────────────────────────────────────────────────

/// A processed indicator table ready to be written.
#[derive(Debug, Clone, Copy)]
pub enum ProcessedTable<'a> {
    PctChange(&'a [PctChangeRow]),
    Rebased(&'a [RebasedRow]),
    RealWage(&'a [RealWageRow]),
}

/// Writes artifacts into the three output directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    docs_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(
        raw_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
        docs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
            docs_dir: docs_dir.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.raw_dir, &config.processed_dir, &config.docs_dir)
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    pub fn docs_dir(&self) -> &Path {
        &self.docs_dir
    }

    /// Persist a raw series as `{raw_dir}/{name}.csv`.
    pub fn write_raw(&self, name: &str, series: &TidySeries) -> Result<PathBuf, PersistError> {
        let path = self.raw_dir.join(format!("{name}.csv"));
        let bytes = encode(&path, raw_series_csv(series))?;
        write_atomic(&path, &bytes)?;
        Ok(path)
    }

    /// Persist a derived table as `{processed_dir}/{name}.csv`.
    pub fn write_processed(
        &self,
        name: &str,
        table: ProcessedTable<'_>,
    ) -> Result<PathBuf, PersistError> {
        let path = self.processed_dir.join(format!("{name}.csv"));
        let bytes = match table {
            ProcessedTable::PctChange(rows) => encode(&path, pct_change_csv(rows))?,
            ProcessedTable::Rebased(rows) => encode(&path, rebased_csv(rows))?,
            ProcessedTable::RealWage(rows) => encode(&path, real_wage_csv(rows))?,
        };
        write_atomic(&path, &bytes)?;
        Ok(path)
    }

    /// Persist the summary as `{docs_dir}/series_summary.csv`.
    pub fn write_summary(&self, summary: &SummaryTable) -> Result<PathBuf, PersistError> {
        let path = self.docs_dir.join(SUMMARY_FILE);
        let bytes = encode(&path, summary_csv(summary))?;
        write_atomic(&path, &bytes)?;
        Ok(path)
    }
}

// ─── CSV encoding ───────────────────────────────────────────────────

/// Encode a raw series: `date,value`.
pub fn raw_series_csv(series: &TidySeries) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "value"])?;
    for obs in series {
        wtr.write_record([obs.date.to_string(), fmt_value(obs.value)])?;
    }
    finish(wtr)
}

/// Encode a percentage-change table: `date,value,pct_change`.
pub fn pct_change_csv(rows: &[PctChangeRow]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "value", "pct_change"])?;
    for r in rows {
        wtr.write_record([r.date.to_string(), fmt_value(r.value), fmt_opt(r.pct_change)])?;
    }
    finish(wtr)
}

/// Encode a rebased table: `date,value,rebased_100`.
pub fn rebased_csv(rows: &[RebasedRow]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "value", "rebased_100"])?;
    for r in rows {
        wtr.write_record([r.date.to_string(), fmt_value(r.value), fmt_opt(r.rebased_100)])?;
    }
    finish(wtr)
}

/// Encode a real-wage table: `date,value_ripte,value_ipc,real_wage,real_wage_yoy`.
pub fn real_wage_csv(rows: &[RealWageRow]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "value_ripte", "value_ipc", "real_wage", "real_wage_yoy"])?;
    for r in rows {
        wtr.write_record([
            r.date.to_string(),
            fmt_value(r.value_ripte),
            fmt_opt(r.value_ipc),
            fmt_opt(r.real_wage),
            fmt_opt(r.real_wage_yoy),
        ])?;
    }
    finish(wtr)
}

/// Encode the summary: `date` followed by the table's columns in join order.
pub fn summary_csv(summary: &SummaryTable) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = vec!["date".to_string()];
    header.extend(summary.columns().iter().cloned());
    wtr.write_record(&header)?;

    for row in summary.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.date.to_string());
        record.extend(row.values.iter().map(|v| fmt_opt(*v)));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

/// Shortest representation that parses back to the same `f64`; integral
/// values keep a trailing `.0`. Magnitudes at or above `1e16` or below `1e-4`
/// switch to exponent form (`1e16`, `1e-7`), which CSV readers parse as numbers.
pub fn fmt_value(v: f64) -> String {
    format!("{v:?}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_value).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, csv::Error> {
    wtr.into_inner().map_err(|e| e.into_error().into())
}

fn encode(path: &Path, result: Result<Vec<u8>, csv::Error>) -> Result<Vec<u8>, PersistError> {
    result.map_err(|e| PersistError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write `bytes` to `path`, creating parent directories first.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, bytes).map_err(|source| PersistError::Write {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        PersistError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}

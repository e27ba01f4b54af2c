//! `csvpool split`: route each record of a headed CSV file to
//! `<out_dir>/<value of the routing column>.csv`.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use csvpool_core::config::PoolConfig;
use csvpool_core::types::Row;
use csvpool_pool::{PoolStats, WriterPool};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{}': {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("column '{column}' not found; available: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Config(#[from] csvpool_core::Error),

    #[error(transparent)]
    Pool(#[from] csvpool_pool::Error),
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::UnknownColumn { .. } => vec![
                "Column names are matched exactly, including case".into(),
                "Check --input-delimiter if every header landed in one column".into(),
            ],
            CliError::Config(e) => e.suggestions(),
            CliError::Pool(e) => e.suggestions(),
            _ => vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub rows: u64,
    pub files: usize,
    pub stats: PoolStats,
    pub warnings: usize,
}

/// Fan `input` out across files under `out_dir`, one per distinct value of
/// column `by`, and close every writer before returning.
pub fn split_file(
    config: &PoolConfig,
    input: &Path,
    by: &str,
    out_dir: &Path,
    input_delimiter: u8,
) -> Result<SplitSummary, CliError> {
    let file = File::open(input).map_err(|source| CliError::Input {
        path: input.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(input_delimiter)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let key_idx = headers
        .iter()
        .position(|h| h == by)
        .ok_or_else(|| CliError::UnknownColumn {
            column: by.to_string(),
            available: headers.clone(),
        })?;

    let mut pool = WriterPool::new(config.clone())?;
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut rows = 0u64;

    for rec in rdr.records() {
        let rec = rec?;
        let key = rec.get(key_idx).unwrap_or("");
        let dest = out_dir.join(format!("{}.csv", file_stem_for(key)));

        let row = Row::keyed(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.as_str(), rec.get(i).unwrap_or(""))),
        );
        pool.write(&dest, &row)?;
        seen.insert(dest);
        rows += 1;
    }

    let stats = pool.stats();
    let warnings = pool.take_warnings();
    for w in &warnings {
        tracing::warn!(warning = %w, "eviction warning");
    }
    pool.close_all()?;

    tracing::info!(rows, files = seen.len(), evicted = stats.evicted, "split complete");
    Ok(SplitSummary {
        rows,
        files: seen.len(),
        stats,
        warnings: warnings.len(),
    })
}

/// Turn a column value into a safe file stem.
pub fn file_stem_for(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "_empty".to_string();
    }
    let stem: String = trimmed
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.chars().all(|c| c == '.') {
        format!("_{stem}")
    } else {
        stem
    }
}

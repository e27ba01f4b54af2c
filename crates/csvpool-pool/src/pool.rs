//! `WriterPool`: many destinations, bounded open handles.
//!
//! Resolution on `write(path, row)`:
//! - hit: touch the writer (most recently used) and append;
//! - miss: open a new `RowWriter`, evict the least recently used writer if
//!   the pool is full, then append and track the new writer.
//!
//! The writer is opened *before* anything is evicted, so a failed open leaves
//! the pool exactly as it was. Eviction close failures never fail the write;
//! they are logged and kept as `PoolWarning`s.
//!
//! A writer re-created for an evicted path starts with a fresh header
//! decision, so keyed rows repeat the header mid-file under eviction churn.

use std::fmt;
use std::path::{Path, PathBuf};

use csvpool_core::config::PoolConfig;
use csvpool_core::types::Row;
use csvpool_io::{RowWriter, WriterOptions};

use crate::error::{Error, Result, WriterFailures};
use crate::lru::LruMap;

/// Counters since the pool was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Writers created (misses that opened successfully).
    pub opened: u64,
    /// Writers closed to make room.
    pub evicted: u64,
    pub rows_written: u64,
    /// Highest number of simultaneously open writers observed.
    pub peak_open: usize,
}

/// A non-fatal failure recorded while evicting a writer.
#[derive(Debug)]
pub struct PoolWarning {
    pub path: PathBuf,
    pub error: csvpool_io::Error,
}

impl fmt::Display for PoolWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evicting '{}': {}", self.path.display(), self.error)
    }
}

pub struct WriterPool {
    capacity: usize,
    options: WriterOptions,
    writers: LruMap<PathBuf, RowWriter>,
    warnings: Vec<PoolWarning>,
    stats: PoolStats,
}

impl WriterPool {
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            capacity: config.max_open_files,
            options: WriterOptions::from(&config),
            writers: LruMap::with_capacity(config.max_open_files.min(1024)),
            warnings: Vec::new(),
            stats: PoolStats::default(),
        })
    }

    /// Default dialect and header policy, custom capacity.
    pub fn with_capacity(max_open_files: usize) -> Result<Self> {
        Self::new(PoolConfig::new(max_open_files))
    }

    /// Append `row` to the file at `path`, opening it if needed.
    pub fn write(&mut self, path: impl AsRef<Path>, row: &Row) -> Result<()> {
        let path = path.as_ref();
        if let Some(writer) = self.writers.get_mut(path) {
            writer.write(row)?;
            self.stats.rows_written += 1;
            return Ok(());
        }

        let mut writer = RowWriter::open(path, self.options)?;
        if self.writers.len() >= self.capacity {
            self.evict_lru();
        }
        let res = writer.write(row);
        self.writers.insert(path.to_path_buf(), writer);
        self.stats.opened += 1;
        self.stats.peak_open = self.stats.peak_open.max(self.writers.len());
        res?;
        self.stats.rows_written += 1;
        Ok(())
    }

    /// Close every writer and empty the pool. Safe to call repeatedly.
    ///
    /// Every writer is closed even if some fail; failures are returned
    /// together.
    pub fn close_all(&mut self) -> Result<()> {
        if self.writers.is_empty() {
            return Ok(());
        }
        let mut failures = Vec::new();
        let drained = self.writers.drain();
        tracing::debug!(writers = drained.len(), "closing all writers");
        for (_, mut writer) in drained {
            if let Err(e) = writer.close() {
                failures.push(e);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::CloseAll(WriterFailures(failures)))
        }
    }

    /// Flush every open writer without closing any.
    pub fn flush_all(&mut self) -> Result<()> {
        let failures: Vec<_> = self
            .writers
            .values_mut()
            .filter_map(|w| w.flush().err())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::FlushAll(WriterFailures(failures)))
        }
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Whether `path` currently has an open writer.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.writers.contains_key(path.as_ref())
    }

    /// The open writer for `path`, without touching its recency.
    pub fn writer(&self, path: impl AsRef<Path>) -> Option<&RowWriter> {
        self.writers.peek(path.as_ref())
    }

    /// Open paths, least recently used first.
    pub fn recency(&self) -> Vec<&Path> {
        self.writers.keys().map(PathBuf::as_path).collect()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    pub fn warnings(&self) -> &[PoolWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<PoolWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn evict_lru(&mut self) {
        let Some((path, mut writer)) = self.writers.pop_lru() else {
            return;
        };
        self.stats.evicted += 1;
        tracing::debug!(path = %path.display(), rows = writer.rows_written(), "evicting least recently used writer");
        if let Err(error) = writer.close() {
            tracing::warn!(path = %path.display(), error = %error, "failed to close evicted writer");
            self.warnings.push(PoolWarning { path, error });
        }
    }
}

impl fmt::Debug for WriterPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterPool")
            .field("capacity", &self.capacity)
            .field("open", &self.writers.len())
            .field("stats", &self.stats)
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

impl Drop for WriterPool {
    fn drop(&mut self) {
        if let Err(e) = self.close_all() {
            tracing::warn!(error = %e, "writer pool dropped with close failures");
        }
    }
}

//! Append-mode CSV writer for `Row`s.
//!
//! One `RowWriter` owns one open file. The UTF-8 BOM is written only when the
//! file was empty at open time; the header is a one-shot decision taken on
//! the first `write` (keyed row + `write_header`) and never revisited.

use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use csvpool_core::config::{CsvDialect, PoolConfig};
use csvpool_core::types::Row;

use crate::error::{Error, Result};

pub const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    pub write_header: bool,
    pub dialect: CsvDialect,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            write_header: true,
            dialect: CsvDialect::default(),
        }
    }
}

impl From<&PoolConfig> for WriterOptions {
    fn from(cfg: &PoolConfig) -> Self {
        Self {
            write_header: cfg.write_header,
            dialect: cfg.dialect,
        }
    }
}

pub struct RowWriter {
    path: PathBuf,
    /// `None` once closed.
    out: Option<BufWriter<File>>,
    encoder: RecordEncoder,
    write_header: bool,
    started: bool,
    header_emitted: bool,
    marker_emitted: bool,
    rows_written: u64,
}

impl RowWriter {
    /// Open `path` for appending, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>, opts: WriterOptions) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreateFailed {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let open_failed = |source: io::Error| Error::FileOpenFailed {
            path: path.to_path_buf(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_failed)?;
        let existing = file.metadata().map_err(open_failed)?.len();

        tracing::debug!(path = %path.display(), existing_bytes = existing, "opened row writer");

        Ok(Self {
            path: path.to_path_buf(),
            out: Some(BufWriter::new(file)),
            encoder: RecordEncoder::new(opts.dialect),
            write_header: opts.write_header,
            started: false,
            header_emitted: false,
            marker_emitted: existing > 0,
            rows_written: 0,
        })
    }

    /// Append one record, preceded on the first call by the BOM and header.
    pub fn write(&mut self, row: &Row) -> Result<()> {
        let path = &self.path;
        let write_failed = |source: io::Error| Error::WriteFailed {
            path: path.clone(),
            source,
        };
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| Error::WriterClosed { path: path.clone() })?;

        if !self.marker_emitted {
            out.write_all(UTF8_BOM).map_err(write_failed)?;
            self.marker_emitted = true;
        }

        if !self.started {
            self.started = true;
            if self.write_header && row.is_keyed() {
                out.write_all(self.encoder.encode(row.names()))
                    .map_err(write_failed)?;
                self.header_emitted = true;
            }
        }

        out.write_all(self.encoder.encode(row.values().map(|v| v.as_field())))
            .map_err(write_failed)?;
        self.rows_written += 1;
        tracing::trace!(path = %path.display(), fields = row.len(), "row appended");
        Ok(())
    }

    /// Push buffered records to the OS without closing.
    pub fn flush(&mut self) -> Result<()> {
        match self.out.as_mut() {
            Some(out) => out.flush().map_err(|source| Error::WriteFailed {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Flush and release the handle. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut out) = self.out.take() else {
            return Ok(());
        };
        let res = out.flush();
        // BufWriter retries the flush on drop; hand it nothing to retry.
        let _ = out.into_parts();
        tracing::debug!(path = %self.path.display(), rows = self.rows_written, "closed row writer");
        res.map_err(|source| Error::CloseFailed {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.out.is_none()
    }

    pub fn header_emitted(&self) -> bool {
        self.header_emitted
    }

    pub fn marker_emitted(&self) -> bool {
        self.marker_emitted
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl std::fmt::Debug for RowWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowWriter")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .field("header_emitted", &self.header_emitted)
            .field("marker_emitted", &self.marker_emitted)
            .field("rows_written", &self.rows_written)
            .finish()
    }
}

impl Drop for RowWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "row writer dropped with unflushed data");
        }
    }
}

/// Encodes one record at a time into a reusable line buffer.
///
/// Fields are quoted only when they contain the delimiter, the quote or a
/// line break. A record with no fields, or a single empty field, is a bare
/// line break.
struct RecordEncoder {
    core: csv_core::Writer,
    line: Vec<u8>,
}

impl RecordEncoder {
    fn new(d: CsvDialect) -> Self {
        let core = csv_core::WriterBuilder::new()
            .delimiter(d.delimiter)
            .quote(d.quote)
            .double_quote(d.escape.is_none())
            .escape(d.escape.unwrap_or(b'\\'))
            .quote_style(csv_core::QuoteStyle::Necessary)
            .terminator(csv_core::Terminator::Any(b'\n'))
            .build();
        Self {
            core,
            line: Vec::with_capacity(256),
        }
    }

    fn encode<'a>(&mut self, fields: impl Iterator<Item = Cow<'a, str>>) -> &[u8] {
        let fields: Vec<Cow<'a, str>> = fields.collect();
        self.line.clear();
        if fields.len() <= 1 && fields.iter().all(|f| f.is_empty()) {
            self.line.push(b'\n');
            return &self.line;
        }

        let mut chunk = [0u8; 1024];
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                let (_, n) = self.core.delimiter(&mut chunk);
                self.line.extend_from_slice(&chunk[..n]);
            }
            let mut input = field.as_bytes();
            loop {
                let (res, nin, nout) = self.core.field(input, &mut chunk);
                input = &input[nin..];
                self.line.extend_from_slice(&chunk[..nout]);
                if let csv_core::WriteResult::InputEmpty = res {
                    break;
                }
            }
        }
        // Closing quote plus terminator always fit in one chunk.
        let (_, n) = self.core.terminator(&mut chunk);
        self.line.extend_from_slice(&chunk[..n]);
        &self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csvpool_core::types::Scalar;

    fn read(path: &Path) -> String {
        String::from_utf8(fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn first_write_emits_bom_then_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut w = RowWriter::open(&path, WriterOptions::default()).unwrap();
        w.write(&Row::keyed([("a", 1), ("b", 2)])).unwrap();
        w.write(&Row::keyed([("a", 3), ("b", 4)])).unwrap();
        w.close().unwrap();
        assert_eq!(read(&path), "\u{feff}a,b\n1,2\n3,4\n");
        assert!(w.header_emitted());
        assert_eq!(w.rows_written(), 2);
    }

    #[test]
    fn quotes_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.csv");
        let mut w = RowWriter::open(&path, WriterOptions::default()).unwrap();
        w.write(&Row::positional([
            Scalar::from("plain"),
            Scalar::from("a,b"),
            Scalar::from("say \"hi\""),
            Scalar::from("two\nlines"),
            Scalar::Null,
        ]))
        .unwrap();
        w.close().unwrap();
        assert_eq!(
            read(&path),
            "\u{feff}plain,\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\",\n"
        );
    }

    #[test]
    fn empty_records_are_bare_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let mut w = RowWriter::open(&path, WriterOptions::default()).unwrap();
        w.write(&Row::positional([Scalar::Null])).unwrap();
        w.write(&Row::positional([""])).unwrap();
        w.write(&Row::new()).unwrap();
        w.write(&Row::positional(["", ""])).unwrap();
        w.close().unwrap();
        assert_eq!(read(&path), "\u{feff}\n\n\n,\n");
        assert_eq!(w.rows_written(), 4);
    }

    #[test]
    fn long_quoted_field_spans_encoder_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");
        let long = format!("{},{}", "a".repeat(3000), "b".repeat(3000));
        let mut w = RowWriter::open(&path, WriterOptions::default()).unwrap();
        w.write(&Row::positional([long.as_str(), "tail"])).unwrap();
        w.close().unwrap();
        assert_eq!(read(&path), format!("\u{feff}\"{long}\",tail\n"));
    }

    #[test]
    fn header_decision_is_made_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.csv");
        let mut w = RowWriter::open(&path, WriterOptions::default()).unwrap();
        w.write(&Row::positional(["x", "y"])).unwrap();
        w.write(&Row::keyed([("a", "1"), ("b", "2")])).unwrap();
        w.close().unwrap();
        assert!(!w.header_emitted());
        assert_eq!(read(&path), "\u{feff}x,y\n1,2\n");
    }

    #[test]
    fn close_is_idempotent_and_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.csv");
        let mut w = RowWriter::open(&path, WriterOptions::default()).unwrap();
        w.close().unwrap();
        w.close().unwrap();
        assert!(w.is_closed());
        let err = w.write(&Row::positional([1])).unwrap_err();
        assert!(matches!(err, Error::WriterClosed { .. }));
    }
}

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot create directory '{}': {source}", .path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open '{}' for append: {source}", .path.display())]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write to '{}' failed: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("flush of '{}' on close failed: {source}", .path.display())]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("writer for '{}' is already closed", .path.display())]
    WriterClosed { path: PathBuf },
}

impl Error {
    /// Path the failing operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            Error::DirectoryCreateFailed { path, .. }
            | Error::FileOpenFailed { path, .. }
            | Error::WriteFailed { path, .. }
            | Error::CloseFailed { path, .. }
            | Error::WriterClosed { path } => path.as_path(),
        }
    }

    /// True when the writer was never created.
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            Error::DirectoryCreateFailed { .. } | Error::FileOpenFailed { .. }
        )
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::DirectoryCreateFailed { path, .. } => vec![
                format!("Check permissions on the parent of {}", path.display()),
                "Make sure no regular file sits where a directory is expected".into(),
            ],
            Error::FileOpenFailed { source, .. } => {
                let mut out = vec!["Check that the destination is a writable file".into()];
                if source.raw_os_error() == Some(24) {
                    out.push("Too many open files: lower max_open_files or raise ulimit -n".into());
                }
                out
            }
            Error::WriteFailed { .. } | Error::CloseFailed { .. } => vec![
                "Verify disk space is available".into(),
                "Check that the file was not removed or made read-only while open".into(),
            ],
            Error::WriterClosed { .. } => {
                vec!["Route writes through WriterPool, which reopens evicted paths".into()]
            }
        }
    }
}

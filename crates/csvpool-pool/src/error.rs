use std::fmt;

use thiserror::Error;

/// Result type local to csvpool-pool.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A single writer failed to open, write, or close.
    #[error(transparent)]
    Writer(#[from] csvpool_io::Error),

    #[error(transparent)]
    Config(#[from] csvpool_core::Error),

    #[error("close_all: {0}")]
    CloseAll(WriterFailures),

    #[error("flush_all: {0}")]
    FlushAll(WriterFailures),
}

/// Per-writer failures collected while walking every open writer.
#[derive(Debug)]
pub struct WriterFailures(pub Vec<csvpool_io::Error>);

impl fmt::Display for WriterFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} writer(s) failed", self.0.len())?;
        for (i, e) in self.0.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Individual writer errors carried by this error.
    pub fn failures(&self) -> &[csvpool_io::Error] {
        match self {
            Error::Writer(e) => std::slice::from_ref(e),
            Error::CloseAll(f) | Error::FlushAll(f) => &f.0,
            Error::Config(_) => &[],
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Config(e) => e.suggestions(),
            other => {
                let mut out: Vec<String> = Vec::new();
                for s in other.failures().iter().flat_map(|e| e.suggestions()) {
                    if !out.contains(&s) {
                        out.push(s);
                    }
                }
                out
            }
        }
    }
}

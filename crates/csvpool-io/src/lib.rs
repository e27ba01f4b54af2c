#![forbid(unsafe_code)]
//! csvpool-io: the single-file append writer.
//!
//! - `writers::csv`: `RowWriter`, one open append-mode handle per instance,
//!   with a UTF-8 BOM and a header line each emitted at most once.
//!
//! Handle budgeting across many files lives in `csvpool-pool`.

pub mod error;
pub mod writers;

pub use error::{Error, Result};
pub use writers::csv::{RowWriter, WriterOptions, UTF8_BOM};

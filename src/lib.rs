#![forbid(unsafe_code)]
//! csvpool: write rows to an unbounded number of CSV files while keeping at
//! most `max_open_files` handles open.
//!
//! ```rust,no_run
//! use csvpool::{PoolConfig, Row, WriterPool};
//!
//! # fn main() -> Result<(), csvpool::PoolError> {
//! let mut pool = WriterPool::new(PoolConfig::new(64))?;
//! pool.write("out/north.csv", &Row::keyed([("region", "north"), ("qty", "3")]))?;
//! pool.write("out/south.csv", &Row::keyed([("region", "south"), ("qty", "5")]))?;
//! pool.close_all()?;
//! # Ok(())
//! # }
//! ```
//!
//! Crates:
//! - `csvpool-core`: `Row`, `Scalar`, `PoolConfig`, `CsvDialect`.
//! - `csvpool-io`: `RowWriter`, one append-mode file.
//! - `csvpool-pool`: `WriterPool`, LRU-bounded set of writers.

pub use csvpool_core::config::{CsvDialect, PoolConfig};
pub use csvpool_core::types::{Row, Scalar};
pub use csvpool_io::{RowWriter, WriterOptions, UTF8_BOM};
pub use csvpool_pool::{PoolStats, PoolWarning, WriterPool};

pub use csvpool_core::Error as CoreError;
pub use csvpool_io::Error as WriterError;
pub use csvpool_pool::Error as PoolError;

pub mod lru {
    pub use csvpool_pool::lru::{Keys, LruMap};
}

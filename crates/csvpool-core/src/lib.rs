#![forbid(unsafe_code)]
//! csvpool-core: shared kernel for csvpool.
//!
//! This crate contains only *pure* types: rows and scalars, the CSV dialect,
//! and pool configuration. There is **no I/O** here.
//!
//! Crates that use this:
//! - csvpool-io: encodes `Row`s into append-mode CSV files.
//! - csvpool-pool: bounds the number of open writers with LRU eviction.
//! - csvpool-cli: builds `PoolConfig` from env, YAML, and flags.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CsvDialect, PoolConfig};
pub use error::{Error, Result};
pub use types::{Row, Scalar};

#![forbid(unsafe_code)]
//! csvpool-pool: fan rows out to many CSV files under a fixed handle budget.
//!
//! - `lru`: index-linked LRU map (O(1) touch / insert / pop-oldest).
//! - `pool`: `WriterPool`, which resolves a path to a live `RowWriter`,
//!   evicting the least recently used writer when at capacity.
//!
//! The pool is synchronous and takes `&mut self`; share it across threads
//! behind a `Mutex` if needed.

pub mod error;
pub mod lru;
pub mod pool;

pub use error::{Error, Result};
pub use pool::{PoolStats, PoolWarning, WriterPool};

//! Row writers.

pub mod csv;

//! Test data generation and read-back utilities for the csvpool test suite

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use csvpool::{Row, Scalar, UTF8_BOM};

/// Keyed row `{id, name, score}` derived from `i`.
pub fn keyed_row(i: usize) -> Row {
    Row::keyed([
        ("id", Scalar::I64(i as i64)),
        ("name", Scalar::Str(format!("name_{}", i % 10))),
        ("score", Scalar::F64(i as f64 * 0.5)),
    ])
}

/// Positional row `[i, "value_i", i % 2 == 0]`.
pub fn positional_row(i: usize) -> Row {
    Row::positional([
        Scalar::I64(i as i64),
        Scalar::Str(format!("value_{}", i)),
        Scalar::Bool(i % 2 == 0),
    ])
}

/// Deterministic pseudo-random sequence (LCG), good enough for shuffling paths.
pub fn lcg_sequence(seed: u64, len: usize, modulo: usize) -> Vec<usize> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as usize) % modulo
        })
        .collect()
}

pub fn read_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).expect("Failed to read output file")
}

pub fn read_text(path: &Path) -> String {
    String::from_utf8(read_bytes(path)).expect("Output is not UTF-8")
}

/// Number of UTF-8 BOMs anywhere in the file.
pub fn count_boms(path: &Path) -> usize {
    read_bytes(path)
        .windows(UTF8_BOM.len())
        .filter(|w| *w == UTF8_BOM.as_slice())
        .count()
}

/// Parse a written file back into records, dropping a leading BOM.
pub fn read_records(path: &Path, delimiter: u8) -> Vec<Vec<String>> {
    let bytes = read_bytes(path);
    let body = bytes.strip_prefix(UTF8_BOM.as_slice()).unwrap_or(&bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(body);
    rdr.records()
        .map(|r| {
            r.expect("Failed to parse record")
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
        .collect()
}

//! Pool configuration: capacity, header policy, and CSV dialect.
//!
//! Sources, in increasing precedence: `Default`, a YAML/JSON document
//! (`serde`), environment variables (`PoolConfig::from_env`), then explicit
//! overrides by the caller.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MAX_OPEN_FILES: usize = 120;

pub const ENV_MAX_OPEN_FILES: &str = "CSVPOOL_MAX_OPEN_FILES";
pub const ENV_WRITE_HEADER: &str = "CSVPOOL_WRITE_HEADER";
pub const ENV_DELIMITER: &str = "CSVPOOL_DELIMITER";
pub const ENV_QUOTE: &str = "CSVPOOL_QUOTE";

/// Field separator, enclosure, and optional escape byte.
///
/// With `escape: None` an embedded quote is doubled (`"` -> `""`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvDialect {
    #[serde(with = "ascii_char")]
    pub delimiter: u8,
    #[serde(with = "ascii_char")]
    pub quote: u8,
    #[serde(with = "opt_ascii_char")]
    pub escape: Option<u8>,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
        }
    }
}

impl CsvDialect {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (what, b) in [("delimiter", self.delimiter), ("quote", self.quote)]
            .into_iter()
            .chain(self.escape.map(|e| ("escape", e)))
        {
            if !b.is_ascii() {
                return Err(Error::Config(format!("{what} must be an ASCII character")));
            }
            if b == b'\n' || b == b'\r' {
                return Err(Error::Config(format!("{what} cannot be a line break")));
            }
        }
        if self.delimiter == self.quote {
            return Err(Error::Config(
                "delimiter and quote must be different characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on simultaneously open destination files.
    pub max_open_files: usize,
    /// Write a header line before the first keyed row of each writer.
    pub write_header: bool,
    #[serde(flatten)]
    pub dialect: CsvDialect,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            write_header: true,
            dialect: CsvDialect::default(),
        }
    }
}

impl PoolConfig {
    pub fn new(max_open_files: usize) -> Self {
        Self {
            max_open_files,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    pub fn with_dialect(mut self, dialect: CsvDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Defaults overlaid with `CSVPOOL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env()?;
        Ok(cfg)
    }

    /// Overlay `CSVPOOL_*` environment variables onto `self`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = get(ENV_MAX_OPEN_FILES) {
            self.max_open_files = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_MAX_OPEN_FILES}: max_open_files '{raw}' is not a number"))
            })?;
        }
        if let Some(raw) = get(ENV_WRITE_HEADER) {
            self.write_header = parse_bool(&raw).ok_or_else(|| {
                Error::Config(format!("{ENV_WRITE_HEADER}: '{raw}' is not a boolean"))
            })?;
        }
        if let Some(raw) = get(ENV_DELIMITER) {
            self.dialect.delimiter =
                parse_char(&raw, "delimiter").map_err(|e| e.with_context(ENV_DELIMITER))?;
        }
        if let Some(raw) = get(ENV_QUOTE) {
            self.dialect.quote =
                parse_char(&raw, "quote").map_err(|e| e.with_context(ENV_QUOTE))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_open_files == 0 {
            return Err(Error::Config("max_open_files must be positive".into()));
        }
        self.dialect.validate()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a one-character setting; `\t` and `tab` mean a tab.
pub fn parse_char(raw: &str, what: &str) -> Result<u8> {
    let s = match raw {
        "\\t" | "tab" => "\t",
        other => other,
    };
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(Error::Config(format!(
            "{what} must be a single ASCII character, got '{raw}'"
        ))),
    }
}

mod ascii_char {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(b: &u8, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&char::from(*b).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_char(&raw, "character").map_err(serde::de::Error::custom)
    }
}

mod opt_ascii_char {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(b: &Option<u8>, s: S) -> Result<S::Ok, S::Error> {
        match b {
            Some(b) => s.serialize_some(&char::from(*b).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| super::parse_char(&raw, "escape").map_err(serde::de::Error::custom))
            .transpose()
    }
}

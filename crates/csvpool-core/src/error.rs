use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid row: {0}")]
    Row(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with context chain for better debugging
    #[error("Error in {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Name the setting or source an error came from.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self) as Box<dyn std::error::Error + Send + Sync>,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Config(msg) => {
                if msg.contains("max_open_files") {
                    vec![
                        "Set max_open_files to a positive integer".into(),
                        "Keep it below the process file descriptor limit (ulimit -n)".into(),
                    ]
                } else if msg.contains("delimiter") || msg.contains("quote") {
                    vec![
                        "Use a single ASCII character for delimiter and quote".into(),
                        "The delimiter and quote characters must differ".into(),
                    ]
                } else {
                    vec![]
                }
            }
            Error::Row(_) | Error::Json(_) => {
                vec!["Rows are built from a JSON object (keyed) or array (positional)".into()]
            }
            Error::Context { source, .. } => source
                .downcast_ref::<Error>()
                .map(Error::suggestions)
                .unwrap_or_default(),
        }
    }
}

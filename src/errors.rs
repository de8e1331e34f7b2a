// errors.rs

/// Everything that can abort a processing run.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// A file selection is missing. The user re-selects and retries.
    #[error("{0}")]
    Validation(String),

    /// Content could not be read as csv
    #[error("Could not parse {file}: {reason}")]
    MalformedInput { file: String, reason: String },

    /// A table in a set lacks the join key columns (or a merged column name clashes)
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Target and All disagree on their first five columns
    #[error("The first 5 columns do not match between target and all files. Target keys: [{target}], All keys: [{all}]")]
    KeyMismatch { target: String, all: String },

    /// Target and filtered All carry different non-key columns (strict mode only)
    #[error("Column mismatch: {0}")]
    ColumnMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type ProcessResult<T> = Result<T, ProcessError>;

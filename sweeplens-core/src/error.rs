/// Top-level sweeplens error type.
///
/// All fallible operations in `sweeplens-core` return [`Result<T, SweeplensError>`](Result).
/// Metadata decode failures and missing sweep attributes are recovered
/// locally and never surface here; only store access and configuration can
/// fail a call.
#[derive(thiserror::Error, Debug)]
pub enum SweeplensError {
    /// Error from the measurement store (`SQLite` access, path resolution).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error in configuration parsing or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors from the read-only measurement database.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Underlying `SQLite` operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database path could not be resolved.
    #[error("Cannot resolve database path {path}: {source}")]
    Path {
        /// Path as supplied by the caller.
        path: String,
        /// Underlying filesystem error.
        source: std::io::Error,
    },
}

/// Errors in sweeplens configuration parsing and validation.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// Configuration values are present but semantically invalid.
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// Configuration file syntax could not be parsed (TOML error).
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience alias for `Result<T, SweeplensError>`.
pub type Result<T> = std::result::Result<T, SweeplensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert_into_top_level() {
        let err: SweeplensError = StoreError::Sqlite(rusqlite::Error::InvalidQuery).into();
        assert!(matches!(err, SweeplensError::Store(StoreError::Sqlite(_))));
        assert!(err.to_string().starts_with("Store error: SQLite error"));
    }

    #[test]
    fn path_error_names_the_path() {
        let err = StoreError::Path {
            path: "missing.db".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("missing.db"));
    }
}

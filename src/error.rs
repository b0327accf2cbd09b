//! Error types
//!
//! Source failures are recoverable (the loader moves on to the next source),
//! `LoadError` and `ConfigError` are fatal at startup, and `RenderError` is
//! always caught at the render boundary.

use std::fmt;

/// Why one data source could not produce a dataset
#[derive(Debug)]
pub enum SourceError {
    /// Source unreachable, file missing, or connection refused
    Connection(String),
    /// The configured table is not in the database
    MissingTable(String),
    /// The query itself failed
    Query(diesel::result::Error),
    /// Required columns absent after normalization
    Schema { missing: Vec<String> },
    /// A row carries a value the record type cannot hold
    InvalidRow { row: usize, reason: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Connection(msg) => write!(f, "Connection error: {}", msg),
            SourceError::MissingTable(table) => write!(f, "Table not found: {}", table),
            SourceError::Query(e) => write!(f, "Query error: {}", e),
            SourceError::Schema { missing } => {
                write!(f, "Missing required columns: {}", missing.join(", "))
            }
            SourceError::InvalidRow { row, reason } => {
                write!(f, "Invalid row {}: {}", row, reason)
            }
        }
    }
}

impl std::error::Error for SourceError {}

impl From<diesel::result::Error> for SourceError {
    fn from(e: diesel::result::Error) -> Self {
        SourceError::Query(e)
    }
}

impl From<diesel::r2d2::PoolError> for SourceError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        SourceError::Connection(e.to_string())
    }
}

impl SourceError {
    /// Schema and row problems are data-shape failures; the rest are
    /// acquisition failures
    pub fn is_validation(&self) -> bool {
        matches!(self, SourceError::Schema { .. } | SourceError::InvalidRow { .. })
    }
}

/// Every configured source failed
#[derive(Debug)]
pub enum LoadError {
    FallbackExhausted(Vec<(String, SourceError)>),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::FallbackExhausted(failures) if failures.is_empty() => {
                write!(f, "No data sources configured")
            }
            LoadError::FallbackExhausted(failures) => {
                write!(f, "All data sources failed:")?;
                for (name, err) in failures {
                    write!(f, " [{}: {}]", name, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Startup configuration problems
#[derive(Debug)]
pub enum ConfigError {
    /// Production flag set but no connection string given
    MissingDatabaseUrl,
    /// Production database is a backend only SQLite builds can't read
    UnsupportedBackend { target: String },
    /// A variable is present but unusable
    InvalidValue { name: String, value: String },
    /// config.toml exists but does not parse
    File(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL is required in production (RENDER is set)")
            }
            ConfigError::UnsupportedBackend { target } => write!(
                f,
                "Unsupported database backend in production: {} (only sqlite is supported)",
                target
            ),
            ConfigError::InvalidValue { name, value } => {
                write!(f, "Invalid value for {}: {:?}", name, value)
            }
            ConfigError::File(msg) => write!(f, "Config file error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A failure while recomputing one dashboard update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A running sum no longer fits in u64
    Overflow(&'static str),
    /// The computation panicked
    Panicked(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Overflow(what) => write!(f, "Overflow while summing {}", what),
            RenderError::Panicked(msg) => write!(f, "Recompute panicked: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = SourceError::Schema {
            missing: vec!["aliado".to_string(), "region".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required columns: aliado, region");
        assert!(err.is_validation());
        assert!(!SourceError::Connection("x".into()).is_validation());
    }

    #[test]
    fn test_fallback_exhausted_names_each_source() {
        let err = LoadError::FallbackExhausted(vec![
            ("sqlite".to_string(), SourceError::Connection("no file".into())),
            ("fixture".to_string(), SourceError::InvalidRow { row: 2, reason: "negative".into() }),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("sqlite: Connection error: no file"));
        assert!(msg.contains("fixture: Invalid row 2: negative"));
    }

    #[test]
    fn test_config_error_message() {
        assert!(ConfigError::MissingDatabaseUrl.to_string().contains("DATABASE_URL"));
    }
}

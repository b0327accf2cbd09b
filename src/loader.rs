//! Dataset acquisition with ordered fallback
//!
//! `Loader` tries each configured source in turn. A failing source is logged
//! and skipped; only when every source has failed does `load` return an
//! error, and that error is fatal at startup.

use crate::config::{ConnectionTarget, Settings};
use crate::dataset::{sample_records, Dataset, Record};
use crate::db::{resolve_columns, Database};
use crate::error::{LoadError, SourceError};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// Something that can produce the full set of records
pub trait DataSource {
    /// Short name used in logs and in `Dataset::source`
    fn name(&self) -> &str;

    fn fetch(&self) -> Result<Vec<Record>, SourceError>;
}

/// Primary source: a table in a SQLite database
pub struct SqliteSource {
    target: ConnectionTarget,
    table: String,
}

impl SqliteSource {
    pub fn new(target: ConnectionTarget, table: impl Into<String>) -> Self {
        Self {
            target,
            table: table.into(),
        }
    }
}

impl DataSource for SqliteSource {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        match &self.target {
            ConnectionTarget::Sqlite(path) => {
                // Pool and connection are dropped when `db` goes out of scope
                let db = Database::open_existing(path)?;
                db.read_records(&self.table)
            }
            ConnectionTarget::Unsupported { scheme, .. } => Err(SourceError::Connection(
                format!("Unsupported database backend: {}", scheme),
            )),
        }
    }
}

/// Fallback source: a JSON file holding an array of row objects
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn fixture_count(value: Option<&Value>, column: &str, row: usize) -> Result<u64, SourceError> {
    match value {
        Some(v) => v.as_u64().ok_or_else(|| SourceError::InvalidRow {
            row,
            reason: format!("{} is not a non-negative integer: {}", column, v),
        }),
        None => Err(SourceError::InvalidRow {
            row,
            reason: format!("{} is missing", column),
        }),
    }
}

fn fixture_text(value: Option<&Value>, column: &str, row: usize) -> Result<String, SourceError> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SourceError::InvalidRow {
            row,
            reason: format!("{} is not a string: {}", column, other),
        }),
        None => Err(SourceError::InvalidRow {
            row,
            reason: format!("{} is missing", column),
        }),
    }
}

/// Turn parsed fixture JSON into records, normalizing keys like the table
/// reader does
pub fn records_from_json(json: &Value) -> Result<Vec<Record>, SourceError> {
    let rows = json.as_array().ok_or_else(|| SourceError::InvalidRow {
        row: 0,
        reason: "fixture must be a JSON array of objects".to_string(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let obj = row.as_object().ok_or_else(|| SourceError::InvalidRow {
            row: row_no,
            reason: "not an object".to_string(),
        })?;

        let keys: Vec<String> = obj.keys().cloned().collect();
        let resolved = resolve_columns(&keys).map_err(|missing| SourceError::Schema { missing })?;
        let field = |name: &str| obj.get(&resolved[name]);

        records.push(Record {
            analisis: fixture_count(field("analisis"), "analisis", row_no)?,
            total_po: fixture_count(field("total_po"), "total_po", row_no)?,
            ciudad: fixture_text(field("ciudad"), "ciudad", row_no)?,
            aliado: fixture_text(field("aliado"), "aliado", row_no)?,
            region: fixture_text(field("region"), "region", row_no)?,
        });
    }
    Ok(records)
}

impl DataSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            SourceError::Connection(format!("{}: {}", self.path.display(), e))
        })?;
        let json: Value = serde_json::from_str(&contents).map_err(|e| SourceError::InvalidRow {
            row: 0,
            reason: format!("invalid JSON: {}", e),
        })?;
        records_from_json(&json)
    }
}

/// Last resort: the built-in sample rows
pub struct SampleSource;

impl DataSource for SampleSource {
    fn name(&self) -> &str {
        "sample"
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        Ok(sample_records())
    }
}

/// Ordered list of sources tried until one succeeds
#[derive(Default)]
pub struct Loader {
    sources: Vec<Box<dyn DataSource>>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source<S: DataSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Database first, then the fixture file if one is configured, then the
    /// built-in sample unless disabled
    pub fn from_settings(settings: &Settings) -> Self {
        let mut loader =
            Self::new().with_source(SqliteSource::new(settings.target.clone(), &settings.table));
        if let Some(fixture) = &settings.fixture {
            loader = loader.with_source(FixtureSource::new(fixture));
        }
        if settings.use_sample {
            loader = loader.with_source(SampleSource);
        }
        loader
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn load(&self) -> Result<Dataset, LoadError> {
        let mut failures = Vec::new();

        for (i, source) in self.sources.iter().enumerate() {
            match source.fetch() {
                Ok(records) => {
                    if i > 0 {
                        warn!(source = source.name(), "using fallback data");
                    }
                    info!(source = source.name(), records = records.len(), "dataset loaded");
                    return Ok(Dataset::new(records, source.name()));
                }
                Err(e) => {
                    let kind = if e.is_validation() { "validation" } else { "acquisition" };
                    warn!(source = source.name(), kind, error = %e, "data source failed");
                    failures.push((source.name().to_string(), e));
                }
            }
        }

        Err(LoadError::FallbackExhausted(failures))
    }
}

//! SQLite access with Diesel
//!
//! Reads the dashboard table with whatever column spelling the table uses,
//! and can seed a table with sample rows. Connections come from a one-slot
//! pool that lives only as long as the `Database` value.

use crate::dataset::{canonical_column, normalize_column, Record, REQUIRED_COLUMNS};
use crate::error::SourceError;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub type Result<T> = std::result::Result<T, SourceError>;

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

// ============================================================================
// Helper structs for raw SQL queries
// ============================================================================

/// Helper for pragma_table_info queries
#[derive(QueryableByName, Debug)]
struct ColumnName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// One row as read from the table, before validation. The `*_type`
/// fields carry `typeof()` of the numeric cells.
#[derive(QueryableByName, Debug)]
struct RawRow {
    #[diesel(sql_type = Nullable<BigInt>)]
    analisis: Option<i64>,
    #[diesel(sql_type = Text)]
    analisis_type: String,
    #[diesel(sql_type = Nullable<BigInt>)]
    total_po: Option<i64>,
    #[diesel(sql_type = Text)]
    total_po_type: String,
    #[diesel(sql_type = Nullable<Text>)]
    ciudad: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    aliado: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    region: Option<String>,
}

/// Quote an identifier for SQLite
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn count(value: Option<i64>, storage: &str, column: &str, row: usize) -> Result<u64> {
    // SQLite reads text as 0 and truncates reals, so the stored type decides
    let v = match (storage, value) {
        ("integer", Some(v)) => v,
        ("null", _) | (_, None) => {
            return Err(SourceError::InvalidRow {
                row,
                reason: format!("{} is NULL", column),
            })
        }
        (other, Some(_)) => {
            return Err(SourceError::InvalidRow {
                row,
                reason: format!("{} is not an integer (stored as {})", column, other),
            })
        }
    };
    u64::try_from(v).map_err(|_| SourceError::InvalidRow {
        row,
        reason: format!("{} is negative ({})", column, v),
    })
}

fn category(value: Option<String>, column: &str, row: usize) -> Result<String> {
    value.ok_or_else(|| SourceError::InvalidRow {
        row,
        reason: format!("{} is NULL", column),
    })
}

impl RawRow {
    fn into_record(self, row: usize) -> Result<Record> {
        Ok(Record {
            analisis: count(self.analisis, &self.analisis_type, "analisis", row)?,
            total_po: count(self.total_po, &self.total_po_type, "total_po", row)?,
            ciudad: category(self.ciudad, "ciudad", row)?,
            aliado: category(self.aliado, "aliado", row)?,
            region: category(self.region, "region", row)?,
        })
    }
}

/// Map each required column onto the column name the table actually uses.
/// Returns the names still missing when the table does not provide them all.
pub fn resolve_columns(
    actual: &[String],
) -> std::result::Result<HashMap<&'static str, String>, Vec<String>> {
    let mut by_canonical: HashMap<String, String> = HashMap::new();
    for name in actual {
        let normalized = normalize_column(name);
        by_canonical
            .entry(canonical_column(&normalized).to_string())
            .or_insert_with(|| name.clone());
    }

    let mut resolved = HashMap::new();
    let mut missing = Vec::new();
    for required in REQUIRED_COLUMNS {
        match by_canonical.get(required) {
            Some(actual) => {
                resolved.insert(required, actual.clone());
            }
            None => missing.push(required.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(missing)
    }
}

// ============================================================================
// Database Connection
// ============================================================================

/// Handle on one SQLite file
pub struct Database {
    pool: DbPool,
    path: PathBuf,
}

impl Database {
    /// Open an existing database file. Never creates one.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SourceError::Connection(format!(
                "Database file not found: {}",
                path.display()
            )));
        }
        Self::open_at(path)
    }

    /// Open a database file, creating it (and its parent directory) if needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SourceError::Connection(e.to_string()))?;
            }
        }
        Self::open_at(path)
    }

    fn open_at(path: &Path) -> Result<Self> {
        let path_str = path.to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Column names of a table, in declaration order. Empty if the table
    /// does not exist.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut conn = self.get_conn()?;
        let columns: Vec<ColumnName> =
            diesel::sql_query("SELECT name FROM pragma_table_info(?)")
                .bind::<Text, _>(table)
                .load(&mut conn)?;
        Ok(columns.into_iter().map(|c| c.name).collect())
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let mut conn = self.get_conn()?;
        let tables: Vec<ColumnName> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
        )
        .bind::<Text, _>(table)
        .load(&mut conn)?;
        Ok(!tables.is_empty())
    }

    /// Read every row of `table` as records, validating the schema first
    pub fn read_records(&self, table: &str) -> Result<Vec<Record>> {
        if !self.table_exists(table)? {
            return Err(SourceError::MissingTable(table.to_string()));
        }

        let columns = self.table_columns(table)?;
        let resolved =
            resolve_columns(&columns).map_err(|missing| SourceError::Schema { missing })?;
        let col = |name: &str| quote_ident(&resolved[name]);

        let query = format!(
            "SELECT {a} AS analisis, typeof({a}) AS analisis_type, \
             {t} AS total_po, typeof({t}) AS total_po_type, \
             CAST({} AS TEXT) AS ciudad, CAST({} AS TEXT) AS aliado, CAST({} AS TEXT) AS region \
             FROM {}",
            col("ciudad"),
            col("aliado"),
            col("region"),
            quote_ident(table),
            a = col("analisis"),
            t = col("total_po"),
        );

        let mut conn = self.get_conn()?;
        let rows: Vec<RawRow> = diesel::sql_query(query).load(&mut conn)?;
        debug!(table, rows = rows.len(), "read table");

        rows.into_iter()
            .enumerate()
            .map(|(i, row)| row.into_record(i + 1))
            .collect()
    }

    /// Create `table` if needed and append the given records
    pub fn seed_table(&self, table: &str, records: &[Record]) -> Result<usize> {
        let mut conn = self.get_conn()?;
        let quoted = quote_ident(table);

        diesel::sql_query(format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                analisis INTEGER NOT NULL,
                total_po INTEGER NOT NULL,
                ciudad TEXT NOT NULL,
                aliado TEXT NOT NULL,
                region TEXT NOT NULL
            )
        "#,
            quoted
        ))
        .execute(&mut conn)?;

        let insert = format!(
            "INSERT INTO {} (analisis, total_po, ciudad, aliado, region) VALUES (?, ?, ?, ?, ?)",
            quoted
        );

        let mut rows = Vec::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            let to_i64 = |v: u64, column: &str| {
                i64::try_from(v).map_err(|_| SourceError::InvalidRow {
                    row: i + 1,
                    reason: format!("{} does not fit in an SQLite integer", column),
                })
            };
            rows.push((to_i64(r.analisis, "analisis")?, to_i64(r.total_po, "total_po")?, r));
        }

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for (analisis, total_po, r) in &rows {
                diesel::sql_query(insert.as_str())
                    .bind::<BigInt, _>(*analisis)
                    .bind::<BigInt, _>(*total_po)
                    .bind::<Text, _>(r.ciudad.as_str())
                    .bind::<Text, _>(r.aliado.as_str())
                    .bind::<Text, _>(r.region.as_str())
                    .execute(conn)?;
            }
            Ok(())
        })?;

        Ok(rows.len())
    }
}

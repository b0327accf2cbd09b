//! Records, dimensions and the immutable base dataset
//!
//! The dataset is loaded once at startup and only ever read afterwards.
//! Every filter, aggregation and option list borrows from it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the base dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Count of analyzed items
    pub analisis: u64,
    /// Total target/objective count
    pub total_po: u64,
    pub ciudad: String,
    pub aliado: String,
    pub region: String,
}

impl Record {
    pub fn new(analisis: u64, total_po: u64, ciudad: &str, aliado: &str, region: &str) -> Self {
        Self {
            analisis,
            total_po,
            ciudad: ciudad.to_string(),
            aliado: aliado.to_string(),
            region: region.to_string(),
        }
    }

    /// Category value of this record for a dimension
    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Ciudad => &self.ciudad,
            Dimension::Aliado => &self.aliado,
            Dimension::Region => &self.region,
        }
    }
}

/// A categorical column used for filtering and grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Ciudad,
    Aliado,
    Region,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Ciudad, Dimension::Aliado, Dimension::Region];

    /// Normalized column name
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Ciudad => "ciudad",
            Dimension::Aliado => "aliado",
            Dimension::Region => "region",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_column(s).as_str() {
            "ciudad" => Ok(Dimension::Ciudad),
            "aliado" => Ok(Dimension::Aliado),
            "region" | "región" => Ok(Dimension::Region),
            other => Err(format!("Unknown dimension: {}", other)),
        }
    }
}

/// Lower-case and trim a column name the way every source does on load
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Columns every source must provide, after normalization
pub const REQUIRED_COLUMNS: [&str; 5] = ["analisis", "total_po", "ciudad", "aliado", "region"];

/// Map a normalized column name onto its canonical required name.
/// `región` is what the original table calls the region column.
pub fn canonical_column(normalized: &str) -> &str {
    match normalized {
        "región" => "region",
        other => other,
    }
}

/// The immutable base dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
    source: String,
    loaded_at: DateTime<Local>,
}

impl Dataset {
    /// Wrap freshly loaded records; the load time is taken now
    pub fn new(records: Vec<Record>, source: impl Into<String>) -> Self {
        Self {
            records,
            source: source.into(),
            loaded_at: Local::now(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Name of the data source this dataset was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The built-in sample rows used as the last fallback
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new(150, 1000, "Bogotá", "Aliado A", "Centro"),
        Record::new(200, 1200, "Medellín", "Aliado B", "Antioquia"),
        Record::new(180, 1500, "Cali", "Aliado C", "Valle"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_value_by_dimension() {
        let r = Record::new(1, 2, "Cali", "B", "Valle");
        assert_eq!(r.value(Dimension::Ciudad), "Cali");
        assert_eq!(r.value(Dimension::Aliado), "B");
        assert_eq!(r.value(Dimension::Region), "Valle");
    }

    #[test]
    fn test_dimension_parse() {
        assert_eq!("ciudad".parse::<Dimension>().unwrap(), Dimension::Ciudad);
        assert_eq!(" Aliado ".parse::<Dimension>().unwrap(), Dimension::Aliado);
        assert_eq!("REGION".parse::<Dimension>().unwrap(), Dimension::Region);
        assert_eq!("región".parse::<Dimension>().unwrap(), Dimension::Region);
        assert!("pais".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_dimension_serializes_lowercase() {
        let json = serde_json::to_string(&Dimension::Aliado).unwrap();
        assert_eq!(json, "\"aliado\"");
    }

    #[test]
    fn test_normalize_and_canonical_column() {
        assert_eq!(normalize_column("  Total_PO "), "total_po");
        assert_eq!(canonical_column(&normalize_column("Región")), "region");
        assert_eq!(canonical_column("ciudad"), "ciudad");
    }

    #[test]
    fn test_sample_records() {
        let sample = sample_records();
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.iter().map(|r| r.analisis).sum::<u64>(), 530);
        assert_eq!(sample.iter().map(|r| r.total_po).sum::<u64>(), 3700);
    }
}

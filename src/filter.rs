//! Categorical filtering of the base dataset
//!
//! A selection is conjunctive across dimensions and disjunctive within one.
//! An empty set for a dimension means no restriction on it.

use crate::dataset::{Dataset, Dimension, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Accepted values per dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub ciudad: BTreeSet<String>,
    #[serde(default)]
    pub aliado: BTreeSet<String>,
    #[serde(default)]
    pub region: BTreeSet<String>,
}

impl FilterSelection {
    /// Selection with no restriction on any dimension
    pub fn none() -> Self {
        Self::default()
    }

    /// Builder-style: accept `value` for `dimension`
    pub fn with(mut self, dimension: Dimension, value: &str) -> Self {
        self.insert(dimension, value);
        self
    }

    pub fn insert(&mut self, dimension: Dimension, value: &str) {
        self.values_mut(dimension).insert(value.to_string());
    }

    pub fn values(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Ciudad => &self.ciudad,
            Dimension::Aliado => &self.aliado,
            Dimension::Region => &self.region,
        }
    }

    fn values_mut(&mut self, dimension: Dimension) -> &mut BTreeSet<String> {
        match dimension {
            Dimension::Ciudad => &mut self.ciudad,
            Dimension::Aliado => &mut self.aliado,
            Dimension::Region => &mut self.region,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        Dimension::ALL.iter().all(|d| self.values(*d).is_empty())
    }

    /// Whether a record passes every restricted dimension
    pub fn accepts(&self, record: &Record) -> bool {
        Dimension::ALL.iter().all(|d| {
            let accepted = self.values(*d);
            accepted.is_empty() || accepted.contains(record.value(*d))
        })
    }

    /// Parse from a URL query string with repeated keys:
    /// `ciudad=Cali&ciudad=Bogot%C3%A1&region=Valle`.
    ///
    /// Unknown keys are ignored, as are empty values.
    pub fn from_query(query: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        let mut selection = Self::default();
        for (key, value) in pairs {
            let Ok(dimension) = key.parse::<Dimension>() else {
                continue;
            };
            if !value.is_empty() {
                selection.insert(dimension, &value);
            }
        }
        Ok(selection)
    }
}

/// The subset of the base dataset passing a selection, in base order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View<'a> {
    records: Vec<&'a Record>,
}

impl<'a> View<'a> {
    /// Unfiltered view over a whole dataset
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            records: dataset.records().iter().collect(),
        }
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Apply a selection to the base dataset
pub fn apply<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> View<'a> {
    let records = dataset
        .records()
        .iter()
        .filter(|r| selection.accepts(r))
        .collect();
    View { records }
}

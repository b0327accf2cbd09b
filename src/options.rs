//! Selectable filter values, always taken from the unfiltered dataset

use crate::dataset::{Dataset, Dimension};
use serde::Serialize;
use std::collections::BTreeSet;

/// Dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

/// Distinct values of `dimension`, sorted ascending
pub fn options(dataset: &Dataset, dimension: Dimension) -> Vec<String> {
    dataset
        .records()
        .iter()
        .map(|r| r.value(dimension))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn dropdown(values: Vec<String>) -> Vec<FilterOption> {
    values
        .into_iter()
        .map(|v| FilterOption {
            label: v.clone(),
            value: v,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    #[test]
    fn test_options_sorted_and_distinct() {
        let ds = Dataset::new(
            vec![
                Record::new(1, 1, "Medellín", "B", "Antioquia"),
                Record::new(1, 1, "Bogotá", "A", "Centro"),
                Record::new(1, 1, "Medellín", "A", "Antioquia"),
                Record::new(1, 1, "Cali", "C", "Valle"),
            ],
            "test",
        );
        assert_eq!(options(&ds, Dimension::Ciudad), vec!["Bogotá", "Cali", "Medellín"]);
        assert_eq!(options(&ds, Dimension::Aliado), vec!["A", "B", "C"]);
        assert_eq!(options(&ds, Dimension::Region), vec!["Antioquia", "Centro", "Valle"]);
    }

    #[test]
    fn test_options_empty_dataset() {
        let ds = Dataset::new(vec![], "test");
        assert!(options(&ds, Dimension::Ciudad).is_empty());
    }

    #[test]
    fn test_dropdown_label_equals_value() {
        let entries = dropdown(vec!["Cali".to_string()]);
        assert_eq!(
            entries,
            vec![FilterOption {
                label: "Cali".to_string(),
                value: "Cali".to_string()
            }]
        );
    }
}

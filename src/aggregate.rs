//! Grouped sums of `analisis` per category value

use crate::dataset::Dimension;
use crate::error::RenderError;
use crate::filter::View;
use crate::metrics::{checked_sum, percent_of};
use serde::Serialize;
use std::collections::BTreeMap;

/// One category and its summed count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSum {
    pub key: String,
    pub analisis: u64,
    /// Share of the result total, only present for distribution results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<f64>,
}

/// Groups in ascending key order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub dimension: Dimension,
    pub groups: Vec<GroupSum>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total(&self) -> Result<u64, RenderError> {
        checked_sum(self.groups.iter().map(|g| g.analisis), "group totals")
    }

    pub fn get(&self, key: &str) -> Option<&GroupSum> {
        self.groups.iter().find(|g| g.key == key)
    }
}

/// Sum `analisis` per distinct value of `dimension` present in the view
pub fn group_sum(view: &View<'_>, dimension: Dimension) -> Result<AggregationResult, RenderError> {
    let mut sums: BTreeMap<&str, u64> = BTreeMap::new();
    for record in view.records() {
        let entry = sums.entry(record.value(dimension)).or_insert(0);
        *entry = entry
            .checked_add(record.analisis)
            .ok_or(RenderError::Overflow("analisis"))?;
    }

    let groups = sums
        .into_iter()
        .map(|(key, analisis)| GroupSum {
            key: key.to_string(),
            analisis,
            share: None,
        })
        .collect();

    Ok(AggregationResult { dimension, groups })
}

/// Grouped sums plus each group's percentage of the grouped total
pub fn distribution(view: &View<'_>, dimension: Dimension) -> Result<AggregationResult, RenderError> {
    let mut result = group_sum(view, dimension)?;
    let total = result.total()?;
    for group in &mut result.groups {
        group.share = Some(percent_of(group.analisis, total));
    }
    Ok(result)
}

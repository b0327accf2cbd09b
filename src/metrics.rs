//! Top-level scalar summaries of a view

use crate::error::RenderError;
use crate::filter::View;
use serde::Serialize;

/// Raw metric values; formatting belongs to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// analyzed_total / target_total * 100, or 0 when there is no target
    pub percentage: f64,
    pub target_total: u64,
    pub analyzed_total: u64,
}

impl Summary {
    pub fn zero() -> Self {
        Self {
            percentage: 0.0,
            target_total: 0,
            analyzed_total: 0,
        }
    }
}

/// `part / whole * 100`, defined as 0 when `whole` is 0
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Overflow-checked sum of one numeric field
pub(crate) fn checked_sum<I>(values: I, what: &'static str) -> Result<u64, RenderError>
where
    I: IntoIterator<Item = u64>,
{
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or(RenderError::Overflow(what))
}

pub fn summarize(view: &View<'_>) -> Result<Summary, RenderError> {
    let target_total = checked_sum(view.records().iter().map(|r| r.total_po), "total_po")?;
    let analyzed_total = checked_sum(view.records().iter().map(|r| r.analisis), "analisis")?;

    Ok(Summary {
        percentage: percent_of(analyzed_total, target_total),
        target_total,
        analyzed_total,
    })
}

//! One dashboard update per filter selection
//!
//! `Dashboard` owns the base dataset and recomputes everything from it on
//! every call. `render` is the boundary the server and CLI use: it never
//! fails, degrading to zero metrics and empty charts instead.

use crate::aggregate::{distribution, group_sum};
use crate::chart::{build, format_share, ChartKind, ChartSpec};
use crate::dataset::{Dataset, Dimension};
use crate::error::RenderError;
use crate::filter::{apply, FilterSelection};
use crate::metrics::{summarize, Summary};
use crate::options::{dropdown, options, FilterOption};
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error};

/// Pre-formatted values for the three summary cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCards {
    /// One decimal place with a `%` suffix
    pub percentage: String,
    /// Thousands-separated
    pub target_total: String,
    /// Thousands-separated
    pub analyzed_total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub by_city: ChartSpec,
    pub by_partner: ChartSpec,
    pub partner_share: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub ciudad: Vec<FilterOption>,
    pub aliado: Vec<FilterOption>,
    pub region: Vec<FilterOption>,
}

impl FilterOptions {
    pub fn empty() -> Self {
        Self {
            ciudad: vec![],
            aliado: vec![],
            region: vec![],
        }
    }

    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            ciudad: dropdown(options(dataset, Dimension::Ciudad)),
            aliado: dropdown(options(dataset, Dimension::Aliado)),
            region: dropdown(options(dataset, Dimension::Region)),
        }
    }
}

/// Everything the page needs after a selection change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardUpdate {
    pub cards: MetricCards,
    pub summary: Summary,
    pub charts: DashboardCharts,
    pub options: FilterOptions,
    /// Number of records that passed the selection
    pub matched: usize,
    /// False when this is the fallback update
    pub computed: bool,
}

impl DashboardUpdate {
    /// Safe default shown when a recompute fails
    pub fn fallback() -> Self {
        Self {
            cards: MetricCards {
                percentage: "0%".to_string(),
                target_total: "0".to_string(),
                analyzed_total: "0".to_string(),
            },
            summary: Summary::zero(),
            charts: DashboardCharts {
                by_city: ChartSpec::empty(),
                by_partner: ChartSpec::empty(),
                partner_share: ChartSpec::empty(),
            },
            options: FilterOptions::empty(),
            matched: 0,
            computed: false,
        }
    }
}

/// Integer with `,` between groups of three digits
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl MetricCards {
    pub fn from_summary(summary: &Summary) -> Self {
        Self {
            percentage: format_share(summary.percentage),
            target_total: format_thousands(summary.target_total),
            analyzed_total: format_thousands(summary.analyzed_total),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The filter-aggregate-render pipeline over one immutable dataset
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Option lists for every dimension; independent of any selection
    pub fn options(&self) -> FilterOptions {
        FilterOptions::from_dataset(&self.dataset)
    }

    /// Run the full pipeline for one selection
    pub fn compute(&self, selection: &FilterSelection) -> Result<DashboardUpdate, RenderError> {
        let view = apply(&self.dataset, selection);
        let summary = summarize(&view)?;

        let by_city = group_sum(&view, Dimension::Ciudad)?;
        let by_partner = group_sum(&view, Dimension::Aliado)?;
        let partner_share = distribution(&view, Dimension::Aliado)?;

        Ok(DashboardUpdate {
            cards: MetricCards::from_summary(&summary),
            summary,
            charts: DashboardCharts {
                by_city: build(&by_city, ChartKind::CityBars),
                by_partner: build(&by_partner, ChartKind::PartnerLine),
                partner_share: build(&partner_share, ChartKind::PartnerShare),
            },
            options: self.options(),
            matched: view.len(),
            computed: true,
        })
    }

    /// Like `compute`, but failures and panics become the fallback update
    pub fn render(&self, selection: &FilterSelection) -> DashboardUpdate {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.compute(selection)))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(update) => {
                debug!(matched = update.matched, "dashboard recomputed");
                update
            }
            Err(e) => {
                error!(error = %e, ?selection, "dashboard recompute failed, showing defaults");
                DashboardUpdate::fallback()
            }
        }
    }
}

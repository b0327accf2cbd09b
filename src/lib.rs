//! Tablero - filterable analytics dashboard over a SQLite table
//!
//! Loads `analisis`/`total_po` records once, then recomputes summary metrics,
//! three chart descriptions and the filter option lists for every selection.
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | load with fallback | [`loader`] |
//! | filter by ciudad / aliado / region | [`filter`] |
//! | percentage and totals | [`metrics`] |
//! | grouped sums and shares | [`aggregate`] |
//! | chart descriptions | [`chart`] |
//! | option lists | [`options`] |
//! | one atomic update | [`dashboard`] |
//!
//! # Quick Start
//!
//! ```
//! use tablero::{Dashboard, Dimension, FilterSelection, Loader, SampleSource};
//!
//! let dataset = Loader::new().with_source(SampleSource).load().unwrap();
//! let dashboard = Dashboard::new(dataset);
//!
//! let update = dashboard.render(&FilterSelection::none().with(Dimension::Ciudad, "Cali"));
//! assert_eq!(update.cards.analyzed_total, "180");
//! assert_eq!(update.options.ciudad.len(), 3);
//! ```

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod db;
pub mod error;
pub mod filter;
pub mod init;
pub mod loader;
pub mod metrics;
pub mod options;
pub mod serve;

pub use aggregate::{distribution, group_sum, AggregationResult, GroupSum};
pub use chart::{ChartKind, ChartSpec, ChartType};
pub use config::{ConnectionTarget, FileConfig, Settings};
pub use dashboard::{Dashboard, DashboardUpdate, MetricCards};
pub use dataset::{Dataset, Dimension, Record};
pub use error::{ConfigError, LoadError, RenderError, SourceError};
pub use filter::{apply, FilterSelection, View};
pub use loader::{DataSource, FixtureSource, Loader, SampleSource, SqliteSource};
pub use metrics::{summarize, Summary};
pub use options::options;

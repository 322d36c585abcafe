//! CohortLens - analytical core for a veteran health survey dashboard.
//!
//! Loads two cohort files (female and male respondents) into an immutable
//! dataset, filters it by population, region and age, and resolves
//! grouping/metric queries into aggregate tables plus rendering-agnostic
//! chart specifications.
//!
//! ```no_run
//! use cohortlens::analysis::{filter, FilterSelection};
//! use cohortlens::config::Config;
//! use cohortlens::data::{CodeBook, DataSources, Decoder, SharedDataset};
//! use cohortlens::models::CohortMode;
//! use cohortlens::resolver::{AggregationQuery, Resolver};
//!
//! static DATASET: SharedDataset = SharedDataset::new();
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load_default()?.unwrap_or_default();
//! let codebook = CodeBook::brfss_2024();
//! let decoder = Decoder::new(&codebook)
//!     .with_max_valid_days(config.thresholds.max_valid_days);
//! let dataset = DATASET.get_or_load(&DataSources::from(&config.data), &decoder)?;
//!
//! let selection = FilterSelection::new(CohortMode::Compare).with_ages(["18-24", "25-29"]);
//! let records = filter(dataset.records(), &selection);
//!
//! let resolver = Resolver::new(&codebook, &config.style, &config.thresholds);
//! let query = AggregationQuery::new("State_Name", "Mental_Health_Days").split(true);
//! let resolution = resolver.resolve(&records, selection.cohort_mode, &query)?;
//! println!("{}", serde_json::to_string_pretty(&resolution)?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod resolver;

pub use error::{LoadError, ResolveError, UnknownChartKind};
pub use resolver::{AggregationQuery, Resolution, Resolver};

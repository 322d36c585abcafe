//! Analysis modules.
//!
//! Filtering, grouped aggregation, cohort comparison and rankings over the
//! decoded record set.

pub mod aggregator;
pub mod compare;
pub mod filter;
pub mod insights;

pub use aggregator::{aggregate, mean, top_n, Aggregation, SortDirection};
pub use compare::{compare_cohorts, ratio, region_gaps, CohortComparison, CohortProfile, RegionGap};
pub use filter::{filter, DimensionSelection, FilterSelection, ALL_AGES, ALL_REGIONS};
pub use insights::{importance_by_category, ranked_features};

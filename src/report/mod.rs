//! Shareable summaries of a resolved query.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, write_json_report, write_report};

use crate::analysis::CohortComparison;
use crate::config::FeatureImportance;
use crate::models::CohortMode;
use crate::resolver::{AggregationQuery, Resolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context a report was produced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub cohort_mode: CohortMode,
    /// Records in the loaded dataset.
    pub dataset_records: usize,
    /// Records left after filtering.
    pub filtered_records: usize,
    pub query: AggregationQuery,
}

/// A resolution plus optional supporting statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub resolution: Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<CohortComparison>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_features: Vec<FeatureImportance>,
}

impl Report {
    pub fn new(metadata: ReportMetadata, resolution: Resolution) -> Self {
        Self {
            metadata,
            resolution,
            comparison: None,
            top_features: Vec::new(),
        }
    }

    pub fn with_comparison(mut self, comparison: CohortComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn with_features(mut self, features: Vec<FeatureImportance>) -> Self {
        self.top_features = features;
        self
    }
}

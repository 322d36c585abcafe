//! Query resolution.
//!
//! Turns a user query over a filtered record set into an aggregate table
//! and the chart that presents it.

use crate::analysis::{
    aggregate, compare_cohorts, region_gaps, Aggregation, CohortComparison, RegionGap,
    SortDirection,
};
use crate::chart::{ChartKind, ChartSpec, ChartStyle};
use crate::config::{StyleConfig, ThresholdConfig};
use crate::data::CodeBook;
use crate::error::ResolveError;
use crate::models::{AggregateTable, CohortMode, Dimension, Metric, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationQuery {
    /// Schema name of the grouping variable, e.g. `Age_Group`.
    pub grouping: String,
    /// Schema name of the metric, e.g. `Mental_Health_Days`.
    pub metric: String,
    #[serde(default)]
    pub split_by_cohort: bool,
    #[serde(default)]
    pub chart: ChartKind,
    #[serde(default)]
    pub sort: SortDirection,
}

impl AggregationQuery {
    pub fn new(grouping: impl Into<String>, metric: impl Into<String>) -> Self {
        Self {
            grouping: grouping.into(),
            metric: metric.into(),
            split_by_cohort: false,
            chart: ChartKind::default(),
            sort: SortDirection::default(),
        }
    }

    pub fn split(mut self, split_by_cohort: bool) -> Self {
        self.split_by_cohort = split_by_cohort;
        self
    }

    pub fn chart(mut self, chart: ChartKind) -> Self {
        self.chart = chart;
        self
    }

    pub fn sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }
}

/// Aggregate table plus the chart that presents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub table: AggregateTable,
    pub chart: ChartSpec,
}

/// Resolves queries against injected lookup data, palette and thresholds.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    codebook: &'a CodeBook,
    style: &'a StyleConfig,
    thresholds: &'a ThresholdConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        codebook: &'a CodeBook,
        style: &'a StyleConfig,
        thresholds: &'a ThresholdConfig,
    ) -> Self {
        Self {
            codebook,
            style,
            thresholds,
        }
    }

    /// Resolve a query over an already filtered record set.
    ///
    /// Unknown variable names are an error; an empty record set is not and
    /// yields an empty table with a no-data chart.
    pub fn resolve(
        &self,
        records: &[&Record],
        cohort_mode: CohortMode,
        query: &AggregationQuery,
    ) -> Result<Resolution, ResolveError> {
        let grouping: Dimension = query.grouping.parse().map_err(ResolveError::grouping)?;
        let metric: Metric = query.metric.parse().map_err(ResolveError::metric)?;

        let present: BTreeSet<_> = records.iter().map(|r| r.cohort).collect();
        let split_by_cohort = query.split_by_cohort && present.len() >= 2;
        if query.split_by_cohort && !split_by_cohort {
            debug!(
                "Split by cohort requested but {} cohort(s) present, not splitting",
                present.len()
            );
        }

        let table = aggregate(
            records,
            self.codebook,
            Aggregation {
                grouping,
                metric,
                split_by_cohort,
                direction: query.sort,
            },
        );

        let style = ChartStyle::new(self.style, cohort_mode);
        let chart = query.chart.build(&table, &style);

        info!(
            "Resolved {} of {} by {}: {} rows from {} records",
            query.chart,
            metric,
            grouping,
            table.rows.len(),
            records.len()
        );

        Ok(Resolution { table, chart })
    }

    /// Cohort profiles and ratios using the configured distress threshold.
    pub fn compare(&self, records: &[&Record]) -> CohortComparison {
        compare_cohorts(records, self.thresholds)
    }

    /// Largest regional gaps of a metric, up to the configured limit.
    pub fn region_gaps(
        &self,
        records: &[&Record],
        metric: &str,
    ) -> Result<Vec<RegionGap>, ResolveError> {
        let metric: Metric = metric.parse().map_err(ResolveError::metric)?;
        Ok(region_gaps(records, metric, self.thresholds.region_gap_limit))
    }
}

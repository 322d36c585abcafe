//! Grouped aggregation and rankings.
//!
//! This module partitions filtered records by a dimension (optionally
//! jointly with the cohort), reduces a metric per partition and orders
//! the resulting rows.

use crate::data::CodeBook;
use crate::models::{AggregateRow, AggregateTable, Cohort, Dimension, Metric, Record, Spread};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Direction of metric-based ordering.
///
/// `Ascending` serves "lowest burden" views, `Descending` "highest burden".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Compare two defined means in this direction.
    fn compare(&self, a: f64, b: f64) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    /// Compare possibly-undefined means; undefined always sorts last.
    fn compare_opt(&self, a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.compare(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Records of one partition.
#[derive(Debug, Default)]
struct Partition {
    values: Vec<f64>,
    records: usize,
}

impl Partition {
    fn into_row(self, group: String, cohort: Option<Cohort>) -> AggregateRow {
        let Partition { mut values, records } = self;
        let count = values.len();
        let mean = mean(&values);
        let spread = spread(&mut values);
        AggregateRow {
            group,
            cohort,
            mean,
            count,
            records,
            spread,
        }
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Five-number summary; sorts `values` in place.
pub fn spread(values: &mut [f64]) -> Option<Spread> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(Spread {
        min: values[0],
        q1: quantile(values, 0.25),
        median: quantile(values, 0.5),
        q3: quantile(values, 0.75),
        max: values[values.len() - 1],
    })
}

/// Parameters of one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregation {
    pub grouping: Dimension,
    pub metric: Metric,
    pub split_by_cohort: bool,
    pub direction: SortDirection,
}

/// Partition, reduce and order.
///
/// Records without a label for the grouping dimension are skipped. When the
/// dimension has a canonical order, labels outside it are skipped too and
/// rows follow that order; otherwise rows are sorted by mean.
pub fn aggregate(records: &[&Record], codebook: &CodeBook, spec: Aggregation) -> AggregateTable {
    let order = codebook.canonical_order(spec.grouping);
    let mut partitions: HashMap<(String, Option<Cohort>), Partition> = HashMap::new();

    for record in records {
        let Some(label) = record.label(spec.grouping) else {
            continue;
        };
        if let Some(order) = order {
            if !order.iter().any(|o| o == label) {
                continue;
            }
        }
        let cohort = spec.split_by_cohort.then_some(record.cohort);
        let partition = partitions.entry((label.to_string(), cohort)).or_default();
        partition.records += 1;
        if let Some(value) = record.metric(spec.metric) {
            partition.values.push(value);
        }
    }

    let mut rows: Vec<AggregateRow> = partitions
        .into_iter()
        .map(|((group, cohort), partition)| partition.into_row(group, cohort))
        .collect();

    match order {
        Some(order) => {
            let rank: HashMap<&str, usize> = order
                .iter()
                .enumerate()
                .map(|(i, label)| (label.as_str(), i))
                .collect();
            rows.sort_by(|a, b| {
                rank[a.group.as_str()]
                    .cmp(&rank[b.group.as_str()])
                    .then(a.cohort.cmp(&b.cohort))
            });
        }
        None => sort_by_metric(&mut rows, spec.direction),
    }

    debug!(
        "Aggregated {} by {} into {} rows",
        spec.metric,
        spec.grouping,
        rows.len()
    );

    AggregateTable {
        grouping: spec.grouping,
        metric: spec.metric,
        split_by_cohort: spec.split_by_cohort,
        rows,
    }
}

/// Order rows by mean. Split rows are ordered by the pooled mean of their
/// label so each label's cohorts stay adjacent.
fn sort_by_metric(rows: &mut [AggregateRow], direction: SortDirection) {
    let mut pooled: HashMap<String, (f64, usize)> = HashMap::new();
    for row in rows.iter() {
        let entry = pooled.entry(row.group.clone()).or_insert((0.0, 0));
        if let Some(mean) = row.mean {
            entry.0 += mean * row.count as f64;
            entry.1 += row.count;
        }
    }
    let pooled_mean = |label: &str| -> Option<f64> {
        pooled
            .get(label)
            .filter(|(_, n)| *n > 0)
            .map(|(sum, n)| sum / *n as f64)
    };

    rows.sort_by(|a, b| {
        direction
            .compare_opt(pooled_mean(&a.group), pooled_mean(&b.group))
            .then_with(|| a.group.cmp(&b.group))
            .then(a.cohort.cmp(&b.cohort))
    });
}

/// The `n` rows with the most extreme defined means.
///
/// Rows with an undefined mean never qualify, so fewer than `n` rows may be
/// returned.
pub fn top_n(table: &AggregateTable, n: usize, direction: SortDirection) -> Vec<AggregateRow> {
    let mut defined: Vec<AggregateRow> = table
        .rows
        .iter()
        .filter(|r| r.is_defined())
        .cloned()
        .collect();

    defined.sort_by(|a, b| direction.compare_opt(a.mean, b.mean));
    defined.truncate(n);
    defined
}

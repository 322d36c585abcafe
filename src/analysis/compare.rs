//! Cohort comparison statistics.
//!
//! Headline rates per cohort, female/male ratios and per-region gaps.
//! Any quantity over an empty set, and any ratio with an undefined or zero
//! denominator, is `None`.

use super::aggregator::mean;
use crate::config::ThresholdConfig;
use crate::data::codebook::{NO, YES};
use crate::models::{Cohort, Metric, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// `numerator / denominator`, undefined when the denominator is undefined or zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 && d.is_finite() => Some(n / d),
        _ => None,
    }
}

/// Percentage of records for which `pred` holds, `None` for no records.
fn rate<'a, I, F>(records: I, pred: F) -> Option<f64>
where
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> bool,
{
    let (hits, total) = records
        .into_iter()
        .fold((0usize, 0usize), |(h, t), r| (h + pred(r) as usize, t + 1));
    (total > 0).then(|| hits as f64 / total as f64 * 100.0)
}

/// Headline statistics for one population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortProfile {
    pub records: usize,
    /// Percent with a depression diagnosis.
    pub depression_rate: Option<f64>,
    pub avg_mental_health_days: Option<f64>,
    /// Percent at or above the distress threshold. Missing days count as
    /// not distressed.
    pub frequent_distress_rate: Option<f64>,
    /// Percent without health coverage.
    pub uninsured_rate: Option<f64>,
    /// Percent who skipped care because of cost.
    pub cost_barrier_rate: Option<f64>,
}

impl CohortProfile {
    pub fn from_records(records: &[&Record], thresholds: &ThresholdConfig) -> Self {
        let days: Vec<f64> = records
            .iter()
            .filter_map(|r| r.metric(Metric::MentalHealthDays))
            .collect();

        Self {
            records: records.len(),
            depression_rate: rate(records.iter().copied(), |r| {
                r.depression.as_deref() == Some(YES)
            }),
            avg_mental_health_days: mean(&days),
            frequent_distress_rate: rate(records.iter().copied(), |r| {
                r.metric(Metric::MentalHealthDays)
                    .is_some_and(|d| d >= thresholds.distress_days)
            }),
            uninsured_rate: rate(records.iter().copied(), |r| {
                r.has_insurance.as_deref() == Some(NO)
            }),
            cost_barrier_rate: rate(records.iter().copied(), |r| {
                r.cost_barrier.as_deref() == Some(YES)
            }),
        }
    }
}

/// Female/male ratios of each headline statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRatios {
    pub depression: Option<f64>,
    pub mental_health_days: Option<f64>,
    pub frequent_distress: Option<f64>,
    pub uninsured: Option<f64>,
}

/// Side-by-side profiles of the two cohorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortComparison {
    pub female: CohortProfile,
    pub male: CohortProfile,
    pub ratios: CohortRatios,
}

/// Profile each cohort within the records and compute female/male ratios.
pub fn compare_cohorts(records: &[&Record], thresholds: &ThresholdConfig) -> CohortComparison {
    let of = |cohort: Cohort| {
        records
            .iter()
            .copied()
            .filter(|r| r.cohort == cohort)
            .collect::<Vec<_>>()
    };
    let female = CohortProfile::from_records(&of(Cohort::Female), thresholds);
    let male = CohortProfile::from_records(&of(Cohort::Male), thresholds);

    let ratios = CohortRatios {
        depression: ratio(female.depression_rate, male.depression_rate),
        mental_health_days: ratio(female.avg_mental_health_days, male.avg_mental_health_days),
        frequent_distress: ratio(female.frequent_distress_rate, male.frequent_distress_rate),
        uninsured: ratio(female.uninsured_rate, male.uninsured_rate),
    };

    CohortComparison {
        female,
        male,
        ratios,
    }
}

/// Difference between cohort means of a metric within one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGap {
    pub region: String,
    pub female_mean: f64,
    pub male_mean: f64,
    /// Female mean minus male mean.
    pub difference: f64,
}

/// Regions with the largest female-minus-male gap, largest first.
///
/// Regions where either cohort has no usable values are left out.
pub fn region_gaps(records: &[&Record], metric: Metric, limit: usize) -> Vec<RegionGap> {
    let mut values: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let (Some(region), Some(value)) = (record.region.as_deref(), record.metric(metric)) else {
            continue;
        };
        let entry = values.entry(region).or_default();
        match record.cohort {
            Cohort::Female => entry.0.push(value),
            Cohort::Male => entry.1.push(value),
        }
    }

    let mut gaps: Vec<RegionGap> = values
        .into_iter()
        .filter_map(|(region, (female, male))| {
            let female_mean = mean(&female)?;
            let male_mean = mean(&male)?;
            Some(RegionGap {
                region: region.to_string(),
                female_mean,
                male_mean,
                difference: female_mean - male_mean,
            })
        })
        .collect();

    gaps.sort_by(|a, b| {
        b.difference
            .partial_cmp(&a.difference)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    gaps.truncate(limit);

    debug!("Computed {} region gaps for {}", gaps.len(), metric);
    gaps
}

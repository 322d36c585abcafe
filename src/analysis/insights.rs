//! Ranking of externally supplied feature importances.

use crate::config::FeatureImportance;
use std::cmp::Ordering;

/// The `n` most important features, highest first. Ties keep input order.
pub fn ranked_features(features: &[FeatureImportance], n: usize) -> Vec<FeatureImportance> {
    let mut ranked = features.to_vec();
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

/// Total importance per category, highest first.
pub fn importance_by_category(features: &[FeatureImportance]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for feature in features {
        match totals.iter_mut().find(|(c, _)| *c == feature.category) {
            Some((_, total)) => *total += feature.importance,
            None => totals.push((feature.category.clone(), feature.importance)),
        }
    }
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    totals
}

//! Raw-code decoding.
//!
//! Turns [`RawRecord`]s into [`Record`]s using an injected [`CodeBook`].
//! Unknown codes never fail a row; the field is left empty and counted.

use super::codebook::{CodeBook, NO, YES};
use crate::models::{Cohort, Dimension, RawRecord, Record};
use std::collections::BTreeMap;
use tracing::trace;

/// Default upper bound of a valid day count.
pub const DEFAULT_MAX_VALID_DAYS: f64 = 30.0;

/// Per-dimension tally of codes the code book could not decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub unknown_codes: BTreeMap<Dimension, usize>,
}

impl DecodeStats {
    pub fn total_unknown(&self) -> usize {
        self.unknown_codes.values().sum()
    }

    pub fn merge(&mut self, other: &DecodeStats) {
        for (dim, count) in &other.unknown_codes {
            *self.unknown_codes.entry(*dim).or_insert(0) += count;
        }
    }
}

/// Decoder bound to a code book and a day-count ceiling.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    codebook: &'a CodeBook,
    max_valid_days: f64,
}

impl<'a> Decoder<'a> {
    pub fn new(codebook: &'a CodeBook) -> Self {
        Self {
            codebook,
            max_valid_days: DEFAULT_MAX_VALID_DAYS,
        }
    }

    /// Override the ceiling above which day counts become missing.
    pub fn with_max_valid_days(mut self, max_valid_days: f64) -> Self {
        self.max_valid_days = max_valid_days;
        self
    }

    /// Decode one raw row of the given cohort.
    pub fn decode(&self, raw: &RawRecord, cohort: Cohort, stats: &mut DecodeStats) -> Record {
        let mut label = |dim: Dimension, value: Option<f64>| self.lookup(dim, value, stats);

        Record {
            cohort,
            region: label(Dimension::Region, raw.state),
            age_group: label(Dimension::AgeGroup, raw.age_group),
            income_group: label(Dimension::IncomeGroup, raw.income_group),
            employment: label(Dimension::Employment, raw.employment),
            marital: label(Dimension::Marital, raw.marital),
            education: label(Dimension::Education, raw.education),
            general_health: label(Dimension::GeneralHealth, raw.general_health),
            emotional_support: label(Dimension::EmotionalSupport, raw.emotional_support),
            life_satisfaction: label(Dimension::LifeSatisfaction, raw.life_satisfaction),
            depression: Some(yes_no(raw.depression)),
            has_insurance: Some(yes_no(raw.insurance)),
            has_doctor: Some(yes_no(raw.personal_doctor)),
            cost_barrier: Some(yes_no(raw.cost_barrier)),
            mental_health_days: self.clamp_days(raw.mental_health_days),
            physical_health_days: self.clamp_days(raw.physical_health_days),
            raw: raw.clone(),
        }
    }

    fn lookup(
        &self,
        dimension: Dimension,
        value: Option<f64>,
        stats: &mut DecodeStats,
    ) -> Option<String> {
        let value = value?;
        let label = as_code(value)
            .and_then(|code| self.codebook.table(dimension)?.decode(code))
            .map(String::from);

        if label.is_none() {
            trace!("Unknown {} code: {}", dimension, value);
            *stats.unknown_codes.entry(dimension).or_insert(0) += 1;
        }
        label
    }

    /// Day counts outside `0..=max_valid_days` are missing.
    pub fn clamp_days(&self, value: Option<f64>) -> Option<f64> {
        value.filter(|v| v.is_finite() && (0.0..=self.max_valid_days).contains(v))
    }
}

/// Integer code of a raw cell, `None` for NaN or fractional values.
fn as_code(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Binary flags: code 1 is "Yes", anything else (absent included) is "No".
fn yes_no(value: Option<f64>) -> String {
    match value {
        Some(v) if v == 1.0 => YES.to_string(),
        _ => NO.to_string(),
    }
}

//! Cohort filter.
//!
//! Reduces the record set to the active population selection. The filter
//! never mutates records and keeps survivors in their original order.

use crate::models::{CohortMode, Dimension, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Sentinel choice meaning "no region filtering".
pub const ALL_REGIONS: &str = "All States";

/// Sentinel choice meaning "no age filtering".
pub const ALL_AGES: &str = "All Ages";

/// Selected values of one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DimensionSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl DimensionSelection {
    /// Build a selection from raw multi-select choices.
    ///
    /// An empty list, or any list containing the sentinel, selects everything.
    pub fn from_choices<I, S>(choices: I, sentinel: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chosen: BTreeSet<String> = choices.into_iter().map(Into::into).collect();
        if chosen.is_empty() || chosen.contains(sentinel) {
            DimensionSelection::All
        } else {
            DimensionSelection::Only(chosen)
        }
    }

    /// Whether a decoded label passes this selection.
    pub fn matches(&self, label: Option<&str>) -> bool {
        match self {
            DimensionSelection::All => true,
            DimensionSelection::Only(values) => label.is_some_and(|l| values.contains(l)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DimensionSelection::All)
    }
}

/// Active population selection for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub cohort_mode: CohortMode,
    #[serde(default)]
    pub regions: DimensionSelection,
    #[serde(default)]
    pub ages: DimensionSelection,
}

impl FilterSelection {
    pub fn new(cohort_mode: CohortMode) -> Self {
        Self {
            cohort_mode,
            regions: DimensionSelection::All,
            ages: DimensionSelection::All,
        }
    }

    /// Set regions from multi-select choices (see [`ALL_REGIONS`]).
    pub fn with_regions<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = DimensionSelection::from_choices(choices, ALL_REGIONS);
        self
    }

    /// Set age brackets from multi-select choices (see [`ALL_AGES`]).
    pub fn with_ages<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ages = DimensionSelection::from_choices(choices, ALL_AGES);
        self
    }

    /// Whether a single record passes every dimension of the selection.
    pub fn accepts(&self, record: &Record) -> bool {
        let cohort_ok = self
            .cohort_mode
            .single_cohort()
            .map_or(true, |c| record.cohort == c);

        cohort_ok
            && self.regions.matches(record.label(Dimension::Region))
            && self.ages.matches(record.label(Dimension::AgeGroup))
    }
}

/// Keep the records matching the selection.
pub fn filter<'a, I>(records: I, selection: &FilterSelection) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = 0usize;
    let kept: Vec<&Record> = records
        .into_iter()
        .inspect(|_| seen += 1)
        .filter(|r| selection.accepts(r))
        .collect();

    debug!(
        "Filter {:?}: kept {} of {} records",
        selection.cohort_mode,
        kept.len(),
        seen
    );
    kept
}

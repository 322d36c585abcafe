//! Data models for the survey dashboard core.
//!
//! This module contains the core data structures used throughout the
//! crate: cohorts, the grouping and metric variables, decoded respondent
//! records and the aggregate rows produced per query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the two fixed populations being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cohort {
    Female,
    Male,
}

impl Cohort {
    /// Both cohorts, in canonical display order.
    pub const ALL: [Cohort; 2] = [Cohort::Female, Cohort::Male];

    /// Returns the display label used in tables and series names.
    pub fn label(&self) -> &'static str {
        match self {
            Cohort::Female => "Female",
            Cohort::Male => "Male",
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Active population selection.
///
/// `All` and `Compare` keep both cohorts; they only differ in how the
/// renderer presents the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortMode {
    #[default]
    FemaleOnly,
    MaleOnly,
    All,
    Compare,
}

impl CohortMode {
    /// The single cohort this mode restricts to, if any.
    pub fn single_cohort(&self) -> Option<Cohort> {
        match self {
            CohortMode::FemaleOnly => Some(Cohort::Female),
            CohortMode::MaleOnly => Some(Cohort::Male),
            CohortMode::All | CohortMode::Compare => None,
        }
    }
}

/// Error returned when a variable name is not part of the decoded schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variable '{0}'")]
pub struct UnknownVariable(pub String);

/// Categorical variable a record set can be partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Region,
    AgeGroup,
    IncomeGroup,
    Employment,
    Marital,
    Education,
    GeneralHealth,
    EmotionalSupport,
    LifeSatisfaction,
    Depression,
    HasInsurance,
    HasDoctor,
    CostBarrier,
    Gender,
}

impl Dimension {
    pub const ALL: [Dimension; 14] = [
        Dimension::Region,
        Dimension::AgeGroup,
        Dimension::IncomeGroup,
        Dimension::Employment,
        Dimension::Marital,
        Dimension::Education,
        Dimension::GeneralHealth,
        Dimension::EmotionalSupport,
        Dimension::LifeSatisfaction,
        Dimension::Depression,
        Dimension::HasInsurance,
        Dimension::HasDoctor,
        Dimension::CostBarrier,
        Dimension::Gender,
    ];

    /// Schema name of the decoded column.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Region => "State_Name",
            Dimension::AgeGroup => "Age_Group",
            Dimension::IncomeGroup => "Income_Group",
            Dimension::Employment => "Employment",
            Dimension::Marital => "Marital",
            Dimension::Education => "Education",
            Dimension::GeneralHealth => "General_Health",
            Dimension::EmotionalSupport => "Emotional_Support",
            Dimension::LifeSatisfaction => "Life_Satisfaction",
            Dimension::Depression => "Depression",
            Dimension::HasInsurance => "Has_Insurance",
            Dimension::HasDoctor => "Has_Doctor",
            Dimension::CostBarrier => "Cost_Barrier",
            Dimension::Gender => "Gender",
        }
    }

    /// Whether the dimension is decoded from a yes/no flag.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Dimension::Depression
                | Dimension::HasInsurance
                | Dimension::HasDoctor
                | Dimension::CostBarrier
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dimension {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownVariable(s.to_string()))
    }
}

/// Numeric day-count variable averaged within each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    MentalHealthDays,
    PhysicalHealthDays,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::MentalHealthDays, Metric::PhysicalHealthDays];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::MentalHealthDays => "Mental_Health_Days",
            Metric::PhysicalHealthDays => "Physical_Health_Days",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Metric {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownVariable(s.to_string()))
    }
}

/// Turns a schema name into its display form (`Age_Group` -> `Age Group`).
pub fn humanize(name: &str) -> String {
    name.replace('_', " ")
}

/// Raw coded fields of one survey row, as written in the cohort files.
///
/// Codes are kept as floats because the cleaned files store them that way
/// (`6.0`); conversion to integer codes happens in the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "_STATE")]
    pub state: Option<f64>,
    #[serde(rename = "_AGEG5YR")]
    pub age_group: Option<f64>,
    #[serde(rename = "_INCOMG1")]
    pub income_group: Option<f64>,
    #[serde(rename = "EMPLOY1")]
    pub employment: Option<f64>,
    #[serde(rename = "MARITAL")]
    pub marital: Option<f64>,
    #[serde(rename = "EDUCA")]
    pub education: Option<f64>,
    #[serde(rename = "GENHLTH")]
    pub general_health: Option<f64>,
    #[serde(rename = "EMTSUPRT")]
    pub emotional_support: Option<f64>,
    #[serde(rename = "LSATISFY")]
    pub life_satisfaction: Option<f64>,
    #[serde(rename = "ADDEPEV3")]
    pub depression: Option<f64>,
    #[serde(rename = "_HLTHPL2")]
    pub insurance: Option<f64>,
    #[serde(rename = "PERSDOC3")]
    pub personal_doctor: Option<f64>,
    #[serde(rename = "MEDCOST1")]
    pub cost_barrier: Option<f64>,
    #[serde(rename = "MENTHLTH")]
    pub mental_health_days: Option<f64>,
    #[serde(rename = "PHYSHLTH")]
    pub physical_health_days: Option<f64>,
}

/// One decoded respondent.
///
/// Labels are `None` when the raw code was absent or not in the code book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub cohort: Cohort,
    pub raw: RawRecord,
    pub region: Option<String>,
    pub age_group: Option<String>,
    pub income_group: Option<String>,
    pub employment: Option<String>,
    pub marital: Option<String>,
    pub education: Option<String>,
    pub general_health: Option<String>,
    pub emotional_support: Option<String>,
    pub life_satisfaction: Option<String>,
    pub depression: Option<String>,
    pub has_insurance: Option<String>,
    pub has_doctor: Option<String>,
    pub cost_barrier: Option<String>,
    pub mental_health_days: Option<f64>,
    pub physical_health_days: Option<f64>,
}

impl Record {
    /// Creates a record with no decoded fields.
    pub fn empty(cohort: Cohort) -> Self {
        Self {
            cohort,
            raw: RawRecord::default(),
            region: None,
            age_group: None,
            income_group: None,
            employment: None,
            marital: None,
            education: None,
            general_health: None,
            emotional_support: None,
            life_satisfaction: None,
            depression: None,
            has_insurance: None,
            has_doctor: None,
            cost_barrier: None,
            mental_health_days: None,
            physical_health_days: None,
        }
    }

    /// Decoded label of a dimension.
    pub fn label(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Region => self.region.as_deref(),
            Dimension::AgeGroup => self.age_group.as_deref(),
            Dimension::IncomeGroup => self.income_group.as_deref(),
            Dimension::Employment => self.employment.as_deref(),
            Dimension::Marital => self.marital.as_deref(),
            Dimension::Education => self.education.as_deref(),
            Dimension::GeneralHealth => self.general_health.as_deref(),
            Dimension::EmotionalSupport => self.emotional_support.as_deref(),
            Dimension::LifeSatisfaction => self.life_satisfaction.as_deref(),
            Dimension::Depression => self.depression.as_deref(),
            Dimension::HasInsurance => self.has_insurance.as_deref(),
            Dimension::HasDoctor => self.has_doctor.as_deref(),
            Dimension::CostBarrier => self.cost_barrier.as_deref(),
            Dimension::Gender => Some(self.cohort.label()),
        }
    }

    /// Clamped metric value, `None` when missing.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::MentalHealthDays => self.mental_health_days,
            Metric::PhysicalHealthDays => self.physical_health_days,
        }
    }
}

/// Five-number summary of the metric values in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// One partition of an aggregate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Decoded label of the grouping dimension.
    pub group: String,
    /// Secondary grouping, present only for cohort-split tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohort: Option<Cohort>,
    /// Mean of the non-missing metric values; `None` means undefined.
    pub mean: Option<f64>,
    /// Number of non-missing metric values.
    pub count: usize,
    /// Number of records in the partition, missing metric included.
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<Spread>,
}

impl AggregateRow {
    /// Whether the row has a usable mean.
    pub fn is_defined(&self) -> bool {
        self.mean.is_some()
    }
}

/// Ordered result of one aggregation query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTable {
    pub grouping: Dimension,
    pub metric: Metric,
    /// Whether rows carry a cohort.
    pub split_by_cohort: bool,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group labels in row order, without repeats.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for row in &self.rows {
            if labels.last() != Some(&row.group.as_str()) {
                labels.push(&row.group);
            }
        }
        labels
    }

    /// Cohorts present among the rows, in canonical order.
    pub fn cohorts(&self) -> Vec<Cohort> {
        Cohort::ALL
            .iter()
            .copied()
            .filter(|c| self.rows.iter().any(|r| r.cohort == Some(*c)))
            .collect()
    }

    /// Total of the non-missing counts over all rows.
    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_from_name() {
        assert_eq!("Age_Group".parse::<Dimension>(), Ok(Dimension::AgeGroup));
        assert_eq!("State_Name".parse::<Dimension>(), Ok(Dimension::Region));
        assert_eq!(
            "Favorite_Color".parse::<Dimension>(),
            Err(UnknownVariable("Favorite_Color".to_string()))
        );
    }

    #[test]
    fn test_unknown_variable_message() {
        let err = "Sleep_Hours".parse::<Metric>().unwrap_err();
        assert_eq!(err.to_string(), "unknown variable 'Sleep_Hours'");
    }

    #[test]
    fn test_metric_is_not_a_dimension() {
        assert!("Mental_Health_Days".parse::<Dimension>().is_err());
        assert_eq!(
            "Mental_Health_Days".parse::<Metric>(),
            Ok(Metric::MentalHealthDays)
        );
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("Emotional_Support"), "Emotional Support");
        assert_eq!(humanize("Employment"), "Employment");
    }

    #[test]
    fn test_gender_label_comes_from_cohort() {
        let record = Record::empty(Cohort::Male);
        assert_eq!(record.label(Dimension::Gender), Some("Male"));
        assert_eq!(record.label(Dimension::Region), None);
    }

    #[test]
    fn test_cohort_mode_single_cohort() {
        assert_eq!(CohortMode::FemaleOnly.single_cohort(), Some(Cohort::Female));
        assert_eq!(CohortMode::MaleOnly.single_cohort(), Some(Cohort::Male));
        assert_eq!(CohortMode::Compare.single_cohort(), None);
    }

    #[test]
    fn test_table_labels_deduplicate_split_rows() {
        let row = |group: &str, cohort| AggregateRow {
            group: group.to_string(),
            cohort: Some(cohort),
            mean: Some(1.0),
            count: 1,
            records: 1,
            spread: None,
        };
        let table = AggregateTable {
            grouping: Dimension::AgeGroup,
            metric: Metric::MentalHealthDays,
            split_by_cohort: true,
            rows: vec![
                row("18-24", Cohort::Female),
                row("18-24", Cohort::Male),
                row("25-29", Cohort::Male),
            ],
        };
        assert_eq!(table.labels(), vec!["18-24", "25-29"]);
        assert_eq!(table.cohorts(), vec![Cohort::Female, Cohort::Male]);
        assert_eq!(table.total_count(), 3);
    }
}

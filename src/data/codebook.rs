//! Code-to-label lookup tables and canonical category orders.
//!
//! The tables are plain data. A [`CodeBook`] value is built once and handed
//! to the decoder and the resolver; nothing here is global state.

use crate::models::{Cohort, Dimension};
use std::collections::{BTreeMap, HashMap};

const STATE_CODES: &[(i64, &str)] = &[
    (1, "Alabama"),
    (2, "Alaska"),
    (4, "Arizona"),
    (5, "Arkansas"),
    (6, "California"),
    (8, "Colorado"),
    (9, "Connecticut"),
    (10, "Delaware"),
    (11, "District of Columbia"),
    (12, "Florida"),
    (13, "Georgia"),
    (15, "Hawaii"),
    (16, "Idaho"),
    (17, "Illinois"),
    (18, "Indiana"),
    (19, "Iowa"),
    (20, "Kansas"),
    (21, "Kentucky"),
    (22, "Louisiana"),
    (23, "Maine"),
    (24, "Maryland"),
    (25, "Massachusetts"),
    (26, "Michigan"),
    (27, "Minnesota"),
    (28, "Mississippi"),
    (29, "Missouri"),
    (30, "Montana"),
    (31, "Nebraska"),
    (32, "Nevada"),
    (33, "New Hampshire"),
    (34, "New Jersey"),
    (35, "New Mexico"),
    (36, "New York"),
    (37, "North Carolina"),
    (38, "North Dakota"),
    (39, "Ohio"),
    (40, "Oklahoma"),
    (41, "Oregon"),
    (42, "Pennsylvania"),
    (44, "Rhode Island"),
    (45, "South Carolina"),
    (46, "South Dakota"),
    (47, "Tennessee"),
    (48, "Texas"),
    (49, "Utah"),
    (50, "Vermont"),
    (51, "Virginia"),
    (53, "Washington"),
    (54, "West Virginia"),
    (55, "Wisconsin"),
    (56, "Wyoming"),
    (66, "Guam"),
    (72, "Puerto Rico"),
    (78, "Virgin Islands"),
];

// 13 and 14 both collapse into the open-ended bracket.
const AGE_GROUPS: &[(i64, &str)] = &[
    (1, "18-24"),
    (2, "25-29"),
    (3, "30-34"),
    (4, "35-39"),
    (5, "40-44"),
    (6, "45-49"),
    (7, "50-54"),
    (8, "55-59"),
    (9, "60-64"),
    (10, "65-69"),
    (11, "70-74"),
    (12, "75-79"),
    (13, "80+"),
    (14, "80+"),
];

const AGE_ORDER: &[&str] = &[
    "18-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50-54", "55-59", "60-64", "65-69",
    "70-74", "75-79", "80+",
];

const INCOME_GROUPS: &[(i64, &str)] = &[
    (1, "<$15k"),
    (2, "$15-25k"),
    (3, "$25-35k"),
    (4, "$35-50k"),
    (5, "$50-75k"),
    (6, ">$75k"),
    (7, "Unknown"),
    (9, "Refused"),
];

const INCOME_ORDER: &[&str] = &["<$15k", "$15-25k", "$25-35k", "$35-50k", "$50-75k", ">$75k"];

const EMPLOYMENT_STATUS: &[(i64, &str)] = &[
    (1, "Employed"),
    (2, "Self-employed"),
    (3, "Unemployed <1yr"),
    (4, "Unemployed 1yr+"),
    (5, "Homemaker"),
    (6, "Student"),
    (7, "Retired"),
    (8, "Unable to work"),
    (9, "Refused"),
];

const MARITAL_STATUS: &[(i64, &str)] = &[
    (1, "Married"),
    (2, "Divorced"),
    (3, "Widowed"),
    (4, "Separated"),
    (5, "Never married"),
    (6, "Unmarried couple"),
    (9, "Refused"),
];

const EDUCATION_LEVELS: &[(i64, &str)] = &[
    (1, "Never attended"),
    (2, "Elementary"),
    (3, "Some HS"),
    (4, "HS Graduate"),
    (5, "Some College"),
    (6, "College Graduate"),
    (9, "Refused"),
];

const EDUCATION_ORDER: &[&str] = &[
    "Never attended",
    "Elementary",
    "Some HS",
    "HS Graduate",
    "Some College",
    "College Graduate",
];

const HEALTH_STATUS: &[(i64, &str)] = &[
    (1, "Excellent"),
    (2, "Very Good"),
    (3, "Good"),
    (4, "Fair"),
    (5, "Poor"),
    (7, "Don't know"),
    (9, "Refused"),
];

const HEALTH_ORDER: &[&str] = &["Excellent", "Very Good", "Good", "Fair", "Poor"];

const SUPPORT_FREQUENCY: &[(i64, &str)] = &[
    (1, "Always"),
    (2, "Usually"),
    (3, "Sometimes"),
    (4, "Rarely"),
    (5, "Never"),
    (9, "Refused"),
];

const SUPPORT_ORDER: &[&str] = &["Always", "Usually", "Sometimes", "Rarely", "Never"];

const LIFE_SATISFACTION: &[(i64, &str)] = &[
    (1, "Very Satisfied"),
    (2, "Satisfied"),
    (3, "Dissatisfied"),
    (4, "Very Dissatisfied"),
    (7, "Don't know"),
    (9, "Refused"),
];

/// Label of a binary flag whose code is 1.
pub const YES: &str = "Yes";
/// Label of a binary flag with any other code.
pub const NO: &str = "No";

/// Lookup table for one coded field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeTable {
    labels: BTreeMap<i64, String>,
}

impl CodeTable {
    /// Build a table from `(code, label)` pairs.
    pub fn from_pairs(pairs: &[(i64, &str)]) -> Self {
        Self {
            labels: pairs
                .iter()
                .map(|(code, label)| (*code, label.to_string()))
                .collect(),
        }
    }

    /// Label for a code, `None` if the code is not in the table.
    pub fn decode(&self, code: i64) -> Option<&str> {
        self.labels.get(&code).map(String::as_str)
    }

    /// Smallest code mapping to a label.
    pub fn encode(&self, label: &str) -> Option<i64> {
        self.labels
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(code, _)| *code)
    }

    /// Distinct labels, in code order.
    pub fn labels(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for label in self.labels.values() {
            if !seen.contains(&label.as_str()) {
                seen.push(label);
            }
        }
        seen
    }
}

/// All lookup tables and canonical orders for the survey schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBook {
    tables: HashMap<Dimension, CodeTable>,
    orders: HashMap<Dimension, Vec<String>>,
}

impl Default for CodeBook {
    fn default() -> Self {
        Self::brfss_2024()
    }
}

impl CodeBook {
    /// Code book for the BRFSS 2024 veteran extracts.
    pub fn brfss_2024() -> Self {
        let tables: HashMap<Dimension, CodeTable> = [
            (Dimension::Region, STATE_CODES),
            (Dimension::AgeGroup, AGE_GROUPS),
            (Dimension::IncomeGroup, INCOME_GROUPS),
            (Dimension::Employment, EMPLOYMENT_STATUS),
            (Dimension::Marital, MARITAL_STATUS),
            (Dimension::Education, EDUCATION_LEVELS),
            (Dimension::GeneralHealth, HEALTH_STATUS),
            (Dimension::EmotionalSupport, SUPPORT_FREQUENCY),
            (Dimension::LifeSatisfaction, LIFE_SATISFACTION),
        ]
        .into_iter()
        .map(|(dim, pairs)| (dim, CodeTable::from_pairs(pairs)))
        .collect();

        let cohort_order: Vec<&str> = Cohort::ALL.iter().map(|c| c.label()).collect();
        let orders: HashMap<Dimension, Vec<String>> = [
            (Dimension::AgeGroup, AGE_ORDER),
            (Dimension::IncomeGroup, INCOME_ORDER),
            (Dimension::Education, EDUCATION_ORDER),
            (Dimension::GeneralHealth, HEALTH_ORDER),
            (Dimension::EmotionalSupport, SUPPORT_ORDER),
            (Dimension::Gender, cohort_order.as_slice()),
        ]
        .into_iter()
        .map(|(dim, order)| (dim, order.iter().map(|s| s.to_string()).collect()))
        .collect();

        Self { tables, orders }
    }

    /// Replace (or add) the lookup table of a dimension.
    pub fn with_table(mut self, dimension: Dimension, table: CodeTable) -> Self {
        self.tables.insert(dimension, table);
        self
    }

    /// Replace (or remove, with `None`) the canonical order of a dimension.
    pub fn with_order(mut self, dimension: Dimension, order: Option<Vec<String>>) -> Self {
        match order {
            Some(order) => self.orders.insert(dimension, order),
            None => self.orders.remove(&dimension),
        };
        self
    }

    /// Lookup table for a coded dimension.
    pub fn table(&self, dimension: Dimension) -> Option<&CodeTable> {
        self.tables.get(&dimension)
    }

    /// Canonical display order, if the dimension has one.
    ///
    /// Every chart kind resolves ordering through here.
    pub fn canonical_order(&self, dimension: Dimension) -> Option<&[String]> {
        self.orders.get(&dimension).map(Vec::as_slice)
    }

    /// Every label the dimension can take.
    pub fn domain(&self, dimension: Dimension) -> Vec<String> {
        if dimension.is_binary() {
            return vec![YES.to_string(), NO.to_string()];
        }
        if dimension == Dimension::Gender {
            return Cohort::ALL.iter().map(|c| c.label().to_string()).collect();
        }
        self.table(dimension)
            .map(|t| t.labels().into_iter().map(String::from).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_round_trip() {
        let book = CodeBook::brfss_2024();
        let regions = book.table(Dimension::Region).unwrap();

        assert_eq!(regions.decode(6), Some("California"));
        assert_eq!(regions.encode("California"), Some(6));

        let once = regions.decode(6).unwrap();
        let twice = regions.decode(regions.encode(once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_collapsed_age_code_re_encodes_stably() {
        let book = CodeBook::brfss_2024();
        let ages = book.table(Dimension::AgeGroup).unwrap();

        assert_eq!(ages.decode(14), Some("80+"));
        assert_eq!(ages.encode("80+"), Some(13));
        assert_eq!(ages.decode(ages.encode("80+").unwrap()), Some("80+"));
    }

    #[test]
    fn test_unknown_code() {
        let book = CodeBook::brfss_2024();
        assert_eq!(book.table(Dimension::Region).unwrap().decode(3), None);
        assert_eq!(book.table(Dimension::Marital).unwrap().decode(7), None);
    }

    #[test]
    fn test_orders_are_subsets_of_domains() {
        let book = CodeBook::brfss_2024();
        for dim in Dimension::ALL {
            if let Some(order) = book.canonical_order(dim) {
                let domain = book.domain(dim);
                assert!(order.iter().all(|l| domain.contains(l)), "{dim}");
            }
        }
    }

    #[test]
    fn test_unordered_dimensions() {
        let book = CodeBook::brfss_2024();
        assert!(book.canonical_order(Dimension::Region).is_none());
        assert!(book.canonical_order(Dimension::Employment).is_none());
        assert!(book.canonical_order(Dimension::Depression).is_none());
        assert_eq!(book.canonical_order(Dimension::AgeGroup).unwrap().len(), 13);
    }

    #[test]
    fn test_income_domain_keeps_refused() {
        let book = CodeBook::brfss_2024();
        let domain = book.domain(Dimension::IncomeGroup);
        assert!(domain.contains(&"Refused".to_string()));
        assert!(!book
            .canonical_order(Dimension::IncomeGroup)
            .unwrap()
            .contains(&"Refused".to_string()));
    }

    #[test]
    fn test_override_order() {
        let book = CodeBook::brfss_2024()
            .with_order(Dimension::AgeGroup, None)
            .with_order(
                Dimension::Marital,
                Some(vec!["Married".to_string(), "Divorced".to_string()]),
            );
        assert!(book.canonical_order(Dimension::AgeGroup).is_none());
        assert_eq!(book.canonical_order(Dimension::Marital).unwrap().len(), 2);
    }

    #[test]
    fn test_replaced_table_drives_decoding() {
        use crate::data::decoder::{DecodeStats, Decoder};
        use crate::models::RawRecord;

        let book = CodeBook::brfss_2024().with_table(
            Dimension::Marital,
            CodeTable::from_pairs(&[(1, "Partnered"), (2, "Single")]),
        );
        assert_eq!(book.table(Dimension::Marital).unwrap().encode("Single"), Some(2));

        let raw = RawRecord {
            marital: Some(1.0),
            ..RawRecord::default()
        };
        let mut stats = DecodeStats::default();
        let record = Decoder::new(&book).decode(&raw, Cohort::Male, &mut stats);
        assert_eq!(record.marital.as_deref(), Some("Partnered"));

        let domain = book.domain(Dimension::Marital);
        assert!(domain.contains(&"Single".to_string()));
        assert!(!domain.contains(&"Married".to_string()));
    }
}

//! Markdown and JSON report generation.
//!
//! This module renders a [`Report`] as a Markdown document or as pretty
//! JSON for downstream tools.

use super::{Report, ReportMetadata};
use crate::analysis::CohortComparison;
use crate::config::FeatureImportance;
use crate::models::{humanize, AggregateTable};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.resolution.chart.title));

    output.push_str(&generate_metadata_section(&report.metadata));

    output.push_str(&generate_table_section(&report.resolution.table));

    if let Some(ref comparison) = report.comparison {
        output.push_str(&generate_comparison_section(comparison));
    }

    output.push_str(&generate_features_section(&report.top_features));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Population:** {:?}\n",
        metadata.cohort_mode
    ));
    section.push_str(&format!(
        "- **Records:** {} of {}\n",
        metadata.filtered_records, metadata.dataset_records
    ));
    section.push_str(&format!(
        "- **Query:** {} by {} ({} chart{})\n",
        humanize(&metadata.query.metric),
        humanize(&metadata.query.grouping),
        metadata.query.chart,
        if metadata.query.split_by_cohort {
            ", split by cohort"
        } else {
            ""
        }
    ));
    section.push('\n');

    section
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Generate the aggregate table section.
fn generate_table_section(table: &AggregateTable) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    if table.is_empty() {
        section.push_str("No records match the current selection.\n\n");
        return section;
    }

    let group = humanize(table.grouping.name());
    let metric = humanize(table.metric.name());
    if table.split_by_cohort {
        section.push_str(&format!(
            "| {} | Cohort | Mean {} | Responses |\n",
            group, metric
        ));
        section.push_str("|:---|:---|---:|---:|\n");
    } else {
        section.push_str(&format!("| {} | Mean {} | Responses |\n", group, metric));
        section.push_str("|:---|---:|---:|\n");
    }

    for row in &table.rows {
        match row.cohort {
            Some(cohort) => section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.group,
                cohort,
                format_value(row.mean),
                row.count
            )),
            None => section.push_str(&format!(
                "| {} | {} | {} |\n",
                row.group,
                format_value(row.mean),
                row.count
            )),
        }
    }
    section.push('\n');

    section
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

fn times(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}x", v),
        None => "n/a".to_string(),
    }
}

/// Generate the cohort comparison section.
fn generate_comparison_section(comparison: &CohortComparison) -> String {
    let mut section = String::new();

    section.push_str("## Cohort Comparison\n\n");
    section.push_str("| Measure | Female | Male | Ratio |\n");
    section.push_str("|:---|---:|---:|---:|\n");

    let CohortComparison {
        female,
        male,
        ratios,
    } = comparison;

    section.push_str(&format!(
        "| Respondents | {} | {} | |\n",
        female.records, male.records
    ));

    let rows = [
        (
            "Depression",
            percent(female.depression_rate),
            percent(male.depression_rate),
            ratios.depression,
        ),
        (
            "Mental Health Days",
            format_value(female.avg_mental_health_days),
            format_value(male.avg_mental_health_days),
            ratios.mental_health_days,
        ),
        (
            "Frequent Distress",
            percent(female.frequent_distress_rate),
            percent(male.frequent_distress_rate),
            ratios.frequent_distress,
        ),
        (
            "Uninsured",
            percent(female.uninsured_rate),
            percent(male.uninsured_rate),
            ratios.uninsured,
        ),
        (
            "Cost Barrier",
            percent(female.cost_barrier_rate),
            percent(male.cost_barrier_rate),
            None,
        ),
    ];

    for (label, female_value, male_value, ratio) in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            label,
            female_value,
            male_value,
            times(ratio)
        ));
    }
    section.push('\n');

    section
}

/// Generate the feature importance section.
fn generate_features_section(features: &[FeatureImportance]) -> String {
    if features.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Factors\n\n");
    for (i, feature) in features.iter().enumerate() {
        section.push_str(&format!(
            "{}. {} ({}): {:.3}\n",
            i + 1,
            feature.feature,
            feature.category,
            feature.importance
        ));
    }
    section.push('\n');

    section
}

/// Write the Markdown report to a file.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report);

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a JSON report to a file.
pub fn write_json_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compare_cohorts, ranked_features};
    use crate::config::{InsightsConfig, StyleConfig, ThresholdConfig};
    use crate::data::CodeBook;
    use crate::models::{Cohort, CohortMode, Record};
    use crate::resolver::{AggregationQuery, Resolver};
    use chrono::Utc;
    use tempfile::TempDir;

    fn records() -> Vec<Record> {
        let mut rows = Vec::new();
        for (cohort, age, days) in [
            (Cohort::Female, "18-24", Some(10.0)),
            (Cohort::Female, "25-29", None),
            (Cohort::Male, "18-24", Some(4.0)),
        ] {
            let mut r = Record::empty(cohort);
            r.age_group = Some(age.to_string());
            r.mental_health_days = days;
            r.depression = Some("Yes".to_string());
            rows.push(r);
        }
        rows
    }

    fn create_test_report(split: bool) -> Report {
        let codebook = CodeBook::brfss_2024();
        let style = StyleConfig::default();
        let thresholds = ThresholdConfig::default();
        let resolver = Resolver::new(&codebook, &style, &thresholds);

        let records = records();
        let refs: Vec<&Record> = records.iter().collect();
        let query = AggregationQuery::new("Age_Group", "Mental_Health_Days").split(split);
        let resolution = resolver
            .resolve(&refs, CohortMode::Compare, &query)
            .unwrap();

        let metadata = ReportMetadata {
            generated_at: Utc::now(),
            cohort_mode: CohortMode::Compare,
            dataset_records: 10,
            filtered_records: refs.len(),
            query,
        };

        Report::new(metadata, resolution)
            .with_comparison(compare_cohorts(&refs, &thresholds))
            .with_features(ranked_features(&InsightsConfig::default().features, 3))
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(false);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Mental Health Days by Age Group"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("- **Records:** 3 of 10"));
        assert!(markdown.contains("| 18-24 | 7.00 | 2 |"));
        assert!(markdown.contains("| 25-29 | n/a | 0 |"));
        assert!(markdown.contains("## Cohort Comparison"));
        assert!(markdown.contains("| Mental Health Days | 10.00 | 4.00 | 2.50x |"));
        assert!(markdown.contains("1. Poor Physical Health Days (Physical Health): 0.180"));
    }

    #[test]
    fn test_split_table_has_cohort_column() {
        let report = create_test_report(true);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("| Age Group | Cohort | Mean Mental Health Days | Responses |"));
        assert!(markdown.contains("| 18-24 | Female | 10.00 | 1 |"));
        assert!(markdown.contains("| 18-24 | Male | 4.00 | 1 |"));
        assert!(markdown.contains("split by cohort"));
    }

    #[test]
    fn test_empty_results_section() {
        let mut report = create_test_report(false);
        report.resolution.table.rows.clear();
        report.comparison = None;
        report.top_features.clear();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No records match the current selection."));
        assert!(!markdown.contains("## Cohort Comparison"));
        assert!(!markdown.contains("## Top Factors"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(false);
        let json = generate_json_report(&report).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["metadata"]["filtered_records"], 3);
        assert_eq!(parsed["resolution"]["chart"]["kind"], "box");
        assert!(parsed["resolution"]["table"]["rows"][1]["mean"].is_null());

        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resolution, report.resolution);
    }

    #[test]
    fn test_write_reports() {
        let dir = TempDir::new().unwrap();
        let report = create_test_report(false);

        let md_path = dir.path().join("report.md");
        write_report(&report, &md_path).unwrap();
        assert!(std::fs::read_to_string(&md_path)
            .unwrap()
            .starts_with("# Mental Health Days by Age Group"));

        let json_path = dir.path().join("report.json");
        write_json_report(&report, &json_path).unwrap();
        assert!(json_path.exists());
    }
}

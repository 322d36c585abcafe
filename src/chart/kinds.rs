//! Per-kind chart builders.

use super::{hover_template, ChartKind, ChartSpec, ChartStyle, Layout, Series, SeriesColor, SeriesPoint};
use crate::models::{humanize, AggregateRow, AggregateTable, Dimension};
use std::collections::BTreeMap;

/// Which row quantity a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plotted {
    Mean,
    Records,
}

fn point(row: &AggregateRow, plotted: Plotted) -> SeriesPoint {
    let value = match plotted {
        Plotted::Mean => row.mean,
        Plotted::Records => Some(row.records as f64),
    };
    SeriesPoint {
        label: row.group.clone(),
        value,
        count: row.count,
        spread: row.spread,
    }
}

/// Series shared by every kind: one per cohort when split, otherwise one.
fn series(table: &AggregateTable, style: &ChartStyle<'_>, plotted: Plotted) -> Vec<Series> {
    if table.is_empty() {
        return Vec::new();
    }

    if table.split_by_cohort {
        return table
            .cohorts()
            .into_iter()
            .map(|cohort| Series {
                name: cohort.label().to_string(),
                color: SeriesColor::Solid(style.cohort_color(Some(cohort)).to_string()),
                points: table
                    .rows
                    .iter()
                    .filter(|r| r.cohort == Some(cohort))
                    .map(|r| point(r, plotted))
                    .collect(),
            })
            .collect();
    }

    let color = if table.grouping == Dimension::AgeGroup {
        let colors: BTreeMap<String, String> = table
            .labels()
            .into_iter()
            .map(|label| (label.to_string(), style.age_color(label).to_string()))
            .collect();
        SeriesColor::PerCategory(colors)
    } else {
        SeriesColor::Solid(style.population_color().to_string())
    };

    vec![Series {
        name: humanize(table.metric.name()),
        color,
        points: table.rows.iter().map(|r| point(r, plotted)).collect(),
    }]
}

/// Fields common to all kinds.
fn frame(
    kind: ChartKind,
    table: &AggregateTable,
    style: &ChartStyle<'_>,
    title: String,
    y_axis_title: String,
    layout: Layout,
    plotted: Plotted,
) -> ChartSpec {
    let series = series(table, style, plotted);
    ChartSpec {
        kind,
        title,
        x_axis_title: humanize(table.grouping.name()),
        y_axis_title,
        hover_template: hover_template(table.grouping.name(), table.metric.name()),
        categories: table.labels().into_iter().map(String::from).collect(),
        layout,
        no_data: series.is_empty(),
        series,
    }
}

fn names(table: &AggregateTable) -> (String, String) {
    (
        humanize(table.grouping.name()),
        humanize(table.metric.name()),
    )
}

pub(super) fn box_chart(table: &AggregateTable, style: &ChartStyle<'_>) -> ChartSpec {
    let (group, metric) = names(table);
    frame(
        ChartKind::Box,
        table,
        style,
        format!("{} by {}", metric, group),
        metric,
        Layout::Box {
            show_outliers: true,
        },
        Plotted::Mean,
    )
}

pub(super) fn violin_chart(table: &AggregateTable, style: &ChartStyle<'_>) -> ChartSpec {
    let (group, metric) = names(table);
    frame(
        ChartKind::Violin,
        table,
        style,
        format!("{} Distribution by {}", metric, group),
        metric,
        Layout::Violin { inner_box: true },
        Plotted::Mean,
    )
}

pub(super) fn bar_chart(table: &AggregateTable, style: &ChartStyle<'_>) -> ChartSpec {
    let (group, metric) = names(table);
    frame(
        ChartKind::Bar,
        table,
        style,
        format!("Average {} by {}", metric, group),
        metric,
        Layout::Bar {
            grouped: table.split_by_cohort,
        },
        Plotted::Mean,
    )
}

pub(super) fn histogram(table: &AggregateTable, style: &ChartStyle<'_>) -> ChartSpec {
    let (group, _) = names(table);
    frame(
        ChartKind::Histogram,
        table,
        style,
        format!("Distribution of {}", group),
        "Count".to_string(),
        Layout::Histogram {
            grouped: table.split_by_cohort,
            marginal_box: true,
        },
        Plotted::Records,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use crate::models::{Cohort, CohortMode, Metric};

    fn row(group: &str, cohort: Option<Cohort>, mean: Option<f64>, count: usize) -> AggregateRow {
        AggregateRow {
            group: group.to_string(),
            cohort,
            mean,
            count,
            records: count + 1,
            spread: None,
        }
    }

    fn table(grouping: Dimension, split: bool, rows: Vec<AggregateRow>) -> AggregateTable {
        AggregateTable {
            grouping,
            metric: Metric::MentalHealthDays,
            split_by_cohort: split,
            rows,
        }
    }

    #[test]
    fn test_split_series_use_reserved_colors() {
        let palette = StyleConfig::default();
        let style = ChartStyle::new(&palette, CohortMode::Compare);
        let t = table(
            Dimension::Employment,
            true,
            vec![
                row("Retired", Some(Cohort::Female), Some(4.0), 3),
                row("Retired", Some(Cohort::Male), Some(2.0), 5),
            ],
        );

        let spec = bar_chart(&t, &style);
        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].name, "Female");
        assert_eq!(spec.series[0].color, SeriesColor::Solid("#ff7f0e".to_string()));
        assert_eq!(spec.series[1].name, "Male");
        assert_eq!(spec.series[1].color, SeriesColor::Solid("#1f77b4".to_string()));
        assert_eq!(spec.layout, Layout::Bar { grouped: true });
    }

    #[test]
    fn test_age_groups_get_per_category_colors() {
        let palette = StyleConfig::default();
        let style = ChartStyle::new(&palette, CohortMode::FemaleOnly);
        let t = table(
            Dimension::AgeGroup,
            false,
            vec![row("18-24", None, Some(4.0), 3), row("80+", None, None, 0)],
        );

        let spec = violin_chart(&t, &style);
        assert_eq!(spec.series.len(), 1);
        match &spec.series[0].color {
            SeriesColor::PerCategory(colors) => {
                assert_eq!(colors.len(), 2);
                assert_eq!(colors["18-24"], "#e41a1c");
                assert_eq!(colors["80+"], "#e78ac3");
            }
            other => panic!("expected per-category colors, got {:?}", other),
        }
        assert_eq!(spec.series[0].points[1].value, None);
    }

    #[test]
    fn test_single_cohort_solid_color() {
        let palette = StyleConfig::default();
        let style = ChartStyle::new(&palette, CohortMode::MaleOnly);
        let t = table(Dimension::Education, false, vec![row("HS Graduate", None, Some(1.0), 1)]);

        let spec = box_chart(&t, &style);
        assert_eq!(spec.series[0].color, SeriesColor::Solid("#1f77b4".to_string()));
        assert_eq!(spec.series[0].name, "Mental Health Days");
        assert_eq!(spec.title, "Mental Health Days by Education");
    }

    #[test]
    fn test_histogram_plots_record_counts() {
        let palette = StyleConfig::default();
        let style = ChartStyle::new(&palette, CohortMode::All);
        let t = table(Dimension::Depression, false, vec![row("Yes", None, Some(9.0), 4)]);

        let spec = histogram(&t, &style);
        assert_eq!(spec.title, "Distribution of Depression");
        assert_eq!(spec.y_axis_title, "Count");
        assert_eq!(spec.series[0].points[0].value, Some(5.0));
        assert_eq!(spec.series[0].color, SeriesColor::Solid("#2ca02c".to_string()));
    }

    #[test]
    fn test_titles_and_hover_per_kind() {
        let palette = StyleConfig::default();
        let style = ChartStyle::new(&palette, CohortMode::All);
        let t = table(
            Dimension::GeneralHealth,
            false,
            vec![row("Good", None, Some(2.0), 2)],
        );

        let titles: Vec<String> = ChartKind::ALL
            .iter()
            .map(|k| k.build(&t, &style).title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Mental Health Days by General Health",
                "Mental Health Days Distribution by General Health",
                "Average Mental Health Days by General Health",
                "Distribution of General Health",
            ]
        );

        for kind in ChartKind::ALL {
            assert_eq!(
                kind.build(&t, &style).hover_template,
                "General Health: %{x}<br>Mental Health Days: %{y:.2f}<extra></extra>"
            );
        }
    }

    #[test]
    fn test_empty_table_gives_no_data_chart() {
        let palette = StyleConfig::default();
        let style = ChartStyle::new(&palette, CohortMode::Compare);
        let t = table(Dimension::Region, true, Vec::new());

        for kind in ChartKind::ALL {
            let spec = kind.build(&t, &style);
            assert!(spec.no_data);
            assert!(spec.series.is_empty());
            assert!(spec.categories.is_empty());
            assert_eq!(spec.x_axis_title, "State Name");
        }
    }
}

//! Rendering-agnostic chart specifications.
//!
//! Each [`ChartKind`] maps an [`AggregateTable`] and a [`ChartStyle`] to a
//! [`ChartSpec`] value. Nothing here knows about a plotting library.

mod kinds;

use crate::config::StyleConfig;
use crate::error::UnknownChartKind;
use crate::models::{humanize, AggregateTable, Cohort, CohortMode, Spread};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported visualizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Box,
    Violin,
    Bar,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Box,
        ChartKind::Violin,
        ChartKind::Bar,
        ChartKind::Histogram,
    ];

    /// Build the chart for an aggregate table.
    pub fn build(&self, table: &AggregateTable, style: &ChartStyle<'_>) -> ChartSpec {
        match self {
            ChartKind::Box => kinds::box_chart(table, style),
            ChartKind::Violin => kinds::violin_chart(table, style),
            ChartKind::Bar => kinds::bar_chart(table, style),
            ChartKind::Histogram => kinds::histogram(table, style),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Box => "box",
            ChartKind::Violin => "violin",
            ChartKind::Bar => "bar",
            ChartKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "box" | "box plot" => Ok(ChartKind::Box),
            "violin" | "violin plot" => Ok(ChartKind::Violin),
            "bar" | "bar chart" => Ok(ChartKind::Bar),
            "histogram" => Ok(ChartKind::Histogram),
            _ => Err(UnknownChartKind(s.to_string())),
        }
    }
}

/// Colors and population context a chart is drawn for.
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle<'a> {
    pub palette: &'a StyleConfig,
    pub cohort_mode: CohortMode,
}

impl<'a> ChartStyle<'a> {
    pub fn new(palette: &'a StyleConfig, cohort_mode: CohortMode) -> Self {
        Self {
            palette,
            cohort_mode,
        }
    }

    /// Reserved color of a cohort series; the third color covers anything else.
    pub fn cohort_color(&self, cohort: Option<Cohort>) -> &'a str {
        match cohort {
            Some(Cohort::Female) => &self.palette.female_color,
            Some(Cohort::Male) => &self.palette.male_color,
            None => &self.palette.other_color,
        }
    }

    /// Solid color of an unsplit series, tied to the active population.
    pub fn population_color(&self) -> &'a str {
        self.cohort_color(self.cohort_mode.single_cohort())
    }

    /// Palette color of an age bracket.
    pub fn age_color(&self, label: &str) -> &'a str {
        self.palette
            .age_palette
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.palette.other_color)
    }
}

/// How a series is colored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesColor {
    Solid(String),
    /// One color per category label.
    PerCategory(BTreeMap<String, String>),
}

/// One x position of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    /// Plotted value; `None` when the mean is undefined.
    pub value: Option<f64>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<Spread>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub color: SeriesColor,
    pub points: Vec<SeriesPoint>,
}

/// Kind-specific drawing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Layout {
    Box { show_outliers: bool },
    Violin { inner_box: bool },
    Bar { grouped: bool },
    Histogram { grouped: bool, marginal_box: bool },
}

/// Complete description of one visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub hover_template: String,
    /// x-axis category order.
    pub categories: Vec<String>,
    pub layout: Layout,
    pub series: Vec<Series>,
    /// Set when there is nothing to plot.
    pub no_data: bool,
}

/// Hover text for a grouping/metric pair. Identical for every chart kind.
pub fn hover_template(grouping: &str, metric: &str) -> String {
    format!(
        "{}: %{{x}}<br>{}: %{{y:.2f}}<extra></extra>",
        humanize(grouping),
        humanize(metric)
    )
}

//! Configuration file handling.
//!
//! This module handles loading configuration from `.cohortlens.toml`
//! files. Every section falls back to the dashboard defaults.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".cohortlens.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Policy thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Chart colors.
    #[serde(default)]
    pub style: StyleConfig,

    /// Pre-computed model outputs shown alongside the data.
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Only log errors.
    #[serde(default)]
    pub quiet: bool,
}

/// Cohort file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_female_path")]
    pub female_path: String,

    #[serde(default = "default_male_path")]
    pub male_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            female_path: default_female_path(),
            male_path: default_male_path(),
        }
    }
}

fn default_female_path() -> String {
    "./data/female_veterans_clean.csv".to_string()
}

fn default_male_path() -> String {
    "./data/male_veterans_clean.csv".to_string()
}

/// Domain thresholds that encode reporting policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Day counts above this are treated as missing.
    #[serde(default = "default_max_valid_days")]
    pub max_valid_days: f64,

    /// Days per month at or above which a respondent is in frequent distress.
    #[serde(default = "default_distress_days")]
    pub distress_days: f64,

    /// Number of regions reported in a gap ranking.
    #[serde(default = "default_region_gap_limit")]
    pub region_gap_limit: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_valid_days: default_max_valid_days(),
            distress_days: default_distress_days(),
            region_gap_limit: default_region_gap_limit(),
        }
    }
}

fn default_max_valid_days() -> f64 {
    30.0
}

fn default_distress_days() -> f64 {
    14.0 // CDC frequent mental distress threshold
}

fn default_region_gap_limit() -> usize {
    15
}

/// Reserved series colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_female_color")]
    pub female_color: String,

    #[serde(default = "default_male_color")]
    pub male_color: String,

    /// Used for combined populations and any unexpected group.
    #[serde(default = "default_other_color")]
    pub other_color: String,

    /// Per-bracket colors for age-group charts.
    #[serde(default = "default_age_palette")]
    pub age_palette: BTreeMap<String, String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            female_color: default_female_color(),
            male_color: default_male_color(),
            other_color: default_other_color(),
            age_palette: default_age_palette(),
        }
    }
}

fn default_female_color() -> String {
    "#ff7f0e".to_string()
}

fn default_male_color() -> String {
    "#1f77b4".to_string()
}

fn default_other_color() -> String {
    "#2ca02c".to_string()
}

fn default_age_palette() -> BTreeMap<String, String> {
    [
        ("18-24", "#e41a1c"),
        ("25-29", "#377eb8"),
        ("30-34", "#4daf4a"),
        ("35-39", "#984ea3"),
        ("40-44", "#ff7f00"),
        ("45-49", "#ffff33"),
        ("50-54", "#a65628"),
        ("55-59", "#f781bf"),
        ("60-64", "#999999"),
        ("65-69", "#66c2a5"),
        ("70-74", "#fc8d62"),
        ("75-79", "#8da0cb"),
        ("80+", "#e78ac3"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// One feature-importance score from an external model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
    pub category: String,
}

/// Externally computed statistics displayed next to the survey data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_features")]
    pub features: Vec<FeatureImportance>,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            features: default_features(),
        }
    }
}

fn default_features() -> Vec<FeatureImportance> {
    [
        ("Poor Physical Health Days", 0.18, "Physical Health"),
        ("Depression Diagnosis", 0.15, "Mental Health"),
        ("Social Support Score", 0.13, "Social"),
        ("Income Level", 0.11, "Economic"),
        ("Employment Status", 0.09, "Economic"),
        ("General Health Rating", 0.08, "Physical Health"),
        ("Chronic Conditions Count", 0.07, "Physical Health"),
        ("Health Insurance", 0.06, "Healthcare"),
        ("Age Group", 0.05, "Demographics"),
        ("Healthcare Access Score", 0.04, "Healthcare"),
        ("Marital Status", 0.03, "Social"),
        ("Education Level", 0.02, "Demographics"),
        ("Cost Barrier to Care", 0.02, "Healthcare"),
        ("PTSD Diagnosis", 0.015, "Mental Health"),
        ("VA Healthcare Usage", 0.015, "Healthcare"),
    ]
    .into_iter()
    .map(|(feature, importance, category)| FeatureImportance {
        feature: feature.to_string(),
        importance,
        category: category.to_string(),
    })
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values that would make the resolver misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.general.verbose && self.general.quiet {
            bail!("Cannot set both verbose and quiet");
        }
        let max_days = self.thresholds.max_valid_days;
        if max_days.is_nan() || max_days <= 0.0 {
            bail!("max_valid_days must be positive");
        }
        if self.thresholds.distress_days > self.thresholds.max_valid_days {
            bail!(
                "distress_days ({}) exceeds max_valid_days ({})",
                self.thresholds.distress_days,
                self.thresholds.max_valid_days
            );
        }
        if self.insights.features.iter().any(|f| !f.importance.is_finite()) {
            bail!("Feature importances must be finite numbers");
        }
        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.general.quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.thresholds.max_valid_days, 30.0);
        assert_eq!(config.thresholds.distress_days, 14.0);
        assert_eq!(config.style.female_color, "#ff7f0e");
        assert_eq!(config.style.age_palette.len(), 13);
        assert_eq!(config.insights.features.len(), 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r##"
[general]
verbose = true

[data]
female_path = "f.csv"

[thresholds]
distress_days = 10

[style]
other_color = "#000000"

[[insights.features]]
feature = "Sleep"
importance = 0.4
category = "Physical Health"
"##;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.data.female_path, "f.csv");
        assert_eq!(config.data.male_path, "./data/male_veterans_clean.csv");
        assert_eq!(config.thresholds.distress_days, 10.0);
        assert_eq!(config.thresholds.max_valid_days, 30.0);
        assert_eq!(config.style.other_color, "#000000");
        assert_eq!(config.style.male_color, "#1f77b4");
        assert_eq!(config.insights.features.len(), 1);
        assert_eq!(config.insights.features[0].feature, "Sleep");
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = Config::default();
        config.thresholds.distress_days = 45.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.verbose = true;
        config.general.quiet = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);

        config.general.verbose = true;
        assert_eq!(config.log_level(), tracing::Level::DEBUG);

        config.general.verbose = false;
        config.general.quiet = true;
        assert_eq!(config.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[thresholds]"));
        assert!(toml_str.contains("[style]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.insights.features.len(), 15);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[thresholds]\nmax_valid_days = 31\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.thresholds.max_valid_days, 31.0);

        std::fs::write(dir.path().join(CONFIG_FILE), "[thresholds\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }
}

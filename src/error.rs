//! Error types surfaced to callers.

use crate::models::UnknownVariable;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to build the dataset. Always fatal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// A chart kind name that matches none of the supported charts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown chart kind: {0}")]
pub struct UnknownChartKind(pub String);

/// A query the resolver refuses to run.
///
/// Distinct from an empty result: an empty filtered set still resolves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown grouping variable: {0}")]
    UnknownGrouping(String),

    #[error("Unknown metric variable: {0}")]
    UnknownMetric(String),
}

impl ResolveError {
    pub(crate) fn grouping(err: UnknownVariable) -> Self {
        ResolveError::UnknownGrouping(err.0)
    }

    pub(crate) fn metric(err: UnknownVariable) -> Self {
        ResolveError::UnknownMetric(err.0)
    }
}

//! Data-quality alerts

use std::fmt;

use super::correlation::Correlations;
use super::variable::{Details, VariableKind, VariableSummary};
use super::DatasetStats;
use crate::config::ProfilingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Constant,
    AllMissing,
    Missing,
    HighCardinality,
    Unique,
    Zeros,
    Skewed,
    HighCorrelation,
    Duplicates,
}

impl AlertKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Constant => "Constant",
            Self::AllMissing => "All missing",
            Self::Missing => "Missing",
            Self::HighCardinality => "High cardinality",
            Self::Unique => "Unique",
            Self::Zeros => "Zeros",
            Self::Skewed => "Skewed",
            Self::HighCorrelation => "High correlation",
            Self::Duplicates => "Duplicates",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    /// Variable the alert is about; `None` for dataset-wide alerts
    pub column: Option<String>,
    pub message: String,
}

impl Alert {
    fn column(kind: AlertKind, column: &str, message: String) -> Self {
        Self {
            kind,
            column: Some(column.to_string()),
            message,
        }
    }
}

pub fn collect(
    dataset: &DatasetStats,
    variables: &[VariableSummary],
    correlations: Option<&Correlations>,
    config: &ProfilingConfig,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if dataset.duplicate_rows > 0 {
        alerts.push(Alert {
            kind: AlertKind::Duplicates,
            column: None,
            message: format!(
                "Dataset has {} ({}) duplicate rows",
                dataset.duplicate_rows,
                percent(dataset.duplicate_ratio)
            ),
        });
    }

    for var in variables {
        variable_alerts(var, dataset.n_rows, config, &mut alerts);
    }

    if let Some(correlations) = correlations {
        for (a, b, r) in correlations.strong_pairs(config.correlation_threshold) {
            alerts.push(Alert::column(
                AlertKind::HighCorrelation,
                a,
                format!("{a} is highly correlated with {b} (ρ = {r:.3})"),
            ));
        }
    }

    alerts
}

fn variable_alerts(
    var: &VariableSummary,
    n_rows: usize,
    config: &ProfilingConfig,
    alerts: &mut Vec<Alert>,
) {
    let name = var.name.as_str();
    let common = &var.common;

    if common.count == 0 {
        alerts.push(Alert::column(
            AlertKind::AllMissing,
            name,
            format!("{name} has all {n_rows} values missing"),
        ));
        return;
    }

    if common.distinct == 1 {
        alerts.push(Alert::column(
            AlertKind::Constant,
            name,
            format!("{name} has constant value"),
        ));
    }

    if common.missing_ratio > config.missing_threshold {
        alerts.push(Alert::column(
            AlertKind::Missing,
            name,
            format!(
                "{name} has {} ({}) missing values",
                common.missing,
                percent(common.missing_ratio)
            ),
        ));
    }

    if var.kind() == VariableKind::Categorical && common.distinct > config.high_cardinality {
        alerts.push(Alert::column(
            AlertKind::HighCardinality,
            name,
            format!("{name} has a high cardinality: {} distinct values", common.distinct),
        ));
    }

    if common.is_unique && common.count > 1 {
        alerts.push(Alert::column(
            AlertKind::Unique,
            name,
            format!("{name} has unique values"),
        ));
    }

    if let Details::Numeric(stats) = &var.details {
        let zeros_ratio = super::variable::ratio(stats.zeros, n_rows);
        if stats.zeros > 0 && zeros_ratio > config.zeros_threshold {
            alerts.push(Alert::column(
                AlertKind::Zeros,
                name,
                format!("{name} has {} ({}) zeros", stats.zeros, percent(zeros_ratio)),
            ));
        }

        let skewness = stats.summary.as_ref().and_then(|s| s.skewness);
        if let Some(skew) = skewness.filter(|s| s.abs() > config.skewness_threshold) {
            alerts.push(Alert::column(
                AlertKind::Skewed,
                name,
                format!("{name} is highly skewed (γ1 = {skew:.2})"),
            ));
        }
    }
}

/// `0.25` -> `"25.0%"`
pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

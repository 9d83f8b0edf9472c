//! Dataset profiling
//!
//! [`Profile::build`] turns a parsed [`Frame`] into everything the report
//! shows: dataset statistics, one summary per variable, correlation
//! matrices, alerts, a head/tail sample, and the most frequent duplicate rows.

pub mod alerts;
pub mod correlation;
pub mod histogram;
pub mod stats;
pub mod variable;

use chrono::{DateTime, Local};
use std::collections::HashMap;

use crate::config::ProfilingConfig;
use crate::frame::{Frame, SourceFormat, ValueKey};

pub use alerts::{Alert, AlertKind};
pub use correlation::Correlations;
pub use histogram::Histogram;
pub use variable::{Details, VariableKind, VariableSummary};

/// Table-level statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStats {
    pub n_vars: usize,
    pub n_rows: usize,
    pub missing_cells: usize,
    pub missing_cells_ratio: f64,
    /// Rows identical to an earlier row
    pub duplicate_rows: usize,
    pub duplicate_ratio: f64,
    pub memory_bytes: usize,
    /// Variables per kind, zero counts omitted
    pub kinds: Vec<(VariableKind, usize)>,
}

/// Rendered cells of a row with its position in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRow {
    pub cells: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub title: String,
    /// Uploaded filename
    pub source_name: String,
    pub format: SourceFormat,
    pub generated_at: DateTime<Local>,
    pub columns: Vec<String>,
    pub dataset: DatasetStats,
    pub variables: Vec<VariableSummary>,
    pub correlations: Option<Correlations>,
    pub alerts: Vec<Alert>,
    pub head: Vec<SampleRow>,
    pub tail: Vec<SampleRow>,
    pub duplicates: Vec<DuplicateRow>,
}

impl Profile {
    pub fn build(
        frame: &Frame,
        title: &str,
        source_name: &str,
        format: SourceFormat,
        config: &ProfilingConfig,
    ) -> Self {
        let variables: Vec<VariableSummary> = frame
            .columns()
            .iter()
            .map(|column| VariableSummary::describe(column, config))
            .collect();
        let correlations = Correlations::compute(frame.columns());

        let (duplicate_rows, duplicates) = duplicate_rows(frame, config.sample_rows);
        let dataset = dataset_stats(frame, &variables, duplicate_rows);
        let alerts = alerts::collect(&dataset, &variables, correlations.as_ref(), config);

        let n_rows = frame.n_rows();
        let head_len = config.sample_rows.min(n_rows);
        let tail_start = n_rows - head_len;

        Self {
            title: title.to_string(),
            source_name: source_name.to_string(),
            format,
            generated_at: Local::now(),
            columns: frame.columns().iter().map(|c| c.name.clone()).collect(),
            dataset,
            variables,
            correlations,
            alerts,
            head: (0..head_len).map(|i| sample_row(frame, i)).collect(),
            tail: (tail_start..n_rows).map(|i| sample_row(frame, i)).collect(),
            duplicates,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&VariableSummary> {
        self.variables.iter().find(|v| v.name == name)
    }
}

fn dataset_stats(frame: &Frame, variables: &[VariableSummary], duplicate_rows: usize) -> DatasetStats {
    let n_rows = frame.n_rows();
    let missing_cells: usize = variables.iter().map(|v| v.common.missing).sum();

    let mut kind_counts: HashMap<VariableKind, usize> = HashMap::new();
    for var in variables {
        *kind_counts.entry(var.kind()).or_default() += 1;
    }
    let kinds = VariableKind::ALL
        .iter()
        .filter_map(|kind| kind_counts.get(kind).map(|&n| (*kind, n)))
        .collect();

    DatasetStats {
        n_vars: frame.n_cols(),
        n_rows,
        missing_cells,
        missing_cells_ratio: variable::ratio(missing_cells, n_rows * frame.n_cols()),
        duplicate_rows,
        duplicate_ratio: variable::ratio(duplicate_rows, n_rows),
        memory_bytes: variables.iter().map(|v| v.common.memory_bytes).sum(),
        kinds,
    }
}

/// Count rows repeating an earlier row and list the `limit` most frequent ones
fn duplicate_rows(frame: &Frame, limit: usize) -> (usize, Vec<DuplicateRow>) {
    // row key -> (first index, occurrences)
    let mut seen: HashMap<Vec<ValueKey<'_>>, (usize, usize)> = HashMap::new();
    for index in 0..frame.n_rows() {
        seen.entry(frame.row_key(index)).or_insert((index, 0)).1 += 1;
    }

    let mut repeated: Vec<(usize, usize)> = seen
        .into_values()
        .filter(|(_, count)| *count > 1)
        .collect();
    let total = repeated.iter().map(|(_, count)| count - 1).sum();

    repeated.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let top = repeated
        .into_iter()
        .take(limit)
        .map(|(index, count)| DuplicateRow {
            cells: frame.row(index).map(ToString::to_string).collect(),
            count,
        })
        .collect();
    (total, top)
}

fn sample_row(frame: &Frame, index: usize) -> SampleRow {
    SampleRow {
        index,
        cells: frame.row(index).map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Value};

    fn frame() -> Frame {
        Frame::new(vec![
            Column::new(
                "city".into(),
                ["Oslo", "Lima", "Oslo", "Oslo", "Lima"]
                    .iter()
                    .map(|s| Value::Text((*s).to_string()))
                    .collect(),
            ),
            Column::new(
                "temp".into(),
                vec![
                    Value::Int(3),
                    Value::Int(19),
                    Value::Int(3),
                    Value::Int(3),
                    Value::Null,
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_dataset_stats() {
        let profile = Profile::build(
            &frame(),
            "EDA Report",
            "weather.csv",
            SourceFormat::Csv,
            &ProfilingConfig::default(),
        );
        let dataset = &profile.dataset;
        assert_eq!(dataset.n_vars, 2);
        assert_eq!(dataset.n_rows, 5);
        assert_eq!(dataset.missing_cells, 1);
        assert!((dataset.missing_cells_ratio - 0.1).abs() < 1e-12);
        assert_eq!(dataset.duplicate_rows, 2);
        assert_eq!(
            dataset.kinds,
            vec![(VariableKind::Numeric, 1), (VariableKind::Categorical, 1)]
        );
        assert_eq!(profile.columns, vec!["city", "temp"]);
        assert!(profile.variable("temp").is_some());
    }

    #[test]
    fn test_duplicates_listed_by_frequency() {
        let profile = Profile::build(
            &frame(),
            "EDA Report",
            "weather.csv",
            SourceFormat::Csv,
            &ProfilingConfig::default(),
        );
        assert_eq!(
            profile.duplicates,
            vec![DuplicateRow {
                cells: vec!["Oslo".to_string(), "3".to_string()],
                count: 3,
            }]
        );
        assert!(profile
            .alerts
            .iter()
            .any(|a| a.kind == AlertKind::Duplicates));
    }

    #[test]
    fn test_head_and_tail_sample() {
        let config = ProfilingConfig {
            sample_rows: 2,
            ..ProfilingConfig::default()
        };
        let profile = Profile::build(&frame(), "T", "w.csv", SourceFormat::Csv, &config);
        assert_eq!(profile.head.len(), 2);
        assert_eq!(profile.head[1].index, 1);
        assert_eq!(profile.tail[0].index, 3);
        assert_eq!(profile.tail[1].cells, vec!["Lima".to_string(), "NaN".to_string()]);
    }

    #[test]
    fn test_single_row_frame() {
        let frame = Frame::new(vec![Column::new("x".into(), vec![Value::Float(1.5)])]).unwrap();
        let profile = Profile::build(
            &frame,
            "T",
            "one.json",
            SourceFormat::Json,
            &ProfilingConfig::default(),
        );
        assert_eq!(profile.dataset.duplicate_rows, 0);
        assert!(profile.correlations.is_none());
        assert_eq!(profile.head, profile.tail);
    }
}

//! Per-column summaries

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::HashMap;
use std::fmt;

use super::histogram::Histogram;
use super::stats;
use crate::config::ProfilingConfig;
use crate::frame::{Column, Value, ValueKey, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Numeric,
    Categorical,
    Boolean,
    DateTime,
    Text,
    Unsupported,
}

impl VariableKind {
    /// Display order in the overview table
    pub const ALL: [Self; 6] = [
        Self::Numeric,
        Self::Categorical,
        Self::Boolean,
        Self::DateTime,
        Self::Text,
        Self::Unsupported,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Categorical => "Categorical",
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Text => "Text",
            Self::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Statistics every variable carries
#[derive(Debug, Clone, PartialEq)]
pub struct CommonStats {
    /// Non-null cells
    pub count: usize,
    pub missing: usize,
    pub missing_ratio: f64,
    pub distinct: usize,
    /// Distinct over non-null cells
    pub distinct_ratio: f64,
    pub is_unique: bool,
    pub memory_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonicity {
    StrictlyIncreasing,
    Increasing,
    StrictlyDecreasing,
    Decreasing,
    NotMonotonic,
}

impl fmt::Display for Monotonicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StrictlyIncreasing => "Strictly increasing",
            Self::Increasing => "Increasing",
            Self::StrictlyDecreasing => "Strictly decreasing",
            Self::Decreasing => "Decreasing",
            Self::NotMonotonic => "Not monotonic",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Moments and order statistics over the finite values
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub mean: f64,
    pub std: Option<f64>,
    pub variance: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub sum: f64,
    pub quantiles: Quantiles,
    pub iqr: f64,
    pub cv: Option<f64>,
    pub mad: f64,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericStats {
    pub zeros: usize,
    pub negatives: usize,
    pub infinite: usize,
    pub monotonicity: Monotonicity,
    /// `None` when no finite value exists
    pub summary: Option<NumericSummary>,
    pub histogram: Option<Histogram>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStats {
    /// Most frequent values, descending count, ties in first-seen order
    pub top: Vec<(String, usize)>,
    /// Non-null cells outside `top`
    pub other: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub mean_length: f64,
    pub median_length: f64,
    pub length_histogram: Option<Histogram>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanStats {
    pub true_count: usize,
    pub false_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateTimeStats {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
    pub range: TimeDelta,
    /// Bin edges are Unix timestamps in seconds
    pub histogram: Option<Histogram>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    Numeric(NumericStats),
    Categorical(TextStats),
    Boolean(BooleanStats),
    DateTime(DateTimeStats),
    Text(TextStats),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    pub name: String,
    pub common: CommonStats,
    pub details: Details,
}

impl VariableSummary {
    pub fn describe(column: &Column, config: &ProfilingConfig) -> Self {
        let common = common_stats(column);
        let details = match column.kind() {
            None => Details::Unsupported,
            Some(ValueKind::Int | ValueKind::Float) => {
                Details::Numeric(numeric_stats(&column.values, config))
            }
            Some(ValueKind::Bool) => Details::Boolean(boolean_stats(&column.values)),
            Some(ValueKind::DateTime) => datetime_stats(&column.values, config)
                .map_or(Details::Unsupported, Details::DateTime),
            Some(ValueKind::Text) => {
                let text = text_stats(&column.values, config);
                if common.distinct <= config.categorical_max_distinct
                    || common.distinct_ratio <= 0.5
                {
                    Details::Categorical(text)
                } else {
                    Details::Text(text)
                }
            }
        };
        Self {
            name: column.name.clone(),
            common,
            details,
        }
    }

    pub const fn kind(&self) -> VariableKind {
        match self.details {
            Details::Numeric(_) => VariableKind::Numeric,
            Details::Categorical(_) => VariableKind::Categorical,
            Details::Boolean(_) => VariableKind::Boolean,
            Details::DateTime(_) => VariableKind::DateTime,
            Details::Text(_) => VariableKind::Text,
            Details::Unsupported => VariableKind::Unsupported,
        }
    }
}

fn common_stats(column: &Column) -> CommonStats {
    let total = column.values.len();
    let missing = column.null_count();
    let count = total - missing;
    let distinct = column
        .values
        .iter()
        .filter(|v| !v.is_null())
        .map(Value::key)
        .collect::<std::collections::HashSet<ValueKey<'_>>>()
        .len();

    CommonStats {
        count,
        missing,
        missing_ratio: ratio(missing, total),
        distinct,
        distinct_ratio: ratio(distinct, count),
        is_unique: count > 0 && distinct == count,
        memory_bytes: memory_estimate(&column.values),
    }
}

pub(super) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Approximate in-memory size: 8 bytes per slot plus text payloads
pub(super) fn memory_estimate(values: &[Value]) -> usize {
    values
        .iter()
        .map(|v| match v {
            Value::Text(s) => 8 + s.len(),
            Value::Bool(_) => 1,
            _ => 8,
        })
        .sum()
}

fn numeric_stats(values: &[Value], config: &ProfilingConfig) -> NumericStats {
    let present: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
    let has_missing = present.len() != values.len();
    let mut finite: Vec<f64> = present.iter().copied().filter(|v| v.is_finite()).collect();

    let zeros = present.iter().filter(|v| **v == 0.0).count();
    let negatives = present.iter().filter(|v| **v < 0.0).count();
    let infinite = present.len() - finite.len();
    let monotonicity = if has_missing {
        Monotonicity::NotMonotonic
    } else {
        monotonicity(&present)
    };

    let histogram = Histogram::new(&finite, config.histogram_bins);
    let skewness = stats::skewness(&finite);
    let kurtosis = stats::kurtosis(&finite);
    let variance = stats::variance(&finite);
    let mean = stats::mean(&finite);
    finite.sort_by(f64::total_cmp);

    let summary = mean.and_then(|mean| {
        let q = |p| stats::quantile(&finite, p);
        let quantiles = Quantiles {
            p5: q(0.05)?,
            p25: q(0.25)?,
            p50: q(0.5)?,
            p75: q(0.75)?,
            p95: q(0.95)?,
        };
        let min = *finite.first()?;
        let max = *finite.last()?;
        let std = variance.map(f64::sqrt);
        Some(NumericSummary {
            mean,
            std,
            variance,
            min,
            max,
            range: max - min,
            sum: finite.iter().sum(),
            quantiles,
            iqr: quantiles.p75 - quantiles.p25,
            cv: std.filter(|_| mean != 0.0).map(|s| s / mean),
            mad: stats::median_absolute_deviation(&finite)?,
            skewness,
            kurtosis,
        })
    });

    NumericStats {
        zeros,
        negatives,
        infinite,
        monotonicity,
        summary,
        histogram,
    }
}

fn monotonicity(values: &[f64]) -> Monotonicity {
    let pairs = || values.windows(2).map(|w| (w[0], w[1]));
    let increasing = pairs().all(|(a, b)| a <= b);
    let decreasing = pairs().all(|(a, b)| a >= b);
    let unique = pairs().all(|(a, b)| a != b);
    match (increasing, decreasing) {
        (true, _) if unique => Monotonicity::StrictlyIncreasing,
        (true, _) => Monotonicity::Increasing,
        (false, true) if unique => Monotonicity::StrictlyDecreasing,
        (false, true) => Monotonicity::Decreasing,
        (false, false) => Monotonicity::NotMonotonic,
    }
}

fn text_stats(values: &[Value], config: &ProfilingConfig) -> TextStats {
    let texts: Vec<&str> = values
        .iter()
        .filter_map(|v| match v {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();

    // (count, first position) per value
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, text) in texts.iter().enumerate() {
        counts.entry(*text).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(text, (count, first))| (text, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let top: Vec<(String, usize)> = ranked
        .iter()
        .take(config.top_values)
        .map(|(text, count, _)| ((*text).to_string(), *count))
        .collect();
    let other = texts.len() - top.iter().map(|(_, c)| c).sum::<usize>();

    let char_counts: Vec<usize> = texts.iter().map(|t| t.chars().count()).collect();
    let lengths: Vec<f64> = char_counts.iter().map(|&n| n as f64).collect();
    let mut sorted = lengths.clone();
    sorted.sort_by(f64::total_cmp);

    TextStats {
        top,
        other,
        min_length: char_counts.iter().copied().min().unwrap_or(0),
        max_length: char_counts.iter().copied().max().unwrap_or(0),
        mean_length: stats::mean(&lengths).unwrap_or(0.0),
        median_length: stats::quantile(&sorted, 0.5).unwrap_or(0.0),
        length_histogram: Histogram::new(&lengths, config.histogram_bins),
    }
}

fn boolean_stats(values: &[Value]) -> BooleanStats {
    let true_count = values.iter().filter(|v| **v == Value::Bool(true)).count();
    let false_count = values.iter().filter(|v| **v == Value::Bool(false)).count();
    BooleanStats {
        true_count,
        false_count,
    }
}

fn datetime_stats(values: &[Value], config: &ProfilingConfig) -> Option<DateTimeStats> {
    let stamps: Vec<NaiveDateTime> = values
        .iter()
        .filter_map(|v| match v {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        })
        .collect();
    let min = *stamps.iter().min()?;
    let max = *stamps.iter().max()?;
    let seconds: Vec<f64> = stamps
        .iter()
        .map(|dt| dt.and_utc().timestamp() as f64)
        .collect();

    Some(DateTimeStats {
        min,
        max,
        range: max - min,
        histogram: Histogram::new(&seconds, config.histogram_bins),
    })
}

//! Column type inference
//!
//! Parsers hand over raw cells; this module decides the column kind:
//! integers, floats (integers promoted), booleans, timestamps, or text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use super::Value;

/// Cell texts treated as missing
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

pub fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Header cells to unique column names
///
/// Blank headers become `Unnamed: <index>`; repeats get `.1`, `.2`, ...
pub fn column_names<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for (index, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {index}")
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }
    names
}

/// Coerce a column of raw text cells (`None` = missing)
pub fn from_strings(cells: Vec<Option<String>>) -> Vec<Value> {
    let present = || cells.iter().flatten().map(|s| s.trim());

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| {
                c.as_deref()
                    .and_then(|s| s.trim().parse().ok())
                    .map_or(Value::Null, Value::Int)
            })
            .collect();
    }

    if present().all(|s| s.parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| {
                c.as_deref()
                    .and_then(|s| s.trim().parse().ok())
                    .map_or(Value::Null, Value::Float)
            })
            .collect();
    }

    if present().all(|s| parse_bool(s).is_some()) {
        return cells
            .iter()
            .map(|c| c.as_deref().and_then(parse_bool).map_or(Value::Null, Value::Bool))
            .collect();
    }

    let text = cells
        .into_iter()
        .map(|c| c.map_or(Value::Null, Value::Text))
        .collect();
    unify(text, false)
}

/// Harmonize a column of already-typed cells
///
/// With `integral_floats`, float columns whose values are all whole numbers
/// become integer columns (spreadsheets store every number as a float).
pub fn unify(values: Vec<Value>, integral_floats: bool) -> Vec<Value> {
    let mut kinds = KindSet::default();
    for value in &values {
        kinds.add(value);
    }

    match kinds {
        KindSet {
            ints: true,
            floats: true,
            bools: false,
            texts: false,
            datetimes: false,
        } => values
            .into_iter()
            .map(|v| match v {
                Value::Int(i) => Value::Float(i as f64),
                other => other,
            })
            .collect(),
        KindSet {
            floats: true,
            ints: false,
            bools: false,
            texts: false,
            datetimes: false,
        } if integral_floats && values.iter().all(is_integral) => values
            .into_iter()
            .map(|v| match v {
                #[allow(clippy::cast_possible_truncation)]
                Value::Float(f) => Value::Int(f as i64),
                other => other,
            })
            .collect(),
        KindSet {
            texts: true,
            ints: false,
            floats: false,
            bools: false,
            datetimes: false,
        } => coerce_datetimes(values),
        kinds if kinds.count() > 1 => values
            .into_iter()
            .map(|v| match v {
                Value::Null | Value::Text(_) => v,
                other => Value::Text(other.to_string()),
            })
            .collect(),
        _ => values,
    }
}

/// Parse an ISO-like timestamp or date
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.len() < 8 || !s.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn is_integral(value: &Value) -> bool {
    match value {
        Value::Float(f) => f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64,
        _ => true,
    }
}

fn coerce_datetimes(values: Vec<Value>) -> Vec<Value> {
    let parsed: Option<Vec<Value>> = values
        .iter()
        .map(|v| match v {
            Value::Text(s) => parse_datetime(s).map(Value::DateTime),
            other => Some(other.clone()),
        })
        .collect();
    parsed.unwrap_or(values)
}

#[derive(Debug, Default, Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
struct KindSet {
    bools: bool,
    ints: bool,
    floats: bool,
    texts: bool,
    datetimes: bool,
}

impl KindSet {
    fn add(&mut self, value: &Value) {
        match value {
            Value::Null => {}
            Value::Bool(_) => self.bools = true,
            Value::Int(_) => self.ints = true,
            Value::Float(_) => self.floats = true,
            Value::Text(_) => self.texts = true,
            Value::DateTime(_) => self.datetimes = true,
        }
    }

    fn count(self) -> usize {
        [self.bools, self.ints, self.floats, self.texts, self.datetimes]
            .into_iter()
            .filter(|k| *k)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[&str]) -> Vec<Option<String>> {
        raw.iter()
            .map(|s| if is_na(s) { None } else { Some((*s).to_string()) })
            .collect()
    }

    #[test]
    fn test_integer_column() {
        let values = from_strings(cells(&["1", "2", "", "4"]));
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Int(2), Value::Null, Value::Int(4)]
        );
    }

    #[test]
    fn test_float_column_promotes_integers() {
        let values = from_strings(cells(&["1", "2.5", "NaN"]));
        assert_eq!(values, vec![Value::Float(1.0), Value::Float(2.5), Value::Null]);
    }

    #[test]
    fn test_bool_column() {
        let values = from_strings(cells(&["True", "false", "TRUE"]));
        assert_eq!(
            values,
            vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]
        );
    }

    #[test]
    fn test_datetime_column() {
        let values = from_strings(cells(&["2024-01-05", "2024-02-10 13:45:00", "n/a"]));
        assert!(matches!(values[0], Value::DateTime(_)));
        assert!(matches!(values[1], Value::DateTime(_)));
        assert!(values[2].is_null());
    }

    #[test]
    fn test_mixed_text_stays_text() {
        let values = from_strings(cells(&["2024-01-05", "tomorrow"]));
        assert_eq!(
            values,
            vec![Value::Text("2024-01-05".into()), Value::Text("tomorrow".into())]
        );
    }

    #[test]
    fn test_unify_mixed_kinds_become_text() {
        let values = unify(vec![Value::Int(1), Value::Text("a".into()), Value::Null], false);
        assert_eq!(
            values,
            vec![Value::Text("1".into()), Value::Text("a".into()), Value::Null]
        );
    }

    #[test]
    fn test_unify_integral_floats() {
        let values = unify(vec![Value::Float(1.0), Value::Float(3.0)], true);
        assert_eq!(values, vec![Value::Int(1), Value::Int(3)]);

        let values = unify(vec![Value::Float(1.0), Value::Float(3.5)], true);
        assert_eq!(values, vec![Value::Float(1.0), Value::Float(3.5)]);
    }

    #[test]
    fn test_column_names() {
        let names = column_names(["a", "", "a", "b", "a"]);
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "b", "a.2"]);
    }

    #[test]
    fn test_parse_datetime_rejects_numbers() {
        assert!(parse_datetime("20240105").is_none());
        assert!(parse_datetime("12").is_none());
        assert!(parse_datetime("2024-01-05T10:00:00Z").is_some());
    }
}

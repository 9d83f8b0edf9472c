//! JSON parser
//!
//! Accepted shapes, tried in order:
//! - `[{"a": 1}, {"a": 2}]` records
//! - `[[1, 2], [3, 4]]` values, columns named `0..n`
//! - `[1, 2, 3]` a single column named `0`
//! - `{"a": [1, 2]}` or `{"a": {"0": 1, "1": 2}}` columns
//!
//! Input that is not one JSON document is read as line-delimited records.

use serde_json::{Map, Value as Json};
use std::collections::HashMap;

use super::{infer, strip_bom, Column, Frame, FrameError, Value};

pub fn parse(bytes: &[u8]) -> Result<Frame, FrameError> {
    let text = std::str::from_utf8(strip_bom(bytes))?;
    if text.trim().is_empty() {
        return Err(FrameError::Empty);
    }

    match serde_json::from_str::<Json>(text) {
        Ok(document) => from_document(document),
        Err(err) => from_lines(text).map_err(|_| FrameError::Json(err)),
    }
}

fn from_document(document: Json) -> Result<Frame, FrameError> {
    match document {
        Json::Array(items) => from_array(items),
        Json::Object(map) => from_object(map),
        _ => Err(FrameError::JsonShape(
            "Expected a JSON array or object at the top level".to_string(),
        )),
    }
}

fn from_array(items: Vec<Json>) -> Result<Frame, FrameError> {
    if items.is_empty() {
        return Err(FrameError::Empty);
    }

    if items.iter().all(Json::is_object) {
        let mut builder = RecordsBuilder::default();
        for item in items {
            if let Json::Object(record) = item {
                builder.push(record);
            }
        }
        return builder.finish();
    }

    if items.iter().all(Json::is_array) {
        let width = items
            .iter()
            .filter_map(Json::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(items.len()); width];
        for item in items {
            let Json::Array(row) = item else { continue };
            let mut row = row.into_iter();
            for column in &mut columns {
                column.push(row.next().map_or(Value::Null, to_value));
            }
        }
        let named = columns
            .into_iter()
            .enumerate()
            .map(|(i, values)| Column::new(i.to_string(), infer::unify(values, false)))
            .collect();
        return Frame::new(named);
    }

    if items.iter().all(|v| !v.is_object() && !v.is_array()) {
        let values = items.into_iter().map(to_value).collect();
        return Frame::new(vec![Column::new("0".to_string(), infer::unify(values, false))]);
    }

    Err(FrameError::JsonShape(
        "Mixing records, arrays and scalars in one JSON array is not supported".to_string(),
    ))
}

fn from_object(map: Map<String, Json>) -> Result<Frame, FrameError> {
    if map.is_empty() {
        return Err(FrameError::Empty);
    }

    if map.values().all(Json::is_array) {
        let expected = map.values().find_map(Json::as_array).map_or(0, Vec::len);
        if map
            .values()
            .filter_map(Json::as_array)
            .any(|a| a.len() != expected)
        {
            return Err(FrameError::JsonShape(
                "All arrays must be of the same length".to_string(),
            ));
        }
        let columns = map
            .into_iter()
            .map(|(name, column)| {
                let values = match column {
                    Json::Array(items) => items.into_iter().map(to_value).collect(),
                    _ => Vec::new(),
                };
                Column::new(name, infer::unify(values, false))
            })
            .collect();
        return Frame::new(columns);
    }

    if map.values().all(Json::is_object) {
        // Row labels in order of first appearance across all columns
        let mut labels: Vec<String> = Vec::new();
        let mut label_index: HashMap<String, usize> = HashMap::new();
        for inner in map.values().filter_map(Json::as_object) {
            for label in inner.keys() {
                if !label_index.contains_key(label) {
                    label_index.insert(label.clone(), labels.len());
                    labels.push(label.clone());
                }
            }
        }

        let columns = map
            .into_iter()
            .map(|(name, column)| {
                let mut values = vec![Value::Null; labels.len()];
                if let Json::Object(inner) = column {
                    for (label, cell) in inner {
                        if let Some(&row) = label_index.get(&label) {
                            values[row] = to_value(cell);
                        }
                    }
                }
                Column::new(name, infer::unify(values, false))
            })
            .collect();
        return Frame::new(columns);
    }

    Err(FrameError::JsonShape(
        "If using all scalar values, you must pass an index".to_string(),
    ))
}

fn from_lines(text: &str) -> Result<Frame, FrameError> {
    let mut builder = RecordsBuilder::default();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<Json>(line)? {
            Json::Object(record) => builder.push(record),
            _ => {
                return Err(FrameError::JsonShape(
                    "Line-delimited JSON must hold one object per line".to_string(),
                ))
            }
        }
    }
    builder.finish()
}

fn to_value(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        Json::String(s) => Value::Text(s),
        nested @ (Json::Array(_) | Json::Object(_)) => Value::Text(nested.to_string()),
    }
}

/// Collects records whose key sets may differ; missing keys become nulls
#[derive(Default)]
struct RecordsBuilder {
    names: Vec<String>,
    index: HashMap<String, usize>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl RecordsBuilder {
    fn push(&mut self, record: Map<String, Json>) {
        for (key, cell) in record {
            let column = match self.index.get(&key) {
                Some(&i) => i,
                None => {
                    self.index.insert(key.clone(), self.names.len());
                    self.names.push(key);
                    self.columns.push(vec![Value::Null; self.rows]);
                    self.columns.len() - 1
                }
            };
            self.columns[column].push(to_value(cell));
        }

        self.rows += 1;
        for column in &mut self.columns {
            column.resize(self.rows, Value::Null);
        }
    }

    fn finish(self) -> Result<Frame, FrameError> {
        let columns = self
            .names
            .into_iter()
            .zip(self.columns)
            .map(|(name, values)| Column::new(name, infer::unify(values, false)))
            .collect();
        Frame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ValueKind;

    #[test]
    fn test_records_with_missing_keys() {
        let frame = parse(br#"[{"a": 1, "b": "x"}, {"a": 2.5}, {"c": true}]"#).unwrap();
        assert_eq!(frame.n_rows(), 3);
        let cols = frame.columns();
        assert_eq!(cols[0].name, "a");
        assert_eq!(
            cols[0].values,
            vec![Value::Float(1.0), Value::Float(2.5), Value::Null]
        );
        assert_eq!(
            cols[1].values,
            vec![Value::Text("x".into()), Value::Null, Value::Null]
        );
        assert_eq!(cols[2].values, vec![Value::Null, Value::Null, Value::Bool(true)]);
    }

    #[test]
    fn test_columns_orient() {
        let frame = parse(br#"{"a": {"0": 1, "1": 2}, "b": {"1": "y", "0": "x"}}"#).unwrap();
        let cols = frame.columns();
        assert_eq!(cols[0].values, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(
            cols[1].values,
            vec![Value::Text("x".into()), Value::Text("y".into())]
        );
    }

    #[test]
    fn test_object_of_arrays() {
        let frame = parse(br#"{"when": ["2024-01-01", "2024-01-02"], "n": [1, 2]}"#).unwrap();
        assert_eq!(frame.columns()[0].kind(), Some(ValueKind::DateTime));
        assert_eq!(frame.columns()[1].kind(), Some(ValueKind::Int));
    }

    #[test]
    fn test_object_of_uneven_arrays_fails() {
        let err = parse(br#"{"a": [1, 2], "b": [1]}"#).unwrap_err();
        assert_eq!(err.to_string(), "All arrays must be of the same length");
    }

    #[test]
    fn test_values_orient() {
        let frame = parse(b"[[1, \"a\"], [2, \"b\"], [3]]").unwrap();
        let cols = frame.columns();
        assert_eq!(cols[0].name, "0");
        assert_eq!(cols[1].name, "1");
        assert_eq!(cols[1].values[2], Value::Null);
    }

    #[test]
    fn test_line_delimited() {
        let frame = parse(b"{\"a\": 1}\n{\"a\": 2, \"b\": [1, 2]}\n\n").unwrap();
        let cols = frame.columns();
        assert_eq!(cols[0].values, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(cols[1].values, vec![Value::Null, Value::Text("[1,2]".into())]);
    }

    #[test]
    fn test_malformed_json_reports_document_error() {
        let err = parse(b"[{\"a\": 1,}").unwrap_err();
        assert!(matches!(err, FrameError::Json(_)));
    }

    #[test]
    fn test_scalar_document_fails() {
        assert!(matches!(parse(b"42"), Err(FrameError::JsonShape(_))));
        assert!(matches!(parse(br#"{"a": 1}"#), Err(FrameError::JsonShape(_))));
    }

    #[test]
    fn test_empty_array_fails() {
        assert!(matches!(parse(b"[]"), Err(FrameError::Empty)));
    }
}

//! Spreadsheet parser (`.xls` / `.xlsx`)
//!
//! Reads the first worksheet; its first row is the header.

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::Cursor;

use super::{infer, Column, Frame, FrameError, Value};

pub fn parse(bytes: &[u8]) -> Result<Frame, FrameError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(FrameError::NoWorksheet)??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(FrameError::Empty);
    };

    let header_text: Vec<String> = header
        .iter()
        .map(|cell| match cell_value(cell) {
            Value::Null => String::new(),
            value => value.to_string(),
        })
        .collect();
    let names = infer::column_names(header_text.iter().map(String::as_str));

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (index, column) in columns.iter_mut().enumerate() {
            column.push(row.get(index).map_or(Value::Null, cell_value));
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, infer::unify(values, true)))
        .collect();
    Frame::new(columns)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if infer::is_na(s) => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map_or_else(|| Value::Text(cell.to_string()), Value::DateTime),
        other => Value::Text(other.to_string()),
    }
}

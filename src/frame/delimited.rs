//! Comma-separated parser

use super::{infer, strip_bom, Column, Frame, FrameError};

/// Parse CSV bytes; the first record is the header
pub fn parse(bytes: &[u8]) -> Result<Frame, FrameError> {
    let text = std::str::from_utf8(strip_bom(bytes))?;
    if text.trim().is_empty() {
        return Err(FrameError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let names = infer::column_names(reader.headers()?.iter());
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

    for record in reader.records() {
        let record = record?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push((!infer::is_na(field)).then(|| field.to_string()));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::new(name, infer::from_strings(raw)))
        .collect();
    Frame::new(columns)
}

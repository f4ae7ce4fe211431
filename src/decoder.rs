use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use thiserror::Error;
use tracing::debug;

use crate::sheet::{CellValue, RawSheet};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("Failed to read sheet '{name}': {msg}")]
    SheetRead { name: String, msg: String },
}

/// Decode the first worksheet of an .xlsx workbook into a [`RawSheet`].
///
/// The first row of the used range becomes the header row; everything
/// below it is data. Decoding is synchronous; callers on an async runtime
/// should wrap this in `spawn_blocking`.
pub fn read_first_sheet(path: &Path) -> Result<RawSheet, DecodeError> {
    let mut workbook: Xlsx<BufReader<File>> = match open_workbook(path) {
        Ok(workbook) => workbook,
        Err(e) => return Err(DecodeError::WorkbookOpen(e.to_string())),
    };

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DecodeError::SheetRead {
            name: sheet_name.clone(),
            msg: e.to_string(),
        })?;

    debug!(
        "Decoded sheet '{}' with dimensions {:?}",
        sheet_name,
        range.get_size()
    );
    Ok(range_to_sheet(&range))
}

fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| convert_cell(cell).display_string())
            .collect(),
        None => Vec::new(),
    };
    let body = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    RawSheet::new(headers, body)
}

/// Collapse the decoder's cell variants onto the pipeline's value model.
/// Date cells keep their serial number; error cells read as blank.
fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_convert_cell_maps_numbers_and_text() {
        assert_eq!(convert_cell(&Data::Int(60000)), CellValue::Number(60000.0));
        assert_eq!(convert_cell(&Data::Float(-268.3)), CellValue::Number(-268.3));
        assert_eq!(
            convert_cell(&Data::String("G05".to_string())),
            CellValue::Text("G05".to_string())
        );
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_convert_cell_blanks_out_empty_and_error() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            convert_cell(&Data::Error(CellErrorType::Div0)),
            CellValue::Empty
        );
    }
}

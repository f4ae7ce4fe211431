use std::collections::HashSet;

use tracing::warn;

/// A single cell as delivered by the workbook decoder.
///
/// Deliberately smaller than what the decoder can represent: date cells
/// arrive as their serial number, error cells as [`CellValue::Empty`]. The
/// pipeline only ever needs "a number, some text, or nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    /// Coerce the cell to a finite number. Junk becomes `None`, never an
    /// error.
    ///
    /// Text is trimmed before parsing, so `" -268.3 "` counts as numeric.
    /// Booleans and blanks are treated as missing, and so are NaN and the
    /// infinities: `f64::from_str` accepts `"NaN"` and `"inf"`, but a
    /// non-finite value is not a usable measurement.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Empty => None,
        };
        value.filter(|n| n.is_finite())
    }

    /// The cell's content as a label, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.display_string()),
        }
    }

    /// Render the cell the way it reads in the sheet. Whole-number floats
    /// print without a decimal point, so a numeric `103400` time cell
    /// renders as `"103400"` rather than `"103400.0"`.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// One worksheet's contents: a header row plus zero or more data rows.
///
/// Rows are padded (or clipped) to the header width on construction, so
/// positional access through [`RawSheet::column_index`] never goes out of
/// bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Number of data rows (the header row is not counted).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// True when the sheet has no data rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|row| row.as_slice())
    }

    /// Trim surrounding whitespace and upper-case every header label, in
    /// place. Idempotent: running it twice changes nothing.
    ///
    /// When two distinct labels collapse to the same normalized form the
    /// collision is logged; lookups then resolve to the last occurrence.
    pub fn normalize_headers(&mut self) {
        for label in &mut self.headers {
            *label = label.trim().to_uppercase();
        }

        let mut seen = HashSet::new();
        for label in &self.headers {
            if !seen.insert(label.as_str()) && !label.is_empty() {
                warn!(
                    "Duplicate column label '{}' after normalization; last occurrence wins",
                    label
                );
            }
        }
    }

    /// Position of a column by its exact (normalized) label. When the label
    /// appears more than once, the last occurrence wins.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().rposition(|h| h == label)
    }
}

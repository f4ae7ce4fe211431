/// CGGTTS track sheet parser
///
/// Validates one decoded worksheet and turns its rows into timestamped
/// track records: normalize headers, check the required columns, coerce
/// numerics, rebuild each row's timestamp from MJD + STTIME.
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::cggtts::timebase::MjdTimebase;
use crate::filename_meta::{dataset_from_filename, month_from_filename};
use crate::sheet::RawSheet;

/// Column labels a sheet must carry (after normalization) to count as
/// CGGTTS data at all.
pub const REQUIRED_COLUMNS: [&str; 3] = ["MJD", "STTIME", "REFSYS"];

/// One validated CGGTTS track: a single satellite measurement row plus the
/// labels carried over from the workbook it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    /// Absolute timestamp rebuilt from `mjd` and `sttime`
    pub datetime: NaiveDateTime,
    pub mjd: f64,
    /// Packed HHMMSS, zero-padded to 6 digits
    pub sttime: String,
    /// Satellite identifier, when the sheet has a SAT column
    pub sat: Option<String>,
    /// Elevation, 0.1 degree units in the source exports
    pub elv: Option<f64>,
    /// Azimuth, 0.1 degree units in the source exports
    pub azth: Option<f64>,
    /// REF minus SYS time difference, the measurement itself
    pub refsys: f64,
    pub month: String,
    pub dataset: String,
    pub source_file: String,
}

/// Why a whole sheet was turned away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no row carries a digit-only STTIME value")]
    NoDigitTimeRows,

    #[error("every candidate row is missing MJD, REFSYS or a resolvable timestamp")]
    NoCompleteRows,
}

/// Outcome of running one sheet through the pipeline.
///
/// `Accepted` never wraps an empty list; a sheet whose rows all fail
/// validation comes back `Rejected` with the cause, so callers don't have
/// to infer anything from row counts.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOutcome {
    Accepted(Vec<TrackRecord>),
    Rejected(RejectReason),
}

/// Per-sheet validation pipeline. Cheap to clone; carries only the timebase.
#[derive(Debug, Clone, Default)]
pub struct SheetParser {
    timebase: MjdTimebase,
}

impl SheetParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser that resolves timestamps against a non-standard epoch.
    pub fn with_timebase(timebase: MjdTimebase) -> Self {
        Self { timebase }
    }

    /// Validate one sheet. `source_file` is the workbook's filename; it is
    /// recorded on every track and mined for the month / data-set labels.
    pub fn parse(&self, mut sheet: RawSheet, source_file: &str) -> SheetOutcome {
        sheet.normalize_headers();

        let columns = (
            sheet.column_index("MJD"),
            sheet.column_index("STTIME"),
            sheet.column_index("REFSYS"),
        );
        let (mjd_col, sttime_col, refsys_col) = match columns {
            (Some(mjd), Some(sttime), Some(refsys)) => (mjd, sttime, refsys),
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .filter(|label| sheet.column_index(label).is_none())
                    .map(|label| label.to_string())
                    .collect();
                return SheetOutcome::Rejected(RejectReason::MissingColumns(missing));
            }
        };

        let sat_col = sheet.column_index("SAT");
        let elv_col = sheet.column_index("ELV");
        let azth_col = sheet.column_index("AZTH");

        let month = month_from_filename(source_file);
        let dataset = dataset_from_filename(source_file);

        let mut saw_digit_time = false;
        let mut records = Vec::new();

        for (row_idx, row) in sheet.rows().enumerate() {
            // Rows without a clean packed time are not tracks: repeated
            // header lines, units rows, trailing notes
            let sttime = match normalize_sttime(&row[sttime_col].display_string()) {
                Some(sttime) => sttime,
                None => continue,
            };
            saw_digit_time = true;

            let mjd = row[mjd_col].as_f64();
            let refsys = row[refsys_col].as_f64();
            let datetime = mjd.and_then(|day| self.timebase.resolve(day, &sttime));

            let (mjd, refsys, datetime) = match (mjd, refsys, datetime) {
                (Some(mjd), Some(refsys), Some(datetime)) => (mjd, refsys, datetime),
                _ => {
                    debug!(
                        "Dropping incomplete row {} of {source_file}",
                        row_idx + 1
                    );
                    continue;
                }
            };

            records.push(TrackRecord {
                datetime,
                mjd,
                sttime,
                sat: sat_col.and_then(|col| row[col].as_text()),
                elv: elv_col.and_then(|col| row[col].as_f64()),
                azth: azth_col.and_then(|col| row[col].as_f64()),
                refsys,
                month: month.clone(),
                dataset: dataset.clone(),
                source_file: source_file.to_string(),
            });
        }

        if !saw_digit_time {
            return SheetOutcome::Rejected(RejectReason::NoDigitTimeRows);
        }
        if records.is_empty() {
            return SheetOutcome::Rejected(RejectReason::NoCompleteRows);
        }

        debug!("{source_file}: {} track(s) accepted", records.len());
        SheetOutcome::Accepted(records)
    }
}

/// Normalize a packed STTIME value to its canonical 6-digit form.
///
/// Upstream numeric formatting strips leading zeros and can append a
/// literal `.0`, so `"930"` and `"103400.0"` are both valid inputs. Values
/// that are not pure ASCII digits after cleanup, or that carry more than 6
/// digits, are rejected.
///
/// # Examples
///
/// ```
/// use cggtts_ingest::cggtts::sheet_parser::normalize_sttime;
///
/// assert_eq!(normalize_sttime("103400"), Some("103400".to_string()));
/// assert_eq!(normalize_sttime(" 930 "), Some("000930".to_string()));
/// assert_eq!(normalize_sttime("103400.0"), Some("103400".to_string()));
/// assert_eq!(normalize_sttime("STTIME"), None);
/// assert_eq!(normalize_sttime("1034005"), None);
/// ```
pub fn normalize_sttime(raw: &str) -> Option<String> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_suffix(".0").unwrap_or(cleaned);
    if cleaned.is_empty() || cleaned.len() > 6 {
        return None;
    }
    if !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{cleaned:0>6}"))
}

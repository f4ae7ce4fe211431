// CGGTTS sheet handling
//
// Turns decoded worksheets into validated measurement records:
// - timebase: MJD day count + packed HHMMSS -> absolute timestamp
// - sheet_parser: header normalization, numeric coercion, row validation

pub mod sheet_parser;
pub mod timebase;

pub use sheet_parser::{RejectReason, SheetOutcome, SheetParser, TrackRecord};
pub use timebase::MjdTimebase;

use std::fs;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cggtts::sheet_parser::{RejectReason, SheetOutcome, SheetParser, TrackRecord};
use crate::cggtts::timebase::MjdTimebase;
use crate::decoder;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read data directory {dir:?}: {source}")]
    DataDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a workbook contributed no rows to the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file could not be decoded at all (corrupt, truncated, not xlsx)
    #[error("unreadable: {0}")]
    Unreadable(String),

    /// Decoded fine but the first sheet has no data rows
    #[error("empty sheet")]
    EmptySheet,

    /// Decoded, non-empty, but structurally not CGGTTS data
    #[error("invalid sheet: {0}")]
    InvalidSheet(RejectReason),
}

/// One skipped workbook and the reason it was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: SkipReason,
}

/// Result of ingesting a whole directory.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// The unified track table, in lexicographic filename order and then
    /// in-sheet row order
    pub records: Vec<TrackRecord>,
    /// Workbooks that were seen but contributed nothing
    pub skipped: Vec<SkippedFile>,
    /// Candidate .xlsx files found in the directory
    pub files_seen: usize,
}

impl LoadSummary {
    pub fn files_loaded(&self) -> usize {
        self.files_seen - self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

enum FileOutcome {
    Loaded(Vec<TrackRecord>),
    Skipped(SkipReason),
}

/// Ingests every CGGTTS workbook in a directory, one decode-validate pass
/// per file. A bad file is never fatal to the batch: unreadable, empty and
/// invalid workbooks are logged, recorded as skipped, and the loader moves
/// on to the next one.
#[derive(Debug, Clone, Default)]
pub struct BatchLoader {
    parser: SheetParser,
}

impl BatchLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader whose timestamps are resolved against a custom epoch.
    pub fn with_timebase(timebase: MjdTimebase) -> Self {
        Self {
            parser: SheetParser::with_timebase(timebase),
        }
    }

    /// Load every workbook sequentially, in lexicographic filename order.
    pub fn load_dir(&self, dir: &Path) -> Result<LoadSummary, LoadError> {
        let files = list_workbooks(dir)?;
        info!("Found {} candidate workbook(s) in {:?}", files.len(), dir);

        let mut summary = LoadSummary {
            files_seen: files.len(),
            ..Default::default()
        };
        for path in &files {
            let outcome = process_workbook(&self.parser, path);
            record_outcome(&mut summary, file_label(path), outcome);
        }

        info!(
            "Loaded {} track(s) from {} of {} workbook(s)",
            summary.records.len(),
            summary.files_loaded(),
            summary.files_seen
        );
        Ok(summary)
    }

    /// Same contract and same output as [`BatchLoader::load_dir`], but
    /// decodes up to `parallelism` workbooks at a time on blocking threads.
    /// Files are independent and read-only, and the buffered stream yields
    /// results in input order, so the unified table comes out identical to
    /// the sequential one.
    pub async fn load_dir_concurrent(
        &self,
        dir: &Path,
        parallelism: usize,
    ) -> Result<LoadSummary, LoadError> {
        let files = list_workbooks(dir)?;
        info!(
            "Found {} candidate workbook(s) in {:?}, decoding up to {} at a time",
            files.len(),
            dir,
            parallelism.max(1)
        );

        let files_seen = files.len();
        let outcomes: Vec<(String, FileOutcome)> = stream::iter(files)
            .map(|path| {
                let parser = self.parser.clone();
                async move {
                    let file_name = file_label(&path);
                    let joined =
                        tokio::task::spawn_blocking(move || process_workbook(&parser, &path))
                            .await;
                    match joined {
                        Ok(outcome) => (file_name, outcome),
                        Err(e) => (
                            file_name,
                            FileOutcome::Skipped(SkipReason::Unreadable(format!(
                                "decode task failed: {e}"
                            ))),
                        ),
                    }
                }
            })
            .buffered(parallelism.max(1))
            .collect()
            .await;

        let mut summary = LoadSummary {
            files_seen,
            ..Default::default()
        };
        for (file_name, outcome) in outcomes {
            record_outcome(&mut summary, file_name, outcome);
        }

        info!(
            "Loaded {} track(s) from {} of {} workbook(s)",
            summary.records.len(),
            summary.files_loaded(),
            summary.files_seen
        );
        Ok(summary)
    }
}

/// Decode and validate a single workbook. Never fails; failure modes all
/// collapse into a [`SkipReason`].
fn process_workbook(parser: &SheetParser, path: &Path) -> FileOutcome {
    let sheet = match decoder::read_first_sheet(path) {
        Ok(sheet) => sheet,
        Err(e) => return FileOutcome::Skipped(SkipReason::Unreadable(e.to_string())),
    };

    if sheet.is_empty() {
        return FileOutcome::Skipped(SkipReason::EmptySheet);
    }

    match parser.parse(sheet, &file_label(path)) {
        SheetOutcome::Accepted(records) => FileOutcome::Loaded(records),
        SheetOutcome::Rejected(reason) => FileOutcome::Skipped(SkipReason::InvalidSheet(reason)),
    }
}

fn record_outcome(summary: &mut LoadSummary, file_name: String, outcome: FileOutcome) {
    match outcome {
        FileOutcome::Loaded(mut records) => {
            debug!("{}: {} track(s)", file_name, records.len());
            summary.records.append(&mut records);
        }
        FileOutcome::Skipped(reason) => {
            match &reason {
                SkipReason::Unreadable(msg) => {
                    warn!("Skipping unreadable file {}: {}", file_name, msg)
                }
                SkipReason::EmptySheet => warn!("Skipping empty sheet: {}", file_name),
                SkipReason::InvalidSheet(_) => {
                    warn!(
                        "Skipping file (missing/invalid columns or STTIME): {}",
                        file_name
                    )
                }
            }
            summary.skipped.push(SkippedFile { file_name, reason });
        }
    }
}

/// Candidate workbooks in `dir`: regular files with an `.xlsx` extension
/// (any casing), sorted by filename. Subdirectories are not walked.
fn list_workbooks(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::DataDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::DataDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_workbook(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_workbook_checks_extension_case_insensitively() {
        assert!(is_workbook(Path::new("/data/Feb_CGGTTS_Data Set 1.xlsx")));
        assert!(is_workbook(Path::new("/data/FEB.XLSX")));
        assert!(!is_workbook(Path::new("/data/notes.txt")));
        assert!(!is_workbook(Path::new("/data/archive.xlsx.bak")));
        assert!(!is_workbook(Path::new("/data/xlsx")));
    }

    #[test]
    fn test_file_label_prefers_the_final_component() {
        assert_eq!(
            file_label(Path::new("/data/Feb_CGGTTS_Data Set 1.xlsx")),
            "Feb_CGGTTS_Data Set 1.xlsx"
        );
    }

    #[test]
    fn test_files_loaded_counts_seen_minus_skipped() {
        let mut summary = LoadSummary {
            files_seen: 3,
            ..Default::default()
        };
        record_outcome(
            &mut summary,
            "bad.xlsx".to_string(),
            FileOutcome::Skipped(SkipReason::EmptySheet),
        );
        assert_eq!(summary.files_loaded(), 2);
        assert_eq!(summary.skipped[0].reason, SkipReason::EmptySheet);
        assert!(summary.is_empty());
    }
}

use regex::Regex;

/// Extract the month label from a workbook filename.
///
/// The exports are named `<Month>_<whatever>.xlsx`; the label is whatever
/// alphabetic run sits before the first underscore, with the original casing
/// kept. Filenames that don't fit the shape get `"Unknown"`.
///
/// # Examples
///
/// ```
/// use cggtts_ingest::filename_meta::month_from_filename;
///
/// assert_eq!(month_from_filename("Feb_CGGTTS_Data Set 1.xlsx"), "Feb");
/// assert_eq!(month_from_filename("no_prefix_match_123.xlsx"), "no");
/// assert_eq!(month_from_filename("123_file.xlsx"), "Unknown");
/// assert_eq!(month_from_filename("random.xlsx"), "Unknown");
/// ```
pub fn month_from_filename(file_name: &str) -> String {
    match_month_prefix(file_name).unwrap_or_else(|| "Unknown".to_string())
}

fn match_month_prefix(file_name: &str) -> Option<String> {
    let re = Regex::new(r"^([A-Za-z]+)_").ok()?;
    let caps = re.captures(file_name.trim())?;
    Some(caps.get(1)?.as_str().to_string())
}

/// Extract the data-set label from a workbook filename.
///
/// Looks for a `Data Set <n>` marker (case sensitive, any amount of
/// whitespace before the number) anywhere in the name and returns
/// `"Set <n>"`. Filenames without the marker get `"Set ?"`.
///
/// # Examples
///
/// ```
/// use cggtts_ingest::filename_meta::dataset_from_filename;
///
/// assert_eq!(dataset_from_filename("Feb_CGGTTS_Data Set 1.xlsx"), "Set 1");
/// assert_eq!(dataset_from_filename("Mar_CGGTTS_Data Set   12.xlsx"), "Set 12");
/// assert_eq!(dataset_from_filename("random.xlsx"), "Set ?");
/// ```
pub fn dataset_from_filename(file_name: &str) -> String {
    match_dataset_number(file_name)
        .map(|n| format!("Set {n}"))
        .unwrap_or_else(|| "Set ?".to_string())
}

fn match_dataset_number(file_name: &str) -> Option<String> {
    let re = Regex::new(r"Data Set\s*(\d+)").ok()?;
    let caps = re.captures(file_name)?;
    Some(caps.get(1)?.as_str().to_string())
}

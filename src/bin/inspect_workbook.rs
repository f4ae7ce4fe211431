use std::env;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};

use cggtts_ingest::decoder::read_first_sheet;
use cggtts_ingest::filename_meta::{dataset_from_filename, month_from_filename};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: inspect-workbook <file.xlsx>");
        std::process::exit(2);
    }
    let file_path = &args[1];

    println!("Opening workbook: {file_path}");
    let workbook = open_workbook_auto(file_path)?;

    println!("\nSheet names:");
    for (i, name) in workbook.sheet_names().iter().enumerate() {
        println!("  {i}: {name}");
    }

    let file_name = Path::new(file_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.clone());

    println!("\nFilename labels:");
    println!("  month:    {}", month_from_filename(&file_name));
    println!("  data set: {}", dataset_from_filename(&file_name));

    // Only the first sheet matters to the ingest pipeline
    let mut sheet = read_first_sheet(Path::new(file_path))?;
    println!(
        "\nFirst sheet: {} data row(s) x {} column(s)",
        sheet.height(),
        sheet.width()
    );

    println!("\nRaw headers:      {:?}", sheet.headers());
    sheet.normalize_headers();
    println!("Normalized:       {:?}", sheet.headers());

    println!("\nFirst 20 rows (showing first 10 columns):");
    println!("{}", "=".repeat(100));
    for (row_idx, row) in sheet.rows().enumerate().take(20) {
        print!("Row {:3}: ", row_idx + 1);
        for cell in row.iter().take(10) {
            if cell.is_empty() {
                print!("[empty] ");
            } else {
                print!("[{}] ", cell.display_string());
            }
        }
        println!();
    }

    Ok(())
}

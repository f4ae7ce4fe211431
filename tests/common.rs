use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Cell payload for fixture workbooks.
#[derive(Debug, Clone)]
pub enum FixtureCell {
    Num(f64),
    Str(String),
    Blank,
}

pub fn num(value: f64) -> FixtureCell {
    FixtureCell::Num(value)
}

pub fn text(value: &str) -> FixtureCell {
    FixtureCell::Str(value.to_string())
}

/// Write a minimal single-sheet .xlsx workbook.
///
/// Strings go in as inline strings (no shared-strings part) and numbers as
/// plain `<v>` values, which is all the ingest pipeline ever sees from the
/// real exports. The first row is the header row.
pub fn write_workbook(path: &Path, header: &[&str], rows: &[Vec<FixtureCell>]) {
    let file = File::create(path).expect("create fixture workbook");
    let mut archive = ZipWriter::new(file);

    let parts: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(header, rows)),
    ];
    for (name, body) in parts {
        archive
            .start_file(name, SimpleFileOptions::default())
            .expect("start zip entry");
        archive
            .write_all(body.as_bytes())
            .expect("write zip entry");
    }
    archive.finish().expect("finish fixture workbook");
}

/// A file with an .xlsx name that is not a zip archive at all.
pub fn write_corrupt_workbook(path: &Path) {
    std::fs::write(path, b"this is not a zip archive").expect("write corrupt file");
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn sheet_xml(header: &[&str], rows: &[Vec<FixtureCell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    push_row(&mut xml, 1, &header.iter().map(|h| text(h)).collect::<Vec<_>>());
    for (i, row) in rows.iter().enumerate() {
        push_row(&mut xml, i + 2, row);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_row(xml: &mut String, row_num: usize, cells: &[FixtureCell]) {
    xml.push_str(&format!(r#"<row r="{row_num}">"#));
    for (col, cell) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_letters(col), row_num);
        match cell {
            FixtureCell::Num(value) => {
                xml.push_str(&format!(r#"<c r="{cell_ref}"><v>{value}</v></c>"#));
            }
            FixtureCell::Str(value) => {
                xml.push_str(&format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape_xml(value)
                ));
            }
            FixtureCell::Blank => {}
        }
    }
    xml.push_str("</row>");
}

/// 0 -> A, 25 -> Z, 26 -> AA, ...
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ascii column letters")
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

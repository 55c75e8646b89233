use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};

use crate::drug::Drug;
use crate::normalize::{RawRecord, normalize_records, records_from_value};

/// Formats a drug list can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    /// Tab separated, as exported from spreadsheet applications.
    Tsv,
    Json,
    /// Binary workbook (`.xlsx`, `.xls`, `.ods`); only the first sheet is read.
    Spreadsheet,
}

impl SourceFormat {
    /// Picks a format from the extension of a file name.
    ///
    /// Plain `.txt` files carry no format of their own and yield `None`; use
    /// [`SourceFormat::detect`] to sniff their delimiter.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.rsplit_once('.')?;

        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Like [`SourceFormat::from_file_name`], but a `.txt` file is read as
    /// tab separated when its header line holds a tab and as CSV otherwise.
    pub fn detect(name: &str, bytes: &[u8]) -> Option<Self> {
        if let Some(format) = Self::from_file_name(name) {
            return Some(format);
        }

        let (_, extension) = name.rsplit_once('.')?;
        if !extension.eq_ignore_ascii_case("txt") {
            return None;
        }

        let header = bytes
            .split(|byte| *byte == b'\n')
            .find(|line| line.iter().any(|byte| !byte.is_ascii_whitespace()))
            .unwrap_or_default();

        if header.contains(&b'\t') {
            Some(Self::Tsv)
        } else {
            Some(Self::Csv)
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            _ => b',',
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },
    #[error("failed to parse CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("unsupported file type: {name} (expected .csv, .tsv, .txt, .json, .xlsx or .xls)")]
    UnsupportedFormat { name: String },
    #[error("failed to read data file at {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
}

impl PartialEq for IngestError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MalformedInput { reason: left }, Self::MalformedInput { reason: right }) => {
                left == right
            }
            (Self::UnsupportedFormat { name: left }, Self::UnsupportedFormat { name: right }) => {
                left == right
            }
            (Self::ReadError { path: left, .. }, Self::ReadError { path: right, .. }) => {
                left == right
            }
            (Self::Csv(_), Self::Csv(_))
            | (Self::Json(_), Self::Json(_))
            | (Self::Spreadsheet(_), Self::Spreadsheet(_)) => true,
            _ => false,
        }
    }
}

impl Eq for IngestError {}

/// Parses `text` into raw rows without normalizing them.
pub fn parse_records(format: SourceFormat, text: &str) -> Result<Vec<RawRecord>, IngestError> {
    parse_bytes(format, text.as_bytes())
}

/// Detects the format from `file_name`, then parses and normalizes `text`.
pub fn load_source(file_name: &str, text: &str) -> Result<Vec<Drug>, IngestError> {
    load_bytes(file_name, text.as_bytes())
}

/// Like [`load_source`], for raw file contents. Binary workbooks can only be
/// loaded this way.
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> Result<Vec<Drug>, IngestError> {
    let format = SourceFormat::detect(file_name, bytes).ok_or_else(|| {
        IngestError::UnsupportedFormat {
            name: file_name.to_string(),
        }
    })?;

    let records = parse_bytes(format, bytes)?;
    log::debug!("parsed {} raw records from {file_name} as {format:?}", records.len());

    Ok(normalize_records(&records))
}

/// Reads a data file from disk and normalizes its contents.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<Drug>, IngestError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| IngestError::ReadError {
        path: path.display().to_string(),
        source,
    })?;

    let file_name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or_default();

    load_bytes(file_name, &bytes)
}

fn parse_bytes(format: SourceFormat, bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    match format {
        SourceFormat::Csv | SourceFormat::Tsv => parse_delimited(bytes, format.delimiter()),
        SourceFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            records_from_value(value)
        }
        SourceFormat::Spreadsheet => parse_workbook(bytes),
    }
}

fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(IngestError::MalformedInput {
            reason: "CSV must have header and at least one data row".to_string(),
        });
    }

    let mut rows = 0;
    let mut records: Vec<RawRecord> = Vec::new();

    for row in reader.records() {
        let row = row?;
        rows += 1;

        // Short rows are usually a truncated export; skip them rather than guess.
        if row.len() < headers.len() {
            log::debug!("skipping row {rows}: {} of {} columns", row.len(), headers.len());
            continue;
        }

        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }

    if rows == 0 {
        return Err(IngestError::MalformedInput {
            reason: "CSV must have header and at least one data row".to_string(),
        });
    }

    Ok(records)
}

/// Reads the first sheet, keyed by its header row. Missing cells become empty
/// strings and fully blank rows are skipped.
fn parse_workbook(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::MalformedInput {
            reason: "workbook has no sheets".to_string(),
        })??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();

    let records: Vec<RawRecord> = rows
        .filter(|row| row.iter().any(|cell| !cell_text(cell).is_empty()))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(column, header)| {
                    let value = row.get(column).map(cell_text).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect()
        })
        .collect();

    if headers.iter().all(String::is_empty) || records.is_empty() {
        return Err(IngestError::MalformedInput {
            reason: "No data found in spreadsheet".to_string(),
        });
    }

    Ok(records)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_from_extension() {
        assert_eq!(SourceFormat::from_file_name("drugs.csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_file_name("DRUGS.JSON"), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_file_name("export.tsv"), Some(SourceFormat::Tsv));
        assert_eq!(SourceFormat::from_file_name("sheet.xlsx"), Some(SourceFormat::Spreadsheet));
        assert_eq!(SourceFormat::from_file_name("legacy.XLS"), Some(SourceFormat::Spreadsheet));
        assert_eq!(SourceFormat::from_file_name("notes.txt"), None);
        assert_eq!(SourceFormat::from_file_name("README"), None);
    }

    #[test]
    fn txt_delimiter_follows_header_line() {
        assert_eq!(
            SourceFormat::detect("drugs.txt", b"\nname\tmoa\nA\tb\n"),
            Some(SourceFormat::Tsv)
        );
        assert_eq!(
            SourceFormat::detect("drugs.txt", b"name,moa\nA,b\tc\n"),
            Some(SourceFormat::Csv)
        );
        assert_eq!(SourceFormat::detect("drugs.pdf", b"name,moa\n"), None);
    }

    #[test]
    fn comma_separated_txt_loads() {
        let text = "Drug Name,Mechanism of Action\n\
                    Warfarin,Vitamin K antagonist\n\
                    Heparin,Antithrombin III activator\n";

        let drugs = load_source("drugs.txt", text).expect("comma separated txt should load");

        assert_eq!(drugs.len(), 2);
        assert_eq!(drugs[1].name, "Heparin");
        assert_eq!(drugs[1].moa, "Antithrombin III activator");
    }

    #[test]
    fn tab_separated_txt_loads() {
        let text = "Drug Name\tMechanism of Action\nWarfarin\tInhibits factors II, VII, IX, X\n";

        let drugs = load_source("drugs.txt", text).expect("tab separated txt should load");

        assert_eq!(drugs.len(), 1);
        assert_eq!(drugs[0].moa, "Inhibits factors II, VII, IX, X");
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let text = "Drug Name,Mechanism of Action,Adverse Events\n\
                    Warfarin,\"Inhibits factors II, VII, IX, X\",Bleeding\n";

        let records = parse_records(SourceFormat::Csv, text).expect("csv should parse");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("Mechanism of Action").map(String::as_str),
            Some("Inhibits factors II, VII, IX, X")
        );
    }

    #[test]
    fn blank_lines_and_padding_are_ignored() {
        let text = " Drug Name , moa \n\n  Furosemide ,  Loop diuretic \n\n";

        let records = parse_records(SourceFormat::Csv, text).expect("csv should parse");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Drug Name").map(String::as_str), Some("Furosemide"));
        assert_eq!(records[0].get("moa").map(String::as_str), Some("Loop diuretic"));
    }

    #[test]
    fn short_rows_are_dropped() {
        let text = "name,moa,adverse\nComplete,a,b\nShort,c\n";

        let records = parse_records(SourceFormat::Csv, text).expect("csv should parse");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name").map(String::as_str), Some("Complete"));
    }

    #[test]
    fn header_only_csv_is_malformed() {
        let error =
            parse_records(SourceFormat::Csv, "name,moa\n").expect_err("no data rows should fail");

        assert!(matches!(error, IngestError::MalformedInput { .. }));
    }

    #[test]
    fn empty_csv_is_malformed() {
        let error = parse_records(SourceFormat::Csv, "").expect_err("empty input should fail");

        assert!(matches!(error, IngestError::MalformedInput { .. }));
    }

    #[test]
    fn tab_separated_exports_parse() {
        let text = "Drug Name\tClinical Indications\nAmiodarone\tAtrial, ventricular arrhythmias\n";

        let drugs = load_source("sheet.tsv", text).expect("tsv should load");

        assert_eq!(drugs.len(), 1);
        assert_eq!(drugs[0].indications, "Atrial, ventricular arrhythmias");
    }

    #[test]
    fn invalid_json_reports_parse_error() {
        let error = load_source("drugs.json", "[{").expect_err("truncated json should fail");

        assert!(matches!(error, IngestError::Json(_)));
    }

    #[test]
    fn json_object_root_is_malformed() {
        let error =
            load_source("drugs.json", r#"{"drugs": []}"#).expect_err("object root should fail");

        assert_eq!(
            error,
            IngestError::MalformedInput {
                reason: "JSON must be an array of objects".to_string()
            }
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let error = load_source("drugs.pdf", "").expect_err("pdf is not a data file");

        assert_eq!(
            error,
            IngestError::UnsupportedFormat {
                name: "drugs.pdf".to_string()
            }
        );
    }

    /// Builds a one-sheet `.xlsx` with inline string cells; `None` leaves the
    /// cell out entirely.
    fn workbook(rows: &[&[Option<&str>]]) -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut sheet = String::new();
        for (row_index, row) in rows.iter().enumerate() {
            sheet.push_str(&format!("<row r=\"{}\">", row_index + 1));
            for (column, cell) in row.iter().enumerate() {
                if let Some(text) = cell {
                    let reference = format!("{}{}", (b'A' + column as u8) as char, row_index + 1);
                    sheet.push_str(&format!(
                        "<c r=\"{reference}\" t=\"inlineStr\"><is><t>{text}</t></is></c>"
                    ));
                }
            }
            sheet.push_str("</row>");
        }

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Drugs" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet}</sheetData></worksheet>"#
                ),
            ),
        ];

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            archive.start_file(name, options).expect("zip entry should start");
            archive.write_all(body.as_bytes()).expect("zip entry should be written");
        }

        archive.finish().expect("zip should finish").into_inner()
    }

    #[test]
    fn first_sheet_of_workbook_loads() {
        let bytes = workbook(&[
            &[Some("Drug Name"), Some("Mechanism of Action"), Some("Adverse Events")],
            &[Some("Warfarin"), Some("Vitamin K antagonist"), None],
            &[None, None, None],
            &[Some("Heparin"), Some("Antithrombin III activator"), Some("HIT")],
        ]);

        let drugs = load_bytes("monographs.xlsx", &bytes).expect("workbook should load");

        assert_eq!(drugs.len(), 2);
        assert_eq!(drugs[0].name, "Warfarin");
        assert_eq!(drugs[0].moa, "Vitamin K antagonist");
        assert!(drugs[0].adverse.is_empty());
        assert_eq!(drugs[1].name, "Heparin");
        assert_eq!(drugs[1].adverse, "HIT");
    }

    #[test]
    fn empty_cells_become_empty_strings() {
        let bytes = workbook(&[
            &[Some("name"), Some("moa"), Some("adverse")],
            &[Some("Lisinopril"), None, Some("Cough")],
        ]);

        let records = parse_bytes(SourceFormat::Spreadsheet, &bytes).expect("sheet should parse");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("moa").map(String::as_str), Some(""));
        assert_eq!(records[0].get("adverse").map(String::as_str), Some("Cough"));
    }

    #[test]
    fn header_only_workbook_is_malformed() {
        let bytes = workbook(&[&[Some("name"), Some("moa")]]);

        let error = load_bytes("drugs.xlsx", &bytes).expect_err("no data rows should fail");

        assert_eq!(
            error,
            IngestError::MalformedInput {
                reason: "No data found in spreadsheet".to_string()
            }
        );
    }

    #[test]
    fn corrupt_workbook_reports_spreadsheet_error() {
        let error =
            load_bytes("drugs.xlsx", b"not a workbook").expect_err("garbage should not decode");

        assert!(matches!(error, IngestError::Spreadsheet(_)));
    }

    #[test]
    fn loads_csv_from_disk() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path = root.path().join("cardio.csv");
        fs::write(
            &path,
            "Drug Name,Mechanism of Action,Contraindications\n\
             Lisinopril,ACE inhibitor,Pregnancy\n\
             Empty,,\n\
             Metoprolol,Beta-1 blocker,\n",
        )
        .expect("csv should be written");

        let drugs = load_path(&path).expect("csv file should load");

        assert_eq!(drugs.len(), 2);
        assert_eq!(drugs[0].name, "Lisinopril");
        assert_eq!(drugs[1].name, "Metoprolol");
        assert_eq!(drugs[1].id, 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let path = root.path().join("absent.json");

        let error = load_path(&path).expect_err("missing file should fail");

        assert_eq!(
            error,
            IngestError::ReadError {
                path: path.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
        );
    }
}

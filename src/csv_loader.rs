// csv_loader.rs
use crate::csv_table::{Cell, Table};
use crate::errors::{ProcessError, ProcessResult};
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// Parses csv bytes into a `Table`. `source` names the file in error messages.
///
/// The first record is the header row. Blank fields load as missing values,
/// and so do trailing fields a short row leaves out. Repeated header names
/// become `name.1`, `name.2`, ...
pub fn load_csv_bytes(source: &str, bytes: &[u8]) -> ProcessResult<Table> {
    let malformed = |reason: String| ProcessError::MalformedInput {
        file: source.to_string(),
        reason,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .iter()
        .enumerate()
        .map(|(index, header)| {
            if index == 0 {
                header.trim_start_matches(UTF8_BOM).to_string()
            } else {
                header.to_string()
            }
        })
        .collect();

    if raw_headers.is_empty() || (raw_headers.len() == 1 && raw_headers[0].is_empty()) {
        return Err(malformed("no header row".to_string()));
    }
    let headers = dedupe_headers(raw_headers);
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        if record.len() > width {
            let line = record.position().map_or(0, |p| p.line());
            return Err(malformed(format!(
                "line {} has {} fields, but the header has {}",
                line,
                record.len(),
                width
            )));
        }
        let mut row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        row.resize(width, None);
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}

/// Renames repeats the way dataframe readers do: the second `a` becomes
/// `a.1`, skipping any suffix that is already taken.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        if taken.contains(&name) {
            let count = counts.entry(header.clone()).or_insert(0);
            loop {
                *count += 1;
                name = format!("{}.{}", header, count);
                if !taken.contains(&name) {
                    break;
                }
            }
        }
        taken.insert(name.clone());
        out.push(name);
    }

    out
}

/// Reads a csv file from disk and parses it.
pub fn load_csv_file(path: &Path) -> ProcessResult<Table> {
    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string());

    let bytes = fs::read(path).map_err(|e| ProcessError::MalformedInput {
        file: source.clone(),
        reason: e.to_string(),
    })?;

    load_csv_bytes(&source, &bytes)
}

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx, open_workbook};

use super::model::{CellValue, Sheet, Workbook};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a workbook from a file.  Dispatch by extension.
///
/// Only `.xlsx` is accepted: each sheet must be a rectangular table whose
/// first row is the header.  Every sheet is parsed eagerly so the filter
/// pipeline never touches the file again.
pub fn load_file(path: &Path) -> Result<Workbook> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" => load_xlsx(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

fn load_xlsx(path: &Path) -> Result<Workbook> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("reading worksheet '{sheet_name}'"))?;
        sheets.push(parse_sheet(&sheet_name, &range)?);
    }

    Ok(Workbook { sheets })
}

/// Turn a cell range into a header + typed rows.
///
/// The first row of the range is the header; header cells are stringified.
/// Empty cells are omitted from the row maps so the column union only
/// reflects columns that actually carry data.
fn parse_sheet(name: &str, range: &calamine::Range<Data>) -> Result<Sheet> {
    let mut rows_iter = range.rows();

    let Some(header_row) = rows_iter.next() else {
        // A sheet with no cells at all: keep it, with no columns.
        return Ok(Sheet {
            name: name.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        });
    };

    let columns: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut cells: BTreeMap<String, CellValue> = BTreeMap::new();
        for (col_idx, cell) in row.iter().enumerate() {
            let Some(column) = columns.get(col_idx) else {
                continue;
            };
            if column.is_empty() {
                continue;
            }
            let value = convert_cell(cell);
            if value == CellValue::Empty {
                continue;
            }
            cells.insert(column.clone(), value);
        }
        // Skip fully-empty trailing rows.
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    Ok(Sheet {
        name: name.to_string(),
        columns,
        rows,
    })
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::String(format!("{e:?}")),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        other => CellValue::DateTime(other.to_string()),
    }
}

//! Table loading: turn a spreadsheet file into a header + ordered rows.
//!
//! Pay bills arrive as workbooks whose first row is a free-text title, so the
//! loader skips a configurable number of leading rows and promotes the next
//! one to the header. Everything downstream addresses cells by column name
//! through [`RawRow::get`], never by position.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods`) are read with
//! calamine; `.csv` files with the `csv` crate, where any field that parses as
//! a number becomes [`CellValue::Number`] so both sources feed the same
//! serial-number check.

use crate::error::PaysheetError;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::Timelike;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One spreadsheet cell after loading.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Blank, missing, or an error cell such as `#N/A`.
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The numeric payload, if this cell holds a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// Display text for the cell, `None` when empty.
    ///
    /// Integral numbers print without a fractional part so account numbers
    /// and day counts read naturally (`4821`, not `4821.0`).
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ts) if ts.num_seconds_from_midnight() == 0 => {
                    CellValue::Text(ts.format("%Y-%m-%d").to_string())
                }
                Some(ts) => CellValue::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Parse one CSV field the way a spreadsheet would type it.
fn cell_from_csv(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

// ── Table ────────────────────────────────────────────────────────────────

/// A loaded sheet: unique header names and rectangular rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Borrowed view of one row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    headers: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> RawRow<'a> {
    /// Cell under `column`; [`CellValue::Empty`] when the column is unknown.
    pub fn get(&self, column: &str) -> &'a CellValue {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.cells.get(i))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Display text under `column`, `None` when missing or empty.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).to_text()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

impl RawTable {
    /// Build a table, padding every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, CellValue::Empty);
                r
            })
            .collect();
        Self { headers, rows }
    }

    /// Build a table from a raw cell grid: drop `skip_rows` leading rows and
    /// promote the next one to the header.
    ///
    /// Blank header cells become `Unnamed: <index>`; repeated names gain a
    /// `.1`, `.2`, … suffix so every column stays addressable.
    pub fn from_grid(mut grid: Vec<Vec<CellValue>>, skip_rows: usize) -> Option<Self> {
        if grid.len() <= skip_rows {
            return None;
        }
        let mut rows = grid.split_off(skip_rows);
        let header_cells = rows.remove(0);

        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header_cells.len()))
            .max()
            .unwrap_or(0);

        let mut seen: HashMap<String, usize> = HashMap::new();
        let headers = (0..width)
            .map(|i| {
                let base = header_cells
                    .get(i)
                    .and_then(CellValue::to_text)
                    .unwrap_or_else(|| format!("Unnamed: {i}"));
                let count = seen.entry(base.clone()).or_insert(0);
                let name = if *count == 0 {
                    base
                } else {
                    format!("{base}.{count}")
                };
                *count += 1;
                name
            })
            .collect();

        Some(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Iterate rows in sheet order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = RawRow<'_>> + '_ {
        self.rows.iter().map(move |cells| RawRow {
            headers: &self.headers,
            cells,
        })
    }

    /// Remove columns whose every data cell is empty.
    ///
    /// Returns the trimmed table and the names of the dropped columns.
    pub fn drop_empty_columns(self) -> (Self, Vec<String>) {
        let keep: Vec<bool> = (0..self.headers.len())
            .map(|i| self.rows.iter().any(|r| !r[i].is_empty()))
            .collect();

        let mut headers = Vec::with_capacity(self.headers.len());
        let mut dropped = Vec::new();
        for (name, kept) in self.headers.into_iter().zip(&keep) {
            if *kept {
                headers.push(name);
            } else {
                dropped.push(name);
            }
        }

        let rows = self
            .rows
            .into_iter()
            .map(|r| {
                r.into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, kept)| kept.then_some(cell))
                    .collect()
            })
            .collect();

        (Self { headers, rows }, dropped)
    }
}

// ── Loading ──────────────────────────────────────────────────────────────

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Any workbook calamine can open.
    Workbook,
    Csv,
}

impl SourceFormat {
    /// Classify a path by its extension.
    pub fn detect(path: &Path) -> Result<Self, PaysheetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "xla" | "xlam" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(PaysheetError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Validate that `path` names a readable spreadsheet and classify it.
pub fn resolve_source(path: &Path) -> Result<SourceFormat, PaysheetError> {
    if !path.exists() {
        return Err(PaysheetError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PaysheetError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PaysheetError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let format = SourceFormat::detect(path)?;
    debug!("Resolved {:?} source: {}", format, path.display());
    Ok(format)
}

/// Load a table from `path`.
///
/// `sheet` picks a worksheet by name (first sheet when `None`; ignored for
/// CSV). `skip_rows` leading rows are discarded before the header row.
pub fn read_table(
    path: &Path,
    sheet: Option<&str>,
    skip_rows: usize,
) -> Result<RawTable, PaysheetError> {
    let format = resolve_source(path)?;
    let grid = match format {
        SourceFormat::Workbook => read_workbook_grid(path, sheet)?,
        SourceFormat::Csv => read_csv_grid(path)?,
    };

    let table = RawTable::from_grid(grid, skip_rows).ok_or_else(|| PaysheetError::MissingHeader {
        path: path.to_path_buf(),
        skipped: skip_rows,
    })?;

    info!(
        "Loaded {} rows × {} columns from {}",
        table.len(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

fn unreadable(path: &Path, detail: impl fmt::Display) -> PaysheetError {
    PaysheetError::UnreadableTable {
        path: PathBuf::from(path),
        detail: detail.to_string(),
    }
}

/// Read a worksheet into a grid anchored at cell A1.
///
/// calamine ranges start at the first used cell; leading blank rows and
/// columns are restored so `skip_rows` always counts sheet rows.
fn read_workbook_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>, PaysheetError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(path, e))?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| PaysheetError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: wanted.to_string(),
                available: names.clone(),
            })?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| unreadable(path, "workbook contains no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| unreadable(path, format!("sheet '{name}': {e}")))?;

    let (row0, col0) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); row0 as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col0 as usize];
        cells.extend(row.iter().map(CellValue::from));
        grid.push(cells);
    }

    debug!("Sheet '{}' yielded {} raw rows", name, grid.len());
    Ok(grid)
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<CellValue>>, PaysheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| unreadable(path, e))?;

    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(cell_from_csv).collect())
                .map_err(|e| unreadable(path, e))
        })
        .collect()
}

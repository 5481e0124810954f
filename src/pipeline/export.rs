//! Export of consolidated records to CSV and XLSX.
//!
//! Both encoders produce bytes in memory first; [`write_atomic`] then puts
//! them on disk through a temp file in the destination directory and a
//! rename, so a failed run never leaves a half-written export behind.

use crate::error::PaysheetError;
use crate::pipeline::consolidate::EmployeeRecord;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Column order of every export.
pub const EXPORT_COLUMNS: [&str; 5] = [
    "Sr_No",
    "Employee_Name",
    "Designation",
    "Min_Pay_Scale",
    "Max_Pay_Scale",
];

const SHEET_NAME: &str = "Cleaned";

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Sr_No")]
    sr_no: Option<i64>,
    #[serde(rename = "Employee_Name")]
    employee_name: Option<&'a str>,
    #[serde(rename = "Designation")]
    designation: Option<&'a str>,
    #[serde(rename = "Min_Pay_Scale")]
    min_pay_scale: Option<i64>,
    #[serde(rename = "Max_Pay_Scale")]
    max_pay_scale: Option<i64>,
}

impl<'a> From<&'a EmployeeRecord> for ExportRow<'a> {
    fn from(r: &'a EmployeeRecord) -> Self {
        Self {
            sr_no: r.serial_number,
            employee_name: r.employee_name.as_deref(),
            designation: r.designation.as_deref(),
            min_pay_scale: r.min_pay_scale,
            max_pay_scale: r.max_pay_scale,
        }
    }
}

/// Encode records as UTF-8 CSV with a header row; absent values are empty.
pub fn encode_csv(records: &[EmployeeRecord]) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if records.is_empty() {
        // serde only emits the header alongside the first record
        writer.write_record(EXPORT_COLUMNS).map_err(|e| e.to_string())?;
    }
    for record in records {
        writer
            .serialize(ExportRow::from(record))
            .map_err(|e| e.to_string())?;
    }
    writer.into_inner().map_err(|e| e.to_string())
}

/// Encode records as a single-sheet workbook.
pub fn encode_xlsx(records: &[EmployeeRecord]) -> Result<Vec<u8>, String> {
    build_workbook(records)
        .and_then(|mut wb| wb.save_to_buffer())
        .map_err(|e| e.to_string())
}

fn build_workbook(records: &[EmployeeRecord]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        if let Some(v) = record.serial_number {
            sheet.write_number(row, 0, v as f64)?;
        }
        if let Some(v) = &record.employee_name {
            sheet.write_string(row, 1, v)?;
        }
        if let Some(v) = &record.designation {
            sheet.write_string(row, 2, v)?;
        }
        if let Some(v) = record.min_pay_scale {
            sheet.write_number(row, 3, v as f64)?;
        }
        if let Some(v) = record.max_pay_scale {
            sheet.write_number(row, 4, v as f64)?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.autofit();
    Ok(workbook)
}

/// Write `bytes` to `path` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PaysheetError> {
    let write_failed = |source: std::io::Error| PaysheetError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_failed)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_failed)?;
    tmp.write_all(bytes).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Encode and write the CSV export.
pub fn write_csv(records: &[EmployeeRecord], path: &Path) -> Result<(), PaysheetError> {
    let bytes = encode_csv(records).map_err(|detail| PaysheetError::ExportFailed {
        path: path.to_path_buf(),
        detail,
    })?;
    write_atomic(path, &bytes)
}

/// Encode and write the XLSX export.
pub fn write_xlsx(records: &[EmployeeRecord], path: &Path) -> Result<(), PaysheetError> {
    let bytes = encode_xlsx(records).map_err(|detail| PaysheetError::ExportFailed {
        path: path.to_path_buf(),
        detail,
    })?;
    write_atomic(path, &bytes)
}

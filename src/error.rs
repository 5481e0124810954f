//! Error types for the paysheet library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PaysheetError`] — **Fatal**: the run cannot proceed at all (source
//!   file missing, unreadable table, required column absent, export could not
//!   be written). Returned as `Err(PaysheetError)` from the top-level
//!   [`crate::clean`] and [`crate::certify`] functions.
//!
//! * [`RecordError`] — **Non-fatal**: a single certificate failed to render
//!   or save, but every other row is fine. Stored inside
//!   [`crate::output::CertificateResult`] so one bad row never costs the
//!   whole batch.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the paysheet library.
///
/// Per-certificate failures use [`RecordError`] and are stored in
/// [`crate::output::CertificateResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PaysheetError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("Spreadsheet not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file extension is not a spreadsheet format we can read.
    #[error("Unsupported input format '{extension}' for '{path}'\nExpected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The workbook exists but could not be parsed.
    #[error("Could not read table from '{path}': {detail}")]
    UnreadableTable { path: PathBuf, detail: String },

    /// The requested worksheet does not exist in the workbook.
    #[error("Sheet '{sheet}' not found in '{path}'. Available: {available:?}")]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    /// Nothing is left once the leading metadata rows are skipped.
    #[error("No header row in '{path}' after skipping {skipped} row(s)")]
    MissingHeader { path: PathBuf, skipped: usize },

    /// A column the consolidator relies on is absent (or was entirely empty
    /// and therefore dropped).
    #[error("Required column '{column}' not found. Columns present: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create, write or rename an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV or XLSX encoder rejected the cleaned data.
    #[error("Failed to export '{path}': {detail}")]
    ExportFailed { path: PathBuf, detail: String },

    /// Some certificates rendered but at least one failed.
    ///
    /// Returned by [`crate::output::CertifyOutput::into_result`] when the
    /// caller wants to treat any record failure as an error.
    #[error("{failed}/{total} certificates failed")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single certificate.
///
/// `record` is the 0-based row index within the loaded table.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RecordError {
    /// A field contains a character the certificate fonts cannot encode.
    #[error("Record {record}: cannot encode {ch:?} in field text {text:?}")]
    Encoding {
        record: usize,
        ch: char,
        text: String,
    },

    /// The PDF writer failed while serialising the document.
    #[error("Record {record}: PDF encoding failed: {detail}")]
    PdfEncoding { record: usize, detail: String },

    /// The rendered certificate could not be written to disk.
    #[error("Record {record}: failed to write '{path}': {detail}")]
    WriteFailed {
        record: usize,
        path: PathBuf,
        detail: String,
    },
}

impl RecordError {
    /// Row index of the record that failed.
    pub fn record(&self) -> usize {
        match self {
            RecordError::Encoding { record, .. }
            | RecordError::PdfEncoding { record, .. }
            | RecordError::WriteFailed { record, .. } => *record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = PaysheetError::PartialFailure {
            success: 9,
            failed: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn missing_column_lists_available() {
        let e = PaysheetError::MissingColumn {
            column: "Sr. No.".into(),
            available: vec!["Name".into(), "Office".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("Sr. No."));
        assert!(msg.contains("Office"));
    }

    #[test]
    fn file_not_found_display() {
        let e = PaysheetError::FileNotFound {
            path: PathBuf::from("/tmp/pay_bill.xlsx"),
        };
        assert!(e.to_string().contains("pay_bill.xlsx"));
    }

    #[test]
    fn encoding_error_names_character() {
        let e = RecordError::Encoding {
            record: 4,
            ch: '₹',
            text: "₹ 500".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Record 4"), "got: {msg}");
        assert!(msg.contains('₹'));
        assert_eq!(e.record(), 4);
    }

    #[test]
    fn record_error_roundtrips_through_json() {
        let e = RecordError::PdfEncoding {
            record: 2,
            detail: "stream".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: RecordError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.record(), 2);
    }
}

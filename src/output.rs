//! Result types returned by the clean and certify pipelines.

use crate::error::{PaysheetError, RecordError};
use crate::pipeline::consolidate::EmployeeRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Clean ────────────────────────────────────────────────────────────────

/// Consolidated pay-bill records plus run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanOutput {
    pub records: Vec<EmployeeRecord>,
    pub stats: CleanStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanStats {
    /// Data rows read below the header.
    pub rows_read: usize,
    /// Columns removed because every data cell was empty.
    pub columns_dropped: Vec<String>,
    pub records: usize,
    pub with_name: usize,
    pub with_designation: usize,
    /// Records whose pay scale yielded both bounds.
    pub with_pay_scale: usize,
    pub duration_ms: u64,
}

impl CleanStats {
    pub(crate) fn tally(rows_read: usize, columns_dropped: Vec<String>, records: &[EmployeeRecord]) -> Self {
        Self {
            rows_read,
            columns_dropped,
            records: records.len(),
            with_name: records.iter().filter(|r| r.employee_name.is_some()).count(),
            with_designation: records.iter().filter(|r| r.designation.is_some()).count(),
            with_pay_scale: records
                .iter()
                .filter(|r| r.min_pay_scale.is_some() && r.max_pay_scale.is_some())
                .count(),
            duration_ms: 0,
        }
    }
}

/// Where [`crate::clean_to_files`] wrote its exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
}

// ── Certify ──────────────────────────────────────────────────────────────

/// Outcome for one table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateResult {
    /// 0-based row index in the loaded table.
    pub index: usize,
    /// Employee name, or `Employee_<index>` when absent.
    pub name: String,
    /// Department, or the placeholder when absent.
    pub department: String,
    pub file_name: String,
    /// Rendered document; `None` on failure and once written to disk.
    #[serde(skip)]
    pub pdf: Option<Vec<u8>>,
    /// Size of the rendered document in bytes (0 on failure).
    pub size_bytes: usize,
    /// Set when the output was written by [`crate::certify_to_dir`].
    pub path: Option<PathBuf>,
    pub error: Option<RecordError>,
}

impl CertificateResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifyStats {
    pub total_rows: usize,
    pub rendered: usize,
    pub failed: usize,
    /// Rows with no non-empty cell.
    pub skipped_blank: usize,
    pub total_bytes: u64,
    pub duration_ms: u64,
}

impl CertifyStats {
    pub(crate) fn record(&mut self, result: &CertificateResult) {
        if result.is_ok() {
            self.rendered += 1;
            self.total_bytes += result.size_bytes as u64;
        } else {
            self.failed += 1;
        }
    }
}

/// Every certificate of a batch, in table order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertifyOutput {
    pub certificates: Vec<CertificateResult>,
    pub stats: CertifyStats,
}

impl CertifyOutput {
    /// Treat any per-record failure as a batch error.
    pub fn into_result(self) -> Result<Self, PaysheetError> {
        if self.stats.failed == 0 {
            return Ok(self);
        }
        Err(PaysheetError::PartialFailure {
            success: self.stats.rendered,
            failed: self.stats.failed,
            total: self.stats.rendered + self.stats.failed,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &RecordError> {
        self.certificates.iter().filter_map(|c| c.error.as_ref())
    }
}

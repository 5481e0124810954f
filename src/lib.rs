//! # paysheet
//!
//! Payroll paperwork from spreadsheets: consolidate pay-bill exports into
//! clean employee records, and print "Last Pay Certificate" PDFs from a
//! table of employee details.
//!
//! ## Pipelines
//!
//! ```text
//! pay bill (.xlsx/.xls/.ods/.csv)
//!  ├─ 1. Load         skip title row, header → named columns
//!  ├─ 2. Drop         columns empty in every row
//!  ├─ 3. Consolidate  primary row + detail rows → one record
//!  ├─ 4. Pay scale    "PAY SCALE 56100-177500" → (56100, 177500)
//!  └─ 5. Export       <stem>_cleaned.csv + <stem>_cleaned.xlsx
//!
//! staff table (.xlsx/.csv)
//!  ├─ 1. Load         header → named columns
//!  ├─ 2. Template     fields + fixed clauses and tables
//!  ├─ 3. Layout       A4 pages, header/footer banners
//!  └─ 4. PDF          one <Name>_last_pay_certificate.pdf per row
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paysheet::{certify_to_dir, clean_to_files, CertifyConfig, CleanConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (cleaned, paths) = clean_to_files("pay_bill.xlsx", &CleanConfig::default())?;
//!     eprintln!("{} records → {}", cleaned.records.len(), paths.csv.display());
//!
//!     let out = certify_to_dir("staff.xlsx", "certificates", &CertifyConfig::default())?;
//!     eprintln!("{}/{} certificates", out.stats.rendered, out.stats.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paysheet` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod certify;
pub mod clean;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use certify::{certificate_file_name, certify, certify_table, certify_to_dir, render_certificate};
pub use clean::{clean, clean_table, clean_to_files};
pub use config::{CertifyConfig, CertifyConfigBuilder, CleanConfig, CleanConfigBuilder};
pub use error::{PaysheetError, RecordError};
pub use output::{CertificateResult, CertifyOutput, CertifyStats, CleanOutput, CleanStats, ExportPaths};
pub use pipeline::consolidate::{consolidate, EmployeeRecord};
pub use pipeline::pay_scale::parse_pay_scale;
pub use pipeline::template::CertificateRecord;
pub use progress::{CertificateProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{certificates, Certificates};

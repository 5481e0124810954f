//! End-to-end integration tests for paysheet.
//!
//! Each test builds a real workbook with rust_xlsxwriter inside a temporary
//! directory and drives the public API from file to file.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use calamine::{open_workbook_auto, Data, DataType, Reader};
use paysheet::{
    certificates, certify, certify_to_dir, clean, clean_to_files, CertificateProgressCallback,
    CertifyConfig, CleanConfig, PaysheetError, RecordError,
};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

const SERIAL: &str = "Sr. No.";
const DETAILS: &str = "Section of establishment & Name of incumbent";

enum Cell<'a> {
    S(&'a str),
    N(f64),
    Blank,
}

use Cell::{Blank, N, S};

fn write_sheet(path: &Path, sheet: &str, rows: &[Vec<Cell<'_>>]) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell {
                S(s) => {
                    ws.write_string(r as u32, c as u16, *s).unwrap();
                }
                N(n) => {
                    ws.write_number(r as u32, c as u16, *n).unwrap();
                }
                Blank => {}
            }
        }
    }
    wb.save(path).unwrap();
}

/// A pay bill shaped like the real export: title row, header, column
/// numbering row, then one primary row and several detail rows per employee.
fn pay_bill(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("pay_bill.xlsx");
    write_sheet(
        &path,
        "March",
        &[
            vec![S("GOVERNMENT POLYTECHNIC - PAY BILL FOR MARCH")],
            vec![S(SERIAL), S(DETAILS), S("Remarks"), S("Basic Pay")],
            vec![N(1.0), N(2.0), Blank, N(3.0)],
            vec![N(2.0), S("SHRI P. R. DAVE"), Blank, N(56100.0)],
            vec![Blank, S("LECTURER IN MECHANICAL ENGG."), Blank, Blank],
            vec![Blank, S("PAY SCALE : LEVEL-10 (56100-177500)"), Blank, Blank],
            vec![Blank, S("BANK OF BARODA A/C 0123"), Blank, Blank],
            vec![N(3.0), S("SMT. SUNITA SHAH"), Blank, N(144200.0)],
            vec![Blank, S("Principal"), Blank, Blank],
            vec![Blank, S("pay scale 144200 - 218200"), Blank, Blank],
            vec![N(4.0), S("MR A. K. MEHTA"), Blank, Blank],
            vec![Blank, S("HEAD CLERK"), Blank, Blank],
        ],
    );
    path
}

fn staff_table(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("staff.xlsx");
    write_sheet(
        &path,
        "Staff",
        &[
            vec![
                S("Name"),
                S("Office"),
                S("From_Date"),
                S("To_Date"),
                S("Paid_Upto"),
                S("GPF_Account"),
                S("Joining_Time"),
                S("Department"),
            ],
            vec![
                S("Ramesh Kumar"),
                S("Government Polytechnic, Ahmedabad"),
                S("01-04-2024"),
                S("31-05-2024"),
                S("31-05-2024"),
                S("GPF/EDU/4411"),
                N(6.0),
                S("Civil"),
            ],
            vec![Blank, Blank, Blank, Blank, Blank, Blank, Blank, Blank],
            vec![
                S("Anita Desai"),
                S("Registry"),
                Blank,
                Blank,
                Blank,
                Blank,
                Blank,
                Blank,
            ],
            vec![S("राम"), S("Accounts"), Blank, Blank, Blank, Blank, Blank, S("Finance")],
        ],
    );
    path
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ── clean ────────────────────────────────────────────────────────────────────

#[test]
fn test_clean_pay_bill_workbook() {
    let dir = TempDir::new().unwrap();
    let input = pay_bill(&dir);

    let output = clean(&input, &CleanConfig::default()).unwrap();
    let r = &output.records;
    assert_eq!(r.len(), 3);

    assert_eq!(r[0].serial_number, Some(2));
    assert_eq!(r[0].employee_name.as_deref(), Some("P. R. DAVE"));
    assert_eq!(r[0].designation.as_deref(), Some("LECTURER IN MECHANICAL ENGG."));
    assert_eq!((r[0].min_pay_scale, r[0].max_pay_scale), (Some(56100), Some(177500)));

    // "SMT." with a dot keeps its title
    assert_eq!(r[1].employee_name.as_deref(), Some("SMT. SUNITA SHAH"));
    assert_eq!(r[1].designation.as_deref(), Some("Principal"));
    assert_eq!((r[1].min_pay_scale, r[1].max_pay_scale), (Some(144200), Some(218200)));

    assert_eq!(r[2].employee_name.as_deref(), Some("A. K. MEHTA"));
    assert_eq!(r[2].designation, None);
    assert_eq!(r[2].min_pay_scale, None);

    assert_eq!(output.stats.rows_read, 10);
    assert_eq!(output.stats.columns_dropped, vec!["Remarks"]);
    assert_eq!(output.stats.with_pay_scale, 2);
}

#[test]
fn test_clean_to_files_writes_both_exports() {
    let dir = TempDir::new().unwrap();
    let input = pay_bill(&dir);

    let (output, paths) = clean_to_files(&input, &CleanConfig::default()).unwrap();
    assert_eq!(paths.csv, dir.path().join("pay_bill_cleaned.csv"));
    assert_eq!(paths.xlsx, dir.path().join("pay_bill_cleaned.xlsx"));

    let csv = std::fs::read_to_string(&paths.csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), output.records.len() + 1);
    assert_eq!(lines[0], "Sr_No,Employee_Name,Designation,Min_Pay_Scale,Max_Pay_Scale");
    assert_eq!(lines[3], "4,A. K. MEHTA,,,");

    let mut wb = open_workbook_auto(&paths.xlsx).unwrap();
    let range = wb.worksheet_range_at(0).unwrap().unwrap();
    let rows: Vec<_> = range.rows().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1][1], Data::String("P. R. DAVE".into()));
    assert_eq!(rows[2][4].as_f64(), Some(218200.0));
}

#[test]
fn test_clean_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let input = pay_bill(&dir);
    let a = clean(&input, &CleanConfig::default()).unwrap();
    let b = clean(&input, &CleanConfig::default()).unwrap();
    assert_eq!(a.records, b.records);
}

#[test]
fn test_clean_named_sheet_and_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let input = pay_bill(&dir);

    let ok = CleanConfig::builder().sheet("March").build().unwrap();
    assert_eq!(clean(&input, &ok).unwrap().records.len(), 3);

    let missing = CleanConfig::builder().sheet("April").build().unwrap();
    match clean(&input, &missing).unwrap_err() {
        PaysheetError::SheetNotFound { sheet, available, .. } => {
            assert_eq!(sheet, "April");
            assert_eq!(available, vec!["March"]);
        }
        other => panic!("expected SheetNotFound, got {other:?}"),
    }
}

#[test]
fn test_clean_wrong_skip_rows_reports_missing_column() {
    let dir = TempDir::new().unwrap();
    let input = pay_bill(&dir);
    let config = CleanConfig::builder().skip_rows(0).build().unwrap();
    let err = clean(&input, &config).unwrap_err();
    assert!(matches!(err, PaysheetError::MissingColumn { .. }), "got {err:?}");
}

#[test]
fn test_clean_rejects_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bill.txt");
    std::fs::write(&input, "not a sheet").unwrap();
    let err = clean(&input, &CleanConfig::default()).unwrap_err();
    assert!(matches!(err, PaysheetError::UnsupportedFormat { .. }));
}

#[test]
fn test_clean_failure_leaves_no_exports() {
    let dir = TempDir::new().unwrap();
    let input = pay_bill(&dir);
    let config = CleanConfig::builder().details_column("Name").build().unwrap();
    assert!(clean_to_files(&input, &config).is_err());
    assert!(!dir.path().join("pay_bill_cleaned.csv").exists());
    assert!(!dir.path().join("pay_bill_cleaned.xlsx").exists());
}

// ── certify ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Events {
    started: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl CertificateProgressCallback for Events {
    fn on_record_start(&self, _: usize, _: usize, _: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_record_complete(&self, _: usize, _: usize, _: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_record_error(&self, _: usize, _: usize, _: &str) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_certify_to_dir_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = staff_table(&dir);
    let out_dir = dir.path().join("certificates");

    let events = Arc::new(Events::default());
    let config = CertifyConfig::builder()
        .progress_callback(events.clone())
        .build()
        .unwrap();

    let output = certify_to_dir(&input, &out_dir, &config).unwrap();
    assert_eq!(output.stats.total_rows, 4);
    assert_eq!(output.stats.skipped_blank, 1);
    assert_eq!(output.stats.rendered, 2);
    assert_eq!(output.stats.failed, 1);

    let ramesh = out_dir.join("Ramesh_Kumar_last_pay_certificate.pdf");
    let anita = out_dir.join("Anita_Desai_last_pay_certificate.pdf");
    assert!(ramesh.exists());
    assert!(anita.exists());
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 2);

    let bytes = std::fs::read(&ramesh).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(contains(&bytes, b"Last Pay Certificate of Shri/Smt. Ramesh Kumar"));
    assert!(contains(&bytes, b"joining time for 6 days."));

    let anita_bytes = std::fs::read(&anita).unwrap();
    assert!(contains(&anita_bytes, b"on N/A to N/A proceeding"));

    let failed = output.errors().next().unwrap();
    assert!(matches!(failed, RecordError::Encoding { record: 3, .. }));

    assert_eq!(events.started.load(Ordering::SeqCst), 3);
    assert_eq!(events.completed.load(Ordering::SeqCst), 2);
    assert_eq!(events.failed.load(Ordering::SeqCst), 1);

    assert!(matches!(
        output.into_result(),
        Err(PaysheetError::PartialFailure { failed: 1, .. })
    ));
}

#[test]
fn test_certify_renders_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let input = staff_table(&dir);
    let config = CertifyConfig::default();

    let a = certify(&input, &config).unwrap();
    let b = certify(&input, &config).unwrap();
    for (x, y) in a.certificates.iter().zip(&b.certificates) {
        assert_eq!(x.pdf, y.pdf);
    }
}

#[test]
fn test_certificates_iterator_matches_batch() {
    let dir = TempDir::new().unwrap();
    let input = staff_table(&dir);
    let config = CertifyConfig::default();

    let table = paysheet::pipeline::table::read_table(&input, None, 0).unwrap();
    let lazy: Vec<_> = certificates(&table, &config).collect();
    let batch = certify(&input, &config).unwrap();

    assert_eq!(lazy.len(), batch.certificates.len());
    for (l, b) in lazy.iter().zip(&batch.certificates) {
        assert_eq!(l.file_name, b.file_name);
        assert_eq!(l.pdf, b.pdf);
    }
}

#[test]
fn test_certify_custom_placeholder() {
    let dir = TempDir::new().unwrap();
    let input = staff_table(&dir);
    let config = CertifyConfig::builder().placeholder("________").build().unwrap();

    let output = certify(&input, &config).unwrap();
    let anita = output
        .certificates
        .iter()
        .find(|c| c.name == "Anita Desai")
        .unwrap();
    assert_eq!(anita.department, "________");
    let pdf = anita.pdf.as_ref().unwrap();
    assert!(contains(pdf, b"on ________ to ________ proceeding"));
    assert!(!contains(pdf, b"N/A"));
}

#[test]
fn test_certify_nonexistent_input() {
    let err = certify("/nonexistent/staff.xlsx", &CertifyConfig::default()).unwrap_err();
    assert!(matches!(err, PaysheetError::FileNotFound { .. }));
}

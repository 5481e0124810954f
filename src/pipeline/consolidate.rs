//! Multi-row record consolidation for pay-bill exports.
//!
//! A pay bill lists each employee as one primary row (serial number + name)
//! followed by a variable number of indented detail rows (designation, pay
//! scale, bank details, …) that carry no serial number. There is no fixed
//! row count per employee, so the rows are scanned once, in order, folding
//! over a `(current record, finished records)` pair:
//!
//! ```text
//!  row has serial ≠ 1 ──▶ close current (if any), open new record
//!  otherwise, open    ──▶ classify detail text into current record
//!  otherwise          ──▶ discard (preamble before the first employee)
//! ```
//!
//! Detail classification is a keyword heuristic, not a parser: lines that
//! match no rule are dropped.

use crate::pipeline::pay_scale::parse_pay_scale;
use crate::pipeline::table::{CellValue, RawRow};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Serial value left behind by the sheet's column-numbering row
/// (`1 | 2 | 3 …` under the real header). It never starts a record.
pub const HEADER_SENTINEL: f64 = 1.0;

/// One consolidated employee.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub serial_number: Option<i64>,
    /// Name with the leading courtesy title removed.
    pub employee_name: Option<String>,
    pub designation: Option<String>,
    /// Raw pay-scale line; cleared once min/max are extracted.
    #[serde(skip)]
    pub pay_scale_raw: Option<String>,
    pub min_pay_scale: Option<i64>,
    pub max_pay_scale: Option<i64>,
}

impl EmployeeRecord {
    fn open(serial_number: i64, details: Option<String>) -> Self {
        let employee_name = details
            .map(|d| strip_title(d.trim()))
            .filter(|n| !n.is_empty());
        Self {
            serial_number: Some(serial_number),
            employee_name,
            ..Default::default()
        }
    }

    /// Parse and drop the transient pay-scale text.
    fn finish(mut self) -> Self {
        let raw = self.pay_scale_raw.take();
        let (min, max) = parse_pay_scale(raw.as_deref());
        self.min_pay_scale = min;
        self.max_pay_scale = max;
        self
    }
}

// ── Detail classification ────────────────────────────────────────────────

/// Record field a continuation line can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Designation,
    PayScale,
}

struct Rule {
    keywords: &'static [&'static str],
    field: DetailField,
}

/// Evaluated top to bottom; the first rule with a matching keyword wins.
static DETAIL_RULES: &[Rule] = &[
    Rule {
        keywords: &["PRINCIPAL", "PROFESSOR", "LECTURER", "HOD", "ACCOUNTANT"],
        field: DetailField::Designation,
    },
    Rule {
        keywords: &["PAY SCALE"],
        field: DetailField::PayScale,
    },
];

/// Which field, if any, a continuation line belongs to (case-insensitive).
pub fn classify_detail(text: &str) -> Option<DetailField> {
    let upper = text.to_uppercase();
    DETAIL_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| upper.contains(k)))
        .map(|rule| rule.field)
}

// ── Name cleanup ─────────────────────────────────────────────────────────

// Title must be followed by whitespace, so `SMT.` is left in place.
static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(SHRI|SMT|MS|MR)\s+").unwrap());

/// Remove one leading courtesy title (`SHRI`, `SMT`, `MS`, `MR`).
pub fn strip_title(name: &str) -> String {
    RE_TITLE.replace(name, "").trim().to_string()
}

// ── Scan ─────────────────────────────────────────────────────────────────

/// Serial number carried by a record-opening row, if `cell` is one.
pub fn record_marker(cell: &CellValue) -> Option<i64> {
    cell.as_number()
        .filter(|n| *n != HEADER_SENTINEL)
        .map(|n| n.trunc() as i64)
}

type ScanState = (Option<EmployeeRecord>, Vec<EmployeeRecord>);

/// Consolidate rows into one [`EmployeeRecord`] per primary row.
///
/// `serial_column` holds the record marker; `details_column` holds the name
/// on primary rows and the free-text detail on continuation rows.
pub fn consolidate<'a, I>(rows: I, serial_column: &str, details_column: &str) -> Vec<EmployeeRecord>
where
    I: IntoIterator<Item = RawRow<'a>>,
{
    let (current, mut records) = rows
        .into_iter()
        .fold((None, Vec::new()), |state, row| {
            scan_row(state, &row, serial_column, details_column)
        });
    records.extend(current);
    records.into_iter().map(EmployeeRecord::finish).collect()
}

fn scan_row(
    (current, mut records): ScanState,
    row: &RawRow<'_>,
    serial_column: &str,
    details_column: &str,
) -> ScanState {
    if let Some(serial) = record_marker(row.get(serial_column)) {
        records.extend(current);
        let record = EmployeeRecord::open(serial, row.text(details_column));
        debug!("Record {} opened: {:?}", serial, record.employee_name);
        return (Some(record), records);
    }

    let Some(mut record) = current else {
        return (None, records);
    };

    let details = row
        .text(details_column)
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    match classify_detail(&details) {
        Some(DetailField::Designation) => record.designation = Some(details),
        Some(DetailField::PayScale) => record.pay_scale_raw = Some(details),
        None => {}
    }

    (Some(record), records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::table::RawTable;

    const SERIAL: &str = "Sr. No.";
    const DETAILS: &str = "Section of establishment & Name of incumbent";

    fn table(rows: Vec<(CellValue, &str)>) -> RawTable {
        RawTable::new(
            vec![SERIAL.to_string(), DETAILS.to_string()],
            rows.into_iter()
                .map(|(serial, details)| {
                    let details = if details.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(details.to_string())
                    };
                    vec![serial, details]
                })
                .collect(),
        )
    }

    fn run(t: &RawTable) -> Vec<EmployeeRecord> {
        consolidate(t.rows(), SERIAL, DETAILS)
    }

    fn n(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    const E: CellValue = CellValue::Empty;

    #[test]
    fn groups_primary_and_detail_rows() {
        let t = table(vec![
            (n(2.0), "SHRI P. R. DAVE"),
            (E, "LECTURER IN MECHANICAL ENGG."),
            (E, "PAY SCALE: 56100-177500"),
            (E, "A/C NO. 1234"),
            (n(3.0), "SMT R. K. SHAH"),
            (E, "HOD (CIVIL)"),
        ]);
        let records = run(&t);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].serial_number, Some(2));
        assert_eq!(records[0].employee_name.as_deref(), Some("P. R. DAVE"));
        assert_eq!(
            records[0].designation.as_deref(),
            Some("LECTURER IN MECHANICAL ENGG.")
        );
        assert_eq!(records[0].min_pay_scale, Some(56100));
        assert_eq!(records[0].max_pay_scale, Some(177500));
        assert_eq!(records[0].pay_scale_raw, None);

        assert_eq!(records[1].employee_name.as_deref(), Some("R. K. SHAH"));
        assert_eq!(records[1].designation.as_deref(), Some("HOD (CIVIL)"));
        assert_eq!(records[1].min_pay_scale, None);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(run(&table(vec![])).is_empty());
    }

    #[test]
    fn no_markers_yields_nothing() {
        let t = table(vec![
            (E, "PRINCIPAL"),
            (CellValue::Text("2".into()), "SHRI A"),
            (n(1.0), "SHRI B"),
        ]);
        assert!(run(&t).is_empty());
    }

    #[test]
    fn header_sentinel_never_opens_a_record() {
        let t = table(vec![
            (n(1.0), "2"),
            (CellValue::Text("1".into()), "x"),
            (n(4.0), "MR X"),
            (n(1.0), "LECTURER"),
        ]);
        let records = run(&t);
        assert_eq!(records.len(), 1);
        // The sentinel row acts as a continuation line of the open record.
        assert_eq!(records[0].designation.as_deref(), Some("LECTURER"));
    }

    #[test]
    fn record_count_matches_marker_count() {
        let serials = [n(5.0), E, n(1.0), n(6.7), E, n(-2.0), CellValue::Text("9".into()), n(8.0)];
        let t = table(serials.iter().cloned().map(|s| (s, "SHRI Z")).collect());
        let markers = serials.iter().filter(|c| record_marker(c).is_some()).count();
        assert_eq!(markers, 4);
        assert_eq!(run(&t).len(), markers);
        assert_eq!(run(&t)[1].serial_number, Some(6));
    }

    #[test]
    fn last_designation_wins() {
        let t = table(vec![(n(2.0), "MS A"), (E, "LECTURER"), (E, "HOD")]);
        assert_eq!(run(&t)[0].designation.as_deref(), Some("HOD"));
    }

    #[test]
    fn designation_rule_precedes_pay_scale_rule() {
        let t = table(vec![(n(2.0), "MS A"), (E, "PROFESSOR PAY SCALE 1-2")]);
        let r = &run(&t)[0];
        assert_eq!(r.designation.as_deref(), Some("PROFESSOR PAY SCALE 1-2"));
        assert_eq!(r.min_pay_scale, None);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_detail("Lecturer"), Some(DetailField::Designation));
        assert_eq!(classify_detail("pay scale 1-2"), Some(DetailField::PayScale));
        assert_eq!(classify_detail("BANK OF BARODA"), None);
        assert_eq!(classify_detail(""), None);
    }

    #[test]
    fn record_without_details_is_legal() {
        let t = table(vec![(n(2.0), "SHRI A"), (n(3.0), "")]);
        let records = run(&t);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].designation, None);
        assert_eq!(records[1].employee_name, None);
    }

    #[test]
    fn title_stripping_rules() {
        assert_eq!(strip_title("SHRI RAMESH KUMAR"), "RAMESH KUMAR");
        assert_eq!(strip_title("SMT SUNITA"), "SUNITA");
        assert_eq!(strip_title("SMT. SUNITA"), "SMT. SUNITA");
        assert_eq!(strip_title("MRS ANITA"), "MRS ANITA");
        assert_eq!(strip_title("MR   JOHN"), "JOHN");
        assert_eq!(strip_title("shri lower"), "shri lower");
    }

    #[test]
    fn consolidation_is_idempotent() {
        let t = table(vec![
            (E, "PREAMBLE"),
            (n(2.0), "SHRI A"),
            (E, "PAY SCALE 10-20"),
            (n(3.0), "SHRI B"),
        ]);
        assert_eq!(run(&t), run(&t));
    }
}

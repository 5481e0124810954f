//! The "Last Pay Certificate" document template.
//!
//! [`compose`] lays one [`CertificateRecord`] out on A4 pages; the fixed
//! tables are driven by static `(label, alignment)` lists so the layout code
//! only knows how to draw a header row and a blank row.
//!
//! ```text
//!  ┌──────── LAST PAY CERTIFICATE (Obverse) ────────┐  header, every page
//!  │ preamble · clause 2                            │
//!  │ Particulars | Rate | Rs.        × 17 blank rows│
//!  │ clauses 3–8                                    │
//!  │ Insurance Company | Policy | Premium | Due × 3 │
//!  │ clause 9 · signature block                     │
//!  └──── This is a system-generated certificate ────┘  footer, every page
//! ```

use crate::pipeline::layout::{Advance, Align, Banner, Canvas, Font, Page, PageGeometry};
use crate::pipeline::pdf::{encode_document, RenderError};
use crate::pipeline::table::RawRow;
use serde::{Deserialize, Serialize};

pub const TITLE: &str = "LAST PAY CERTIFICATE (Obverse)";
pub const FOOTER: &str = "This is a system-generated certificate.";

/// Height of one body line and one table row, in mm.
const LINE: f32 = 8.0;

/// Width of the signature block's left column, in mm.
const SIGNATURE_INDENT: f32 = 80.0;

const BODY: Font = Font::regular(12.0);
const BODY_BOLD: Font = Font::bold(12.0);

/// Salary table columns; a zero width runs to the right margin.
pub static SALARY_COLUMNS: [(&str, f32); 3] = [("Particulars", 90.0), ("Rate", 40.0), ("Rs.", 0.0)];

/// Salary table rows. Sub-items of the insurance scheme are right-aligned.
pub static PARTICULARS: [(&str, Align); 17] = [
    ("Substantive Pay", Align::Left),
    ("Officiating Pay", Align::Left),
    ("Special Pay", Align::Left),
    ("Personal Pay", Align::Left),
    ("Leave Salary", Align::Left),
    ("Allowance", Align::Left),
    ("D. A", Align::Left),
    ("A. D. A", Align::Left),
    ("Compensatory", Align::Left),
    ("Local Allowance", Align::Left),
    ("House Rent Allowance", Align::Left),
    ("Rate of Deductions", Align::Left),
    ("General Provident Fund", Align::Left),
    ("Income Tax", Align::Left),
    ("State Government Employees Insurance Scheme", Align::Left),
    ("(a) Composite rate", Align::Right),
    ("(b) Insurance rate only", Align::Right),
];

pub static INSURANCE_COLUMNS: [(&str, f32); 4] = [
    ("Name of Insurance Company", 80.0),
    ("No. of Policy", 40.0),
    ("Amount of Premium", 40.0),
    ("Due Date", 0.0),
];

pub const INSURANCE_ROWS: usize = 3;

/// Column names a certificate row is read from, in field order.
pub const CERTIFICATE_COLUMNS: [&str; 11] = [
    "Name",
    "Office",
    "From_Date",
    "To_Date",
    "Paid_Upto",
    "GPF_Account",
    "Office_Charge",
    "Charge_Date",
    "Charge_Month",
    "Joining_Time",
    "Department",
];

/// One employee's certificate fields. Every field is optional; absent ones
/// print as the configured placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CertificateRecord {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Office")]
    pub office: Option<String>,
    #[serde(rename = "From_Date")]
    pub from_date: Option<String>,
    #[serde(rename = "To_Date")]
    pub to_date: Option<String>,
    #[serde(rename = "Paid_Upto")]
    pub paid_upto: Option<String>,
    #[serde(rename = "GPF_Account")]
    pub gpf_account: Option<String>,
    #[serde(rename = "Office_Charge")]
    pub office_charge: Option<String>,
    #[serde(rename = "Charge_Date")]
    pub charge_date: Option<String>,
    #[serde(rename = "Charge_Month")]
    pub charge_month: Option<String>,
    #[serde(rename = "Joining_Time")]
    pub joining_time: Option<String>,
    #[serde(rename = "Department")]
    pub department: Option<String>,
}

impl CertificateRecord {
    /// Read a record from a table row by column name. Missing columns and
    /// empty cells are absent.
    pub fn from_row(row: &RawRow<'_>) -> Self {
        let [name, office, from_date, to_date, paid_upto, gpf_account, office_charge, charge_date, charge_month, joining_time, department] =
            CERTIFICATE_COLUMNS.map(|column| row.text(column));
        Self {
            name,
            office,
            from_date,
            to_date,
            paid_upto,
            gpf_account,
            office_charge,
            charge_date,
            charge_month,
            joining_time,
            department,
        }
    }
}

// ── Tables ───────────────────────────────────────────────────────────────

fn table_header(canvas: &mut Canvas, columns: &[(&str, f32)]) {
    canvas.set_font(BODY_BOLD);
    let last = columns.len() - 1;
    for (i, (title, width)) in columns.iter().enumerate() {
        let advance = if i == last { Advance::NextLine } else { Advance::Right };
        canvas.cell(*width, LINE, title, true, Align::Center, advance);
    }
    canvas.set_font(BODY);
}

/// One bordered row: `label` in the first column, the rest left empty.
fn blank_row(canvas: &mut Canvas, columns: &[(&str, f32)], label: &str, align: Align) {
    let last = columns.len() - 1;
    for (i, (_, width)) in columns.iter().enumerate() {
        let (text, advance) = match i {
            0 if i == last => (label, Advance::NextLine),
            0 => (label, Advance::Right),
            _ if i == last => ("", Advance::NextLine),
            _ => ("", Advance::Right),
        };
        canvas.cell(*width, LINE, text, true, align, advance);
    }
}

fn paragraph(canvas: &mut Canvas, text: &str, gap: f32) {
    canvas.multi_cell(0.0, LINE, text);
    canvas.ln(gap);
}

// ── Composition ──────────────────────────────────────────────────────────

/// Lay the certificate out into pages.
pub fn compose(record: &CertificateRecord, placeholder: &str) -> Vec<Page> {
    let f = |value: &Option<String>| value.as_deref().unwrap_or(placeholder).to_string();

    let mut canvas = Canvas::new(PageGeometry::A4)
        .with_header(Banner::new(TITLE, Font::bold(14.0), 10.0, 5.0))
        .with_footer(Banner::new(FOOTER, Font::italic(10.0), 10.0, 15.0));
    canvas.set_font(BODY);
    canvas.add_page();

    paragraph(
        &mut canvas,
        &format!(
            "Last Pay Certificate of Shri/Smt. {}\nthe office of {} of\non {} to {} proceeding",
            f(&record.name),
            f(&record.office),
            f(&record.from_date),
            f(&record.to_date),
        ),
        3.0,
    );
    paragraph(
        &mut canvas,
        &format!(
            "2. He/She has been paid upto {} at the following rates :",
            f(&record.paid_upto)
        ),
        2.0,
    );

    table_header(&mut canvas, &SALARY_COLUMNS);
    for (label, align) in &PARTICULARS {
        blank_row(&mut canvas, &SALARY_COLUMNS, label, *align);
    }
    canvas.ln(3.0);

    paragraph(
        &mut canvas,
        &format!(
            "3. His/Her General Provident Fund Account No. {} is maintained by the Accountant General/D.A.T.",
            f(&record.gpf_account)
        ),
        2.0,
    );
    paragraph(
        &mut canvas,
        &format!(
            "4. He/She made over charge of the office of {} on the {} noon of {}.",
            f(&record.office_charge),
            f(&record.charge_date),
            f(&record.charge_month),
        ),
        2.0,
    );
    paragraph(
        &mut canvas,
        "5. Recoveries are to be made from the emoluments etc. of the Government Servant as detailed on the reverse.",
        2.0,
    );
    paragraph(&mut canvas, "6. He/She entitled to draw the following :", 2.0);
    paragraph(
        &mut canvas,
        &format!(
            "7. He/She is also entitled to joining time for {} days.",
            f(&record.joining_time)
        ),
        2.0,
    );
    paragraph(
        &mut canvas,
        "8. He/She finances the Insurance policies below from the Provident Fund.",
        2.0,
    );

    table_header(&mut canvas, &INSURANCE_COLUMNS);
    for _ in 0..INSURANCE_ROWS {
        blank_row(&mut canvas, &INSURANCE_COLUMNS, "", Align::Left);
    }
    canvas.ln(3.0);

    paragraph(
        &mut canvas,
        "9. The details of the Income Tax recovered from him/her up to date from the beginning of the current financial year are noted on the reverse.",
        6.0,
    );

    canvas.cell(SIGNATURE_INDENT, LINE, "Date ..........................................", false, Align::Left, Advance::Right);
    canvas.cell(0.0, LINE, "Signature ..........................................", false, Align::Left, Advance::NextLine);
    canvas.cell(SIGNATURE_INDENT, LINE, "", false, Align::Left, Advance::Right);
    canvas.cell(0.0, LINE, "Designation ........................................", false, Align::Left, Advance::NextLine);

    canvas.finish()
}

/// Compose and encode one certificate.
pub fn render(record: &CertificateRecord, placeholder: &str) -> Result<Vec<u8>, RenderError> {
    let pages = compose(record, placeholder);
    encode_document(&pages, &PageGeometry::A4, TITLE)
}

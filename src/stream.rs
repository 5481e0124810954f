//! Lazy certificate rendering: one row at a time.
//!
//! Unlike [`crate::certify()`], which renders the whole table before
//! returning, [`certificates`] hands back an iterator that renders a row only
//! when asked. Callers that write each PDF as it arrives keep at most one
//! document in memory, however long the table.
//!
//! The iterator fires no progress callbacks; blank rows are skipped and
//! counted in [`Certificates::skipped`].

use crate::config::CertifyConfig;
use crate::output::CertificateResult;
use crate::pipeline::table::{RawRow, RawTable};
use crate::pipeline::template::CertificateRecord;
use tracing::debug;

/// Iterator of rendered certificates in table order.
pub struct Certificates<'a> {
    rows: Box<dyn Iterator<Item = (usize, RawRow<'a>)> + 'a>,
    placeholder: &'a str,
    skipped: usize,
}

impl Certificates<'_> {
    /// Blank rows passed over so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Certificates<'_> {
    type Item = CertificateResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, row) = self.rows.next()?;
            if row.is_blank() {
                debug!("Row {} is blank, skipping", index);
                self.skipped += 1;
                continue;
            }
            let record = CertificateRecord::from_row(&row);
            return Some(crate::certify::render_row(index, &record, self.placeholder));
        }
    }
}

/// Render certificates for `table` lazily.
///
/// # Example
/// ```rust
/// use paysheet::pipeline::table::{CellValue, RawTable};
/// use paysheet::{certificates, CertifyConfig};
///
/// let table = RawTable::new(
///     vec!["Name".into()],
///     vec![vec![CellValue::Text("Asha Patel".into())]],
/// );
/// let config = CertifyConfig::default();
/// for cert in certificates(&table, &config) {
///     assert!(cert.is_ok());
///     assert_eq!(cert.file_name, "Asha_Patel_last_pay_certificate.pdf");
/// }
/// ```
pub fn certificates<'a>(table: &'a RawTable, config: &'a CertifyConfig) -> Certificates<'a> {
    Certificates {
        rows: Box::new(table.rows().enumerate()),
        placeholder: &config.placeholder,
        skipped: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::table::CellValue;

    #[test]
    fn yields_non_blank_rows_lazily() {
        let table = RawTable::new(
            vec!["Name".into(), "Office".into()],
            vec![
                vec![CellValue::Empty, CellValue::Empty],
                vec![CellValue::Text("A".into()), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Text("Accounts".into())],
            ],
        );
        let config = CertifyConfig::default();
        let mut iter = certificates(&table, &config);

        let first = iter.next().unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(iter.skipped(), 1);

        let second = iter.next().unwrap();
        assert_eq!(second.name, "Employee_2");
        assert!(iter.next().is_none());
    }

    #[test]
    fn empty_table_yields_nothing() {
        let table = RawTable::new(vec!["Name".into()], vec![]);
        let config = CertifyConfig::default();
        assert_eq!(certificates(&table, &config).count(), 0);
    }
}

//! Pay-bill cleanup entry points.
//!
//! [`clean`] loads a pay-bill export and consolidates it in memory;
//! [`clean_to_files`] additionally writes the CSV and XLSX exports.
//! [`clean_table`] is the pure core, usable on a table the caller already has.

use crate::config::CleanConfig;
use crate::error::PaysheetError;
use crate::output::{CleanOutput, CleanStats, ExportPaths};
use crate::pipeline::consolidate::consolidate;
use crate::pipeline::export::{write_csv, write_xlsx};
use crate::pipeline::table::{read_table, RawTable};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Consolidate an already-loaded pay-bill table.
///
/// Columns that are empty in every data row are dropped first; the serial
/// and details columns must survive that step.
///
/// # Errors
/// [`PaysheetError::MissingColumn`] when either configured column is absent.
pub fn clean_table(table: RawTable, config: &CleanConfig) -> Result<CleanOutput, PaysheetError> {
    let start = Instant::now();
    let rows_read = table.len();

    let (table, dropped) = table.drop_empty_columns();
    if !dropped.is_empty() {
        warn!("Dropped {} empty column(s): {:?}", dropped.len(), dropped);
    }

    for column in [&config.serial_column, &config.details_column] {
        if !table.has_column(column) {
            return Err(PaysheetError::MissingColumn {
                column: column.clone(),
                available: table.headers().to_vec(),
            });
        }
    }

    let records = consolidate(table.rows(), &config.serial_column, &config.details_column);

    let mut stats = CleanStats::tally(rows_read, dropped, &records);
    stats.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Consolidated {} rows into {} records ({} with designation, {} with pay scale)",
        stats.rows_read, stats.records, stats.with_designation, stats.with_pay_scale
    );

    Ok(CleanOutput { records, stats })
}

/// Load and consolidate a pay-bill export.
///
/// # Arguments
/// * `input`  — path to a `.xlsx`/`.xls`/`.xlsb`/`.ods` workbook or `.csv`
/// * `config` — sheet, skipped rows and column names
///
/// # Errors
/// Any loading error ([`PaysheetError::FileNotFound`],
/// [`PaysheetError::UnreadableTable`], …) or a missing required column.
pub fn clean(input: impl AsRef<Path>, config: &CleanConfig) -> Result<CleanOutput, PaysheetError> {
    let input = input.as_ref();
    info!("Cleaning pay bill: {}", input.display());

    let start = Instant::now();
    let table = read_table(input, config.sheet.as_deref(), config.skip_rows)?;
    let mut output = clean_table(table, config)?;
    output.stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Clean a pay bill and write both exports.
///
/// Destinations come from [`CleanConfig::output_paths`]. Each file is
/// written to a temporary sibling and renamed, so a failure leaves any
/// previous export untouched.
pub fn clean_to_files(
    input: impl AsRef<Path>,
    config: &CleanConfig,
) -> Result<(CleanOutput, ExportPaths), PaysheetError> {
    let input = input.as_ref();
    let output = clean(input, config)?;
    let (csv, xlsx) = config.output_paths(input);

    write_csv(&output.records, &csv)?;
    write_xlsx(&output.records, &xlsx)?;

    info!(
        "Wrote {} records to {} and {}",
        output.records.len(),
        csv.display(),
        xlsx.display()
    );
    Ok((output, ExportPaths { csv, xlsx }))
}

//! Certificate generation entry points.
//!
//! Every non-blank row of the loaded table becomes one "Last Pay
//! Certificate" PDF. Rows are independent: a row whose text cannot be
//! encoded, or whose file cannot be written, is recorded as a
//! [`RecordError`] and the batch moves on.
//!
//! [`certify`] keeps the PDFs in memory, [`certify_to_dir`] writes each one
//! as soon as it is rendered and drops the bytes. For lazy, one-at-a-time
//! rendering without callbacks see [`crate::stream::certificates`].

use crate::config::CertifyConfig;
use crate::error::{PaysheetError, RecordError};
use crate::output::{CertificateResult, CertifyOutput, CertifyStats};
use crate::pipeline::export::write_atomic;
use crate::pipeline::pdf::RenderError;
use crate::pipeline::table::{read_table, RawTable};
use crate::pipeline::template::{self, CertificateRecord};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

const FILE_SUFFIX: &str = "_last_pay_certificate";

/// File name for an employee's certificate: spaces (and path separators)
/// become underscores.
pub fn certificate_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{stem}{FILE_SUFFIX}.pdf")
}

impl RecordError {
    fn from_render(record: usize, err: RenderError) -> Self {
        match err {
            RenderError::Unencodable { ch, text } => RecordError::Encoding { record, ch, text },
            RenderError::Pdf(detail) => RecordError::PdfEncoding { record, detail },
        }
    }
}

/// Render one certificate.
///
/// Pure and deterministic: the same record and placeholder always produce
/// the same bytes. Errors carry record index 0; batch callers report the
/// row's own index.
pub fn render_certificate(record: &CertificateRecord, config: &CertifyConfig) -> Result<Vec<u8>, RecordError> {
    template::render(record, &config.placeholder).map_err(|e| RecordError::from_render(0, e))
}

/// Render the record at table row `index` into a [`CertificateResult`].
pub(crate) fn render_row(index: usize, record: &CertificateRecord, placeholder: &str) -> CertificateResult {
    let name = record
        .name
        .clone()
        .unwrap_or_else(|| format!("Employee_{index}"));
    let department = record
        .department
        .clone()
        .unwrap_or_else(|| placeholder.to_string());
    let file_name = certificate_file_name(&name);

    let (pdf, error) = match template::render(record, placeholder) {
        Ok(bytes) => (Some(bytes), None),
        Err(e) => (None, Some(RecordError::from_render(index, e))),
    };

    CertificateResult {
        index,
        name,
        department,
        file_name,
        size_bytes: pdf.as_ref().map_or(0, Vec::len),
        pdf,
        path: None,
        error,
    }
}

/// Run the batch over `table`, handing each rendered result to `finish`
/// before it is counted and reported.
fn run_batch<F>(table: &RawTable, config: &CertifyConfig, mut finish: F) -> CertifyOutput
where
    F: FnMut(&mut CertificateResult),
{
    let start = Instant::now();
    let total = table.rows().filter(|r| !r.is_blank()).count();
    let cb = config.progress_callback.as_ref();

    if let Some(cb) = cb {
        cb.on_batch_start(total);
    }

    let mut stats = CertifyStats {
        total_rows: table.len(),
        ..Default::default()
    };
    let mut certificates = Vec::with_capacity(total);

    for (index, row) in table.rows().enumerate() {
        if row.is_blank() {
            debug!("Row {} is blank, skipping", index);
            stats.skipped_blank += 1;
            continue;
        }

        let record = CertificateRecord::from_row(&row);
        if let Some(cb) = cb {
            cb.on_record_start(index, total, record.name.as_deref().unwrap_or(""));
        }

        let mut result = render_row(index, &record, &config.placeholder);
        if result.is_ok() {
            finish(&mut result);
        }

        match &result.error {
            None => {
                debug!("Row {}: {} ({} bytes)", index, result.file_name, result.size_bytes);
                if let Some(cb) = cb {
                    cb.on_record_complete(index, total, result.size_bytes);
                }
            }
            Some(e) => {
                warn!("Row {} ({}) failed: {}", index, result.name, e);
                if let Some(cb) = cb {
                    cb.on_record_error(index, total, &e.to_string());
                }
            }
        }

        stats.record(&result);
        certificates.push(result);
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Certificates: {}/{} rendered, {} failed, {} blank rows skipped in {}ms",
        stats.rendered, total, stats.failed, stats.skipped_blank, stats.duration_ms
    );

    if let Some(cb) = cb {
        cb.on_batch_complete(total, stats.rendered);
    }

    CertifyOutput { certificates, stats }
}

/// Render a certificate for every non-blank row of an already-loaded table.
pub fn certify_table(table: &RawTable, config: &CertifyConfig) -> CertifyOutput {
    run_batch(table, config, |_| {})
}

/// Load `input` and render every certificate in memory.
///
/// # Returns
/// `Ok(CertifyOutput)` even when some rows failed; check
/// `output.stats.failed` or call [`CertifyOutput::into_result`].
///
/// # Errors
/// Fatal loading errors only.
pub fn certify(input: impl AsRef<Path>, config: &CertifyConfig) -> Result<CertifyOutput, PaysheetError> {
    let input = input.as_ref();
    info!("Generating certificates from {}", input.display());
    let table = read_table(input, config.sheet.as_deref(), config.skip_rows)?;
    Ok(certify_table(&table, config))
}

/// Load `input` and write one PDF per row into `out_dir`.
///
/// Rows that share a name get `_2`, `_3`, … appended to the file stem
/// instead of overwriting each other. PDF bytes are dropped once written.
///
/// # Errors
/// Fatal loading errors, or [`PaysheetError::OutputWriteFailed`] when
/// `out_dir` cannot be created. Per-file write failures are per-record.
pub fn certify_to_dir(
    input: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &CertifyConfig,
) -> Result<CertifyOutput, PaysheetError> {
    let input = input.as_ref();
    let out_dir = out_dir.as_ref();
    info!(
        "Generating certificates from {} into {}",
        input.display(),
        out_dir.display()
    );

    let table = read_table(input, config.sheet.as_deref(), config.skip_rows)?;
    std::fs::create_dir_all(out_dir).map_err(|source| PaysheetError::OutputWriteFailed {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let output = run_batch(&table, config, |result| {
        let uses = seen.entry(result.file_name.clone()).or_insert(0);
        *uses += 1;
        if *uses > 1 {
            let stem = result.file_name.trim_end_matches(".pdf");
            result.file_name = format!("{stem}_{uses}.pdf");
        }

        let path = out_dir.join(&result.file_name);
        let bytes = result.pdf.take().unwrap_or_default();
        match write_atomic(&path, &bytes) {
            Ok(()) => result.path = Some(path),
            Err(e) => {
                result.size_bytes = 0;
                result.error = Some(RecordError::WriteFailed {
                    record: result.index,
                    path,
                    detail: e.to_string(),
                });
            }
        }
    });

    Ok(output)
}

//! CLI binary for paysheet.
//!
//! A thin shim over the library crate that maps subcommand flags to
//! `CleanConfig` / `CertifyConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paysheet::{
    certify_to_dir, clean_to_files, CertificateProgressCallback, CertifyConfig, CleanConfig,
    CleanOutput, EmployeeRecord, ExportPaths, ProgressCallback,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one ✓/✗ line per certificate.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    names: Mutex<HashMap<usize, String>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` tells us how many rows there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading table…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} certificates  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }

    fn failed(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    fn finish_record(&self, index: usize) -> (String, u128) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        let name = self
            .names
            .lock()
            .unwrap()
            .remove(&index)
            .unwrap_or_default();
        (name, elapsed_ms)
    }
}

impl CertificateProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Generating {total} certificates…"))
        ));
    }

    fn on_record_start(&self, index: usize, _total: usize, name: &str) {
        self.start_times.lock().unwrap().insert(index, Instant::now());
        self.names.lock().unwrap().insert(index, name.to_string());
        self.bar.set_message(name.to_string());
    }

    fn on_record_complete(&self, index: usize, _total: usize, pdf_len: usize) {
        let (name, elapsed_ms) = self.finish_record(index);
        self.bar.println(format!(
            "  {} Row {:>4}  {:<32}  {}  {}",
            green("✓"),
            index,
            name,
            dim(&format!("{:>6} bytes", pdf_len)),
            dim(&format!("{}ms", elapsed_ms)),
        ));
        self.bar.inc(1);
    }

    fn on_record_error(&self, index: usize, _total: usize, error: &str) {
        let (name, _) = self.finish_record(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Row {:>4}  {:<32}  {}",
            red("✗"),
            index,
            name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = self.failed();
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} certificates generated",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} certificates generated  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

// ── Arguments ────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Consolidate a pay bill; writes pay_bill_cleaned.csv and .xlsx beside it
  paysheet clean pay_bill.xlsx

  # Custom destinations and a specific sheet
  paysheet clean pay_bill.xlsx --sheet March --csv out/march.csv --xlsx out/march.xlsx

  # Full result as JSON
  paysheet clean pay_bill.xlsx --json > records.json

  # One Last Pay Certificate per row into ./certificates
  paysheet certify staff.xlsx -o certificates

INPUT FORMATS:
  .xlsx .xlsm .xls .xlsb .ods .csv

LOGGING:
  RUST_LOG overrides the -v / -q levels, e.g. RUST_LOG=paysheet=debug
"#;

/// Payroll paperwork from spreadsheets.
#[derive(Parser, Debug)]
#[command(
    name = "paysheet",
    version,
    about = "Clean pay-bill exports and generate Last Pay Certificates",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Consolidate a pay-bill export into one row per employee.
    Clean(CleanArgs),
    /// Render a Last Pay Certificate PDF for every row of a table.
    Certify(CertifyArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Pay-bill workbook or CSV.
    input: PathBuf,

    /// CSV destination [default: <INPUT stem>_cleaned.csv].
    #[arg(long)]
    csv: Option<PathBuf>,

    /// XLSX destination [default: <INPUT stem>_cleaned.xlsx].
    #[arg(long)]
    xlsx: Option<PathBuf>,

    /// Worksheet name [default: first sheet].
    #[arg(long)]
    sheet: Option<String>,

    /// Title rows above the header.
    #[arg(long, default_value_t = 1)]
    skip_rows: usize,

    /// Serial-number column.
    #[arg(long, default_value = paysheet::config::DEFAULT_SERIAL_COLUMN)]
    serial_column: String,

    /// Name/detail column.
    #[arg(long, default_value = paysheet::config::DEFAULT_DETAILS_COLUMN)]
    details_column: String,

    /// Print the full result as JSON instead of a preview.
    #[arg(long)]
    json: bool,

    /// Records shown in the preview.
    #[arg(long, default_value_t = 10)]
    preview: usize,
}

#[derive(Args, Debug)]
struct CertifyArgs {
    /// Staff table (workbook or CSV) with Name, Office, From_Date, … columns.
    input: PathBuf,

    /// Directory for the generated PDFs.
    #[arg(short, long, default_value = "certificates")]
    output: PathBuf,

    /// Worksheet name [default: first sheet].
    #[arg(long)]
    sheet: Option<String>,

    /// Rows above the header.
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,

    /// Text printed for absent fields.
    #[arg(long, default_value = paysheet::config::DEFAULT_PLACEHOLDER)]
    placeholder: String,

    /// Print the batch result as JSON.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs while it is on screen.
    let show_progress = match &cli.command {
        Command::Certify(args) => !cli.quiet && !args.no_progress && !args.json,
        Command::Clean(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Clean(args) => run_clean(&args, cli.quiet),
        Command::Certify(args) => run_certify(&args, cli.quiet, show_progress),
    }
}

// ── clean ────────────────────────────────────────────────────────────────────

fn run_clean(args: &CleanArgs, quiet: bool) -> Result<()> {
    let mut builder = CleanConfig::builder()
        .skip_rows(args.skip_rows)
        .serial_column(&args.serial_column)
        .details_column(&args.details_column);
    if let Some(sheet) = &args.sheet {
        builder = builder.sheet(sheet);
    }
    if let Some(csv) = &args.csv {
        builder = builder.csv_output(csv);
    }
    if let Some(xlsx) = &args.xlsx {
        builder = builder.xlsx_output(xlsx);
    }
    let config = builder.build().context("Invalid configuration")?;

    let (output, paths) = clean_to_files(&args.input, &config)
        .with_context(|| format!("Failed to clean {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !quiet {
        print_preview(&output.records, args.preview);
        print_clean_summary(&output, &paths);
    }
    Ok(())
}

fn cell(v: Option<impl ToString>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn print_preview(records: &[EmployeeRecord], limit: usize) {
    if records.is_empty() || limit == 0 {
        return;
    }
    println!(
        "{}",
        bold(&format!(
            "{:>6}  {:<30}  {:<36}  {:>8}  {:>8}",
            "Sr_No", "Employee_Name", "Designation", "Min_Pay", "Max_Pay"
        ))
    );
    for r in records.iter().take(limit) {
        println!(
            "{:>6}  {:<30}  {:<36}  {:>8}  {:>8}",
            cell(r.serial_number),
            cell(r.employee_name.as_deref()),
            cell(r.designation.as_deref()),
            cell(r.min_pay_scale),
            cell(r.max_pay_scale),
        );
    }
    if records.len() > limit {
        println!("{}", dim(&format!("… {} more", records.len() - limit)));
    }
}

fn print_clean_summary(output: &CleanOutput, paths: &ExportPaths) {
    let s = &output.stats;
    eprintln!(
        "{}  {} records from {} rows  {}ms",
        green("✔"),
        bold(&s.records.to_string()),
        s.rows_read,
        s.duration_ms,
    );
    eprintln!(
        "   {} with designation  /  {} with pay scale  /  {} named",
        dim(&s.with_designation.to_string()),
        dim(&s.with_pay_scale.to_string()),
        dim(&s.with_name.to_string()),
    );
    if !s.columns_dropped.is_empty() {
        eprintln!("   dropped empty columns: {}", dim(&s.columns_dropped.join(", ")));
    }
    eprintln!("   →  {}", bold(&paths.csv.display().to_string()));
    eprintln!("   →  {}", bold(&paths.xlsx.display().to_string()));
}

// ── certify ──────────────────────────────────────────────────────────────────

fn run_certify(args: &CertifyArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn CertificateProgressCallback>)
    } else {
        None
    };

    let mut builder = CertifyConfig::builder()
        .skip_rows(args.skip_rows)
        .placeholder(&args.placeholder);
    if let Some(sheet) = &args.sheet {
        builder = builder.sheet(sheet);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let output = certify_to_dir(&args.input, &args.output, &config)
        .with_context(|| format!("Failed to generate certificates from {}", args.input.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !quiet {
        if !show_progress {
            for c in &output.certificates {
                match &c.error {
                    None => eprintln!("  {} {}  {}", green("✓"), c.file_name, dim(&c.department)),
                    Some(e) => eprintln!("  {} {}", red("✗"), red(&e.to_string())),
                }
            }
        }
        let s = &output.stats;
        eprintln!(
            "{}  {}/{} certificates  {}ms  →  {}",
            if s.failed == 0 { green("✔") } else { cyan("⚠") },
            s.rendered,
            s.rendered + s.failed,
            s.duration_ms,
            bold(&args.output.display().to_string()),
        );
        if s.skipped_blank > 0 {
            eprintln!("   {} blank rows skipped", dim(&s.skipped_blank.to_string()));
        }
    }

    output
        .into_result()
        .context("Some certificates could not be generated")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_callback() -> CliProgressCallback {
        CliProgressCallback {
            bar: ProgressBar::hidden(),
            start_times: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        }
    }

    #[test]
    fn failed_counts_record_errors_only() {
        let cb = hidden_callback();
        cb.on_batch_start(3);
        cb.on_record_start(0, 3, "Ramesh");
        cb.on_record_complete(0, 3, 1024);
        cb.on_record_start(1, 3, "Anita");
        cb.on_record_error(1, 3, "character '\u{930}' cannot be encoded");
        cb.on_record_start(2, 3, "Asha");
        cb.on_record_error(2, 3, "write failed");
        assert_eq!(cb.failed(), 2);
        cb.on_batch_complete(3, 1);
    }
}

//! Configuration types for pay-bill cleanup and certificate generation.
//!
//! Each pipeline has one config struct built through a builder:
//! [`CleanConfig`] for the consolidator and [`CertifyConfig`] for the
//! certificate renderer. Unset knobs fall back to the defaults documented on
//! each field.

use crate::error::PaysheetError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};

/// Column holding the serial number of each employee's primary row.
pub const DEFAULT_SERIAL_COLUMN: &str = "Sr. No.";

/// Column holding the name on primary rows and free text on detail rows.
pub const DEFAULT_DETAILS_COLUMN: &str = "Section of establishment & Name of incumbent";

/// Text printed in place of an absent certificate field.
pub const DEFAULT_PLACEHOLDER: &str = "N/A";

// ── Clean ────────────────────────────────────────────────────────────────

/// Configuration for consolidating a pay-bill export.
///
/// # Example
/// ```rust
/// use paysheet::CleanConfig;
///
/// let config = CleanConfig::builder()
///     .skip_rows(2)
///     .sheet("March")
///     .build()
///     .unwrap();
/// assert_eq!(config.skip_rows, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CleanConfig {
    /// Metadata rows above the header. Default: 1.
    ///
    /// Pay-bill exports carry an institution banner in the first row; the
    /// real column names start on the second.
    pub skip_rows: usize,

    /// Worksheet to read. Default: the first sheet. Ignored for CSV input.
    pub sheet: Option<String>,

    /// Serial-number column. Default: [`DEFAULT_SERIAL_COLUMN`].
    pub serial_column: String,

    /// Name/detail column. Default: [`DEFAULT_DETAILS_COLUMN`].
    pub details_column: String,

    /// CSV destination. Default: `<input stem>_cleaned.csv` beside the input.
    pub csv_output: Option<PathBuf>,

    /// XLSX destination. Default: `<input stem>_cleaned.xlsx` beside the input.
    pub xlsx_output: Option<PathBuf>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            skip_rows: 1,
            sheet: None,
            serial_column: DEFAULT_SERIAL_COLUMN.to_string(),
            details_column: DEFAULT_DETAILS_COLUMN.to_string(),
            csv_output: None,
            xlsx_output: None,
        }
    }
}

impl CleanConfig {
    pub fn builder() -> CleanConfigBuilder {
        CleanConfigBuilder {
            config: Self::default(),
        }
    }

    /// Export destinations `(csv, xlsx)` for `input`, honouring overrides.
    pub fn output_paths(&self, input: &Path) -> (PathBuf, PathBuf) {
        let derived = |ext: &str| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "paybill".to_string());
            input.with_file_name(format!("{stem}_cleaned.{ext}"))
        };
        (
            self.csv_output.clone().unwrap_or_else(|| derived("csv")),
            self.xlsx_output.clone().unwrap_or_else(|| derived("xlsx")),
        )
    }
}

/// Builder for [`CleanConfig`].
#[derive(Debug)]
pub struct CleanConfigBuilder {
    config: CleanConfig,
}

impl CleanConfigBuilder {
    pub fn skip_rows(mut self, n: usize) -> Self {
        self.config.skip_rows = n;
        self
    }

    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.config.sheet = Some(name.into());
        self
    }

    pub fn serial_column(mut self, name: impl Into<String>) -> Self {
        self.config.serial_column = name.into();
        self
    }

    pub fn details_column(mut self, name: impl Into<String>) -> Self {
        self.config.details_column = name.into();
        self
    }

    pub fn csv_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.csv_output = Some(path.into());
        self
    }

    pub fn xlsx_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.xlsx_output = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CleanConfig, PaysheetError> {
        let c = &self.config;
        if c.serial_column.trim().is_empty() || c.details_column.trim().is_empty() {
            return Err(PaysheetError::InvalidConfig(
                "Column names must not be empty".into(),
            ));
        }
        if c.serial_column == c.details_column {
            return Err(PaysheetError::InvalidConfig(format!(
                "Serial and details columns must differ, both are '{}'",
                c.serial_column
            )));
        }
        if let (Some(csv), Some(xlsx)) = (&c.csv_output, &c.xlsx_output) {
            if csv == xlsx {
                return Err(PaysheetError::InvalidConfig(format!(
                    "CSV and XLSX outputs point at the same file '{}'",
                    csv.display()
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Certify ──────────────────────────────────────────────────────────────

/// Configuration for rendering certificates from a table.
///
/// # Example
/// ```rust
/// use paysheet::CertifyConfig;
///
/// let config = CertifyConfig::builder().placeholder("-").build().unwrap();
/// assert_eq!(config.placeholder, "-");
/// ```
#[derive(Clone)]
pub struct CertifyConfig {
    /// Rows above the header. Default: 0.
    pub skip_rows: usize,

    /// Worksheet to read. Default: the first sheet. Ignored for CSV input.
    pub sheet: Option<String>,

    /// Printed wherever a field is absent. Default: [`DEFAULT_PLACEHOLDER`].
    pub placeholder: String,

    /// Receives per-certificate events during [`crate::certify()`] and
    /// [`crate::certify_to_dir()`].
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for CertifyConfig {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            sheet: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for CertifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertifyConfig")
            .field("skip_rows", &self.skip_rows)
            .field("sheet", &self.sheet)
            .field("placeholder", &self.placeholder)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn CertificateProgressCallback>"),
            )
            .finish()
    }
}

impl CertifyConfig {
    pub fn builder() -> CertifyConfigBuilder {
        CertifyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CertifyConfig`].
#[derive(Debug)]
pub struct CertifyConfigBuilder {
    config: CertifyConfig,
}

impl CertifyConfigBuilder {
    pub fn skip_rows(mut self, n: usize) -> Self {
        self.config.skip_rows = n;
        self
    }

    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.config.sheet = Some(name.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.config.placeholder = text.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CertifyConfig, PaysheetError> {
        if self.config.placeholder.is_empty() {
            return Err(PaysheetError::InvalidConfig(
                "Placeholder text must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

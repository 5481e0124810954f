//! Progress-callback trait for per-certificate events.
//!
//! Inject an [`Arc<dyn CertificateProgressCallback>`] via
//! [`crate::config::CertifyConfigBuilder::progress_callback`] to hear about
//! each row as it is rendered. The CLI uses this to drive its progress bar;
//! library callers can forward events wherever they like.
//!
//! # Example
//!
//! ```rust
//! use paysheet::{CertificateProgressCallback, CertifyConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter {
//!     done: AtomicUsize,
//! }
//!
//! impl CertificateProgressCallback for Counter {
//!     fn on_record_complete(&self, index: usize, total: usize, pdf_len: usize) {
//!         let n = self.done.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{n}/{total}: row {index} ({pdf_len} bytes)");
//!     }
//! }
//!
//! let config = CertifyConfig::builder()
//!     .progress_callback(Arc::new(Counter { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the certificate batch as it processes each row.
///
/// All methods default to no-ops so implementations override only what they
/// need. `Send + Sync` lets a callback be shared with other threads even
/// though the batch itself runs on the caller's thread.
pub trait CertificateProgressCallback: Send + Sync {
    /// Called once before the first row.
    ///
    /// # Arguments
    /// * `total` — number of rows that will be attempted
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a row is rendered.
    ///
    /// # Arguments
    /// * `index` — 0-based row index in the table
    /// * `total` — rows in the batch
    /// * `name`  — display name of the employee
    fn on_record_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a certificate is rendered (and written, when writing).
    ///
    /// # Arguments
    /// * `pdf_len` — size of the PDF in bytes
    fn on_record_complete(&self, index: usize, total: usize, pdf_len: usize) {
        let _ = (index, total, pdf_len);
    }

    /// Called when a row fails; the batch carries on with the next row.
    fn on_record_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every row has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// Callback that ignores every event.
pub struct NoopProgressCallback;

impl CertificateProgressCallback for NoopProgressCallback {}

/// Type stored in [`crate::config::CertifyConfig`].
pub type ProgressCallback = Arc<dyn CertificateProgressCallback>;

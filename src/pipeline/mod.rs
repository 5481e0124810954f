//! Pipeline stages for pay-bill cleanup and certificate rendering.
//!
//! Each submodule implements one step. The two pipelines share only the
//! table loader.
//!
//! ## Data Flow
//!
//! ```text
//! clean:   table ──▶ consolidate ──▶ export
//!          (calamine/csv)  (fold + pay_scale)  (csv + xlsx)
//!
//! certify: table ──▶ template ──▶ layout ──▶ pdf
//!          (rows)     (fields)     (pages)    (lopdf)
//! ```
//!
//! 1. [`table`]       — load a sheet or CSV into named columns and rows
//! 2. [`consolidate`] — fold multi-row employee entries into records
//! 3. [`pay_scale`]   — pull `min-max` bounds out of free text
//! 4. [`export`]      — CSV/XLSX encoding with atomic writes
//! 5. [`template`]    — the certificate's fixed text and tables
//! 6. [`layout`]      — cell/paragraph flow with page breaks
//! 7. [`metrics`]     — Helvetica glyph widths used by the layout
//! 8. [`pdf`]         — deterministic PDF serialisation

pub mod consolidate;
pub mod export;
pub mod layout;
pub mod metrics;
pub mod pay_scale;
pub mod pdf;
pub mod table;
pub mod template;

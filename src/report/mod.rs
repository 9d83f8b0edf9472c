//! Report generation
//!
//! `parse -> profile -> render -> inject dark theme`, then [`ReportStore`]
//! writes the document to disk.

pub mod charts;
pub mod html;
pub mod store;
pub mod theme;

use std::time::Instant;

use crate::config::{ProfilingConfig, ReportsConfig};
use crate::error::EdaError;
use crate::frame::SourceFormat;
use crate::logger;
use crate::profile::Profile;

pub use store::{normalize_name, validate_name, ReportStore};
pub use theme::{inject_style, DARK_THEME_CSS};

/// Uploaded file ready for profiling
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub format: SourceFormat,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Pick the parser from the filename; unsupported extensions are rejected here
    pub fn new(filename: String, bytes: Vec<u8>) -> Result<Self, EdaError> {
        let format = SourceFormat::from_filename(&filename).ok_or(EdaError::UnsupportedFileType)?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }
}

/// Parse, profile and render an upload into the final HTML document
///
/// CPU bound; call from a blocking worker.
pub fn build_report(
    upload: &Upload,
    reports: &ReportsConfig,
    profiling: &ProfilingConfig,
) -> Result<String, EdaError> {
    let started = Instant::now();
    let frame = upload.format.parse(&upload.bytes)?;
    logger::log_debug(&format!(
        "Parsed {} as {}: {} rows x {} columns",
        upload.filename,
        upload.format,
        frame.n_rows(),
        frame.n_cols()
    ));

    let profile = Profile::build(
        &frame,
        &reports.title,
        &upload.filename,
        upload.format,
        profiling,
    );
    let document = html::render_document(&profile);
    let html = inject_style(&document, DARK_THEME_CSS);

    logger::log_info(&format!(
        "Profiled {} ({}, {} rows x {} columns, {} alerts) in {:.2?}",
        upload.filename,
        upload.format,
        frame.n_rows(),
        frame.n_cols(),
        profile.alerts.len(),
        started.elapsed()
    ));
    Ok(html)
}

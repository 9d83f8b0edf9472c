//! Report storage on disk
//!
//! Reports live in one flat directory; names are validated so a request can
//! never write outside it.

use std::path::{Path, PathBuf};

use crate::config::ReportsConfig;
use crate::error::EdaError;

const EXTENSION: &str = ".html";

#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
    url_prefix: String,
}

impl ReportStore {
    pub fn new(config: &ReportsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            url_prefix: config.url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Create the report directory if it does not exist
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `html` under `name` (normalized), replacing any previous report
    ///
    /// Returns the public URL of the stored report.
    pub async fn save(&self, name: &str, html: &str) -> Result<String, EdaError> {
        let name = normalize_name(name);
        validate_name(&name)?;
        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&name), html).await?;
        Ok(self.url_for(&name))
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.url_prefix)
    }
}

/// Append `.html` unless the name already ends with it
///
/// # Examples
/// ```
/// use eda_report_server::report::normalize_name;
/// assert_eq!(normalize_name("report"), "report.html");
/// assert_eq!(normalize_name("a.html"), "a.html");
/// ```
pub fn normalize_name(name: &str) -> String {
    if name.ends_with(EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{EXTENSION}")
    }
}

/// Reject names that could escape the report directory
pub fn validate_name(name: &str) -> Result<(), EdaError> {
    let stem = name.strip_suffix(EXTENSION).unwrap_or(name);
    let invalid = stem.is_empty()
        || name.contains(['/', '\\', '\0'])
        || name.starts_with("..")
        || name == EXTENSION;
    if invalid {
        return Err(EdaError::InvalidReportName(name.to_string()));
    }
    Ok(())
}

//! Request-level error type
//!
//! Every failure of `POST /generate-eda` ends up as an [`EdaError`], which knows
//! its HTTP status and renders as `{"error": "<message>"}`.

use hyper::StatusCode;
use std::fmt;

use crate::frame::FrameError;

/// Message returned for uploads whose extension has no parser
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type. Please upload CSV, JSON, or Excel.";

#[derive(Debug)]
pub enum EdaError {
    /// Uploaded filename has no supported extension
    UnsupportedFileType,

    /// Output name would escape the report directory
    InvalidReportName(String),

    /// Multipart form missing, malformed, or lacking a required field
    InvalidForm(String),

    /// Request body exceeded `http.max_body_size`
    PayloadTooLarge,

    /// Uploaded content could not be parsed into a frame
    Frame(FrameError),

    /// Report could not be written
    Io(std::io::Error),

    /// Blocking profiling worker failed (panic or cancellation)
    Worker(String),
}

impl EdaError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedFileType | Self::InvalidReportName(_) => StatusCode::BAD_REQUEST,
            Self::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Frame(_) | Self::Io(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors are expected traffic, server errors get logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl fmt::Display for EdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFileType => f.write_str(UNSUPPORTED_FILE_TYPE),
            Self::InvalidReportName(_) => f.write_str("Invalid report filename"),
            Self::InvalidForm(msg) => f.write_str(msg),
            Self::PayloadTooLarge => f.write_str("Payload Too Large"),
            // Underlying failure text is echoed to the caller as-is
            Self::Frame(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Worker(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for EdaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FrameError> for EdaError {
    fn from(err: FrameError) -> Self {
        Self::Frame(err)
    }
}

impl From<std::io::Error> for EdaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<tokio::task::JoinError> for EdaError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(format!("Report worker failed: {err}"))
    }
}

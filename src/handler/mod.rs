//! Request handler module
//!
//! Routing dispatch, the report generation endpoint and report file serving.

pub mod form;
pub mod generate;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;

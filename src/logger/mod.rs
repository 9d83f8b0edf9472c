//! Logger module
//!
//! Provides logging utilities for the report server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled info, debug, warning and error logging
//! - File-based logging support
//!
//! Before [`init`] runs (unit tests, early startup) messages go straight to
//! stdout/stderr at `info` level.

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(Level::Info, writer::LogWriter::level) >= level
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("EDA report server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Upload endpoint: POST http://{addr}/generate-eda"));
    write_info(&format!(
        "Reports: {} served at {}/",
        config.reports.dir, config.reports.url_prefix
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info(&format!(
        "CORS: {}",
        if config.http.enable_cors { "enabled" } else { "disabled" }
    ));
    write_info("======================================\n");
}

pub fn log_server_stopped(active: usize) {
    write_info(&format!(
        "[Shutdown] Listener closed, {active} connection(s) still active"
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, max: u64) {
    log_warning(&format!(
        "[Connection] Rejected {peer_addr}: max_connections ({max}) reached"
    ));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(message);
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        log_debug(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    write_access(&entry.format(format));
}

pub fn log_report_saved(name: &str, url: &str) {
    log_info(&format!("[Report] Saved {name} -> {url}"));
}

pub fn log_report_failed(source: &str, err: &impl std::fmt::Display) {
    log_error(&format!("[Report] Failed to generate report from {source}: {err}"));
}

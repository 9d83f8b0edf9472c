//! Exploratory data analysis report server
//!
//! Accepts CSV, JSON and Excel uploads over HTTP, profiles them and publishes
//! a self-contained HTML report under `/reports/`.

pub mod config;
pub mod error;
pub mod frame;
pub mod handler;
pub mod http;
pub mod logger;
pub mod profile;
pub mod report;
pub mod server;

//! Access log lines
//!
//! `combined` and `common` follow the nginx/Apache layouts, `json` writes the
//! entry as one object, and anything else is a `$variable` pattern such as
//! `$remote_addr "$request" $status $request_time`.

use chrono::Local;
use serde::Serialize;

/// Parsed `logging.access_log_format`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessLogFormat {
    Combined,
    Common,
    Json,
    Custom(String),
}

impl AccessLogFormat {
    pub fn parse(format: &str) -> Self {
        match format {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

/// One served request, captured by the router
///
/// `path` excludes the query string. Absent headers log as `-`.
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// `1.0`, `1.1` or `2`
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Time from request receipt to response, in microseconds
    pub request_time_us: u64,
}

fn serialize_rfc3339<S: serde::Serializer>(
    time: &chrono::DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339())
}

/// Variables understood by custom patterns
const VARIABLES: [&str; 11] = [
    "remote_addr",
    "time_local",
    "time_iso8601",
    "request",
    "request_method",
    "request_uri",
    "request_time",
    "status",
    "body_bytes_sent",
    "http_referer",
    "http_user_agent",
];

impl AccessLogEntry {
    /// Entry stamped now; response fields are filled in after routing
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            AccessLogFormat::Common => self.format_common(),
            AccessLogFormat::Json => serde_json::to_string(self).unwrap_or_default(),
            AccessLogFormat::Custom(pattern) => self.format_custom(pattern),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time_local(),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn time_local(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time_local(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request" => self.request_line(),
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "request_time" => format!("{:.3}", self.request_time_us as f64 / 1_000_000.0),
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            "http_referer" => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            "http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            _ => return None,
        };
        Some(value)
    }

    /// Custom format with `$variable` substitution
    ///
    /// Each `$` takes the longest known variable name that follows it, so
    /// `$request_time` is never read as `$request` plus `_time`. Unknown
    /// variables are kept verbatim.
    fn format_custom(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let name = VARIABLES
                .iter()
                .filter(|v| after.starts_with(*v))
                .max_by_key(|v| v.len());
            match name.and_then(|n| self.variable(n).map(|value| (n, value))) {
                Some((n, value)) => {
                    out.push_str(&value);
                    rest = &after[n.len()..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "10.1.2.3".to_string(),
            "POST".to_string(),
            "/generate-eda".to_string(),
        );
        entry.query = Some("v=1".to_string());
        entry.status = 200;
        entry.body_bytes = 1234;
        entry.referer = Some("http://localhost:5173/upload".to_string());
        entry.user_agent = Some("curl/8.5.0".to_string());
        entry.request_time_us = 1500;
        entry
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(AccessLogFormat::parse("combined"), AccessLogFormat::Combined);
        assert_eq!(AccessLogFormat::parse("json"), AccessLogFormat::Json);
        assert_eq!(
            AccessLogFormat::parse("$status"),
            AccessLogFormat::Custom("$status".to_string())
        );
    }

    #[test]
    fn test_format_combined() {
        let log = upload_entry().format(&AccessLogFormat::Combined);
        assert!(log.starts_with("10.1.2.3 - - ["));
        assert!(log.contains("\"POST /generate-eda?v=1 HTTP/1.1\" 200 1234"));
        assert!(log.ends_with("\"http://localhost:5173/upload\" \"curl/8.5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = upload_entry().format(&AccessLogFormat::Common);
        assert!(log.contains("\"POST /generate-eda?v=1 HTTP/1.1\" 200 1234"));
        assert!(!log.contains("http://localhost:5173/upload"));
    }

    #[test]
    fn test_format_json() {
        let log = upload_entry().format(&AccessLogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "10.1.2.3");
        assert_eq!(value["method"], "POST");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 1234);
        assert_eq!(value["query"], "v=1");
        assert!(value["time"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_format_custom() {
        let entry = upload_entry();
        let log = entry.format(&AccessLogFormat::Custom(
            "$remote_addr $request_method $request_time $status $unknown $".to_string(),
        ));
        assert_eq!(log, "10.1.2.3 POST 0.002 200 $unknown $");
    }

    #[test]
    fn test_custom_request_line() {
        let log = upload_entry().format(&AccessLogFormat::Custom("[$request]".to_string()));
        assert_eq!(log, "[POST /generate-eda?v=1 HTTP/1.1]");
    }
}

//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: size checks, CORS, route matching
//! and access logging.

use crate::config::AppState;
use crate::handler::generate;
use crate::handler::static_files::{self, FileRequest};
use crate::http::{self, CorsRequest};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const GENERATE_PATH: &str = "/generate-eda";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = access_entry(&req, peer_addr);
    let cors = CorsRequest::from_headers(req.headers());

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = match check_body_size(&req, state.config.http.max_body_size) {
        Some(resp) => resp,
        None => route_request(req, &state).await,
    };

    if state.config.http.enable_cors {
        cors.apply(&mut response);
    }
    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert("Server", server_name);
    }

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_head = method == Method::HEAD;

    if method == Method::OPTIONS {
        return build_options_response(&req, state.config.http.enable_cors);
    }

    // Health check endpoints first, they must stay cheap
    let health = &state.config.health;
    if health.enabled && matches!(method, Method::GET | Method::HEAD) {
        if path == health.liveness_path {
            return http::build_health_response(true, is_head);
        }
        if path == health.readiness_path {
            let ready = tokio::fs::metadata(state.store.dir())
                .await
                .is_ok_and(|m| m.is_dir());
            return http::build_health_response(ready, is_head);
        }
    }

    if path == GENERATE_PATH {
        if method != Method::POST {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response("POST, OPTIONS");
        }
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        return generate::generate_eda(content_type.as_deref(), req.into_body(), state).await;
    }

    if is_under(&path, state.store.url_prefix()) {
        if !matches!(method, Method::GET | Method::HEAD) {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response("GET, HEAD, OPTIONS");
        }
        let if_none_match = req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok());
        let file_req = FileRequest {
            path: &path,
            is_head,
            if_none_match,
        };
        return static_files::serve_report(&file_req, state).await;
    }

    http::build_404_response()
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// `OPTIONS` answer: a CORS preflight when enabled, otherwise just `Allow`
fn build_options_response<B>(req: &Request<B>, enable_cors: bool) -> Response<Full<Bytes>> {
    if enable_cors {
        return CorsRequest::from_headers(req.headers()).preflight();
    }
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = hyper::StatusCode::NO_CONTENT;
    response.headers_mut().insert(
        "Allow",
        HeaderValue::from_static("GET, HEAD, POST, OPTIONS"),
    );
    response
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Capture the request side of the access log line before the body is consumed
fn access_entry<B>(req: &Request<B>, peer_addr: Option<SocketAddr>) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.map_or_else(|| "-".to_string(), |addr| addr.ip().to_string()),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_under() {
        assert!(is_under("/reports/a.html", "/reports"));
        assert!(!is_under("/reports", "/reports"));
        assert!(!is_under("/reportsx/a.html", "/reports"));
        assert!(is_under("/a.html", ""));
    }

    #[test]
    fn test_check_body_size() {
        let req = Request::builder()
            .header("content-length", "2048")
            .body(())
            .unwrap();
        let resp = check_body_size(&req, 1024).unwrap();
        assert_eq!(resp.status(), hyper::StatusCode::PAYLOAD_TOO_LARGE);
        assert!(check_body_size(&req, 4096).is_none());

        let bogus = Request::builder()
            .header("content-length", "lots")
            .body(())
            .unwrap();
        assert!(check_body_size(&bogus, 1024).is_none());
    }

    #[test]
    fn test_access_entry() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/generate-eda?x=1")
            .version(Version::HTTP_10)
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let entry = access_entry(&req, Some("10.0.0.7:5000".parse().unwrap()));
        assert_eq!(entry.remote_addr, "10.0.0.7");
        assert_eq!(entry.method, "POST");
        assert_eq!(entry.path, "/generate-eda");
        assert_eq!(entry.query.as_deref(), Some("x=1"));
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(entry.referer, None);
    }

    #[test]
    fn test_options_without_cors() {
        let req = Request::builder().method(Method::OPTIONS).body(()).unwrap();
        let resp = build_options_response(&req, false);
        assert_eq!(resp.status(), hyper::StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD, POST, OPTIONS");
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
    }
}

//! Cross-origin resource sharing
//!
//! Every origin, method and header is allowed. Credentialed requests need an
//! explicit origin, so the request's `Origin` is echoed back when present.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Response, StatusCode};

const ALLOW_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";
const MAX_AGE: &str = "600";

/// CORS-relevant request headers, captured before the request is consumed
#[derive(Debug, Clone, Default)]
pub struct CorsRequest {
    origin: Option<HeaderValue>,
    request_headers: Option<HeaderValue>,
}

impl CorsRequest {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            origin: headers.get("Origin").cloned(),
            request_headers: headers.get("Access-Control-Request-Headers").cloned(),
        }
    }

    fn allow_origin(&self) -> HeaderValue {
        self.origin
            .clone()
            .unwrap_or_else(|| HeaderValue::from_static("*"))
    }

    /// Add CORS headers to an actual (non-preflight) response
    pub fn apply<B>(&self, response: &mut Response<B>) {
        let headers = response.headers_mut();
        headers.insert("Access-Control-Allow-Origin", self.allow_origin());
        headers.insert(
            "Access-Control-Allow-Credentials",
            HeaderValue::from_static("true"),
        );
        if self.origin.is_some() {
            headers.append("Vary", HeaderValue::from_static("Origin"));
        }
    }

    /// `204` answer to an `OPTIONS` preflight
    pub fn preflight(&self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.apply(&mut response);

        let headers = response.headers_mut();
        headers.insert(
            "Access-Control-Allow-Methods",
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            "Access-Control-Allow-Headers",
            self.request_headers
                .clone()
                .unwrap_or_else(|| HeaderValue::from_static("*")),
        );
        headers.insert("Access-Control-Max-Age", HeaderValue::from_static(MAX_AGE));
        response
    }
}

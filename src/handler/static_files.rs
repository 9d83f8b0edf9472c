//! Report file serving
//!
//! `GET /reports/<name>` reads straight from the report directory. Paths are
//! percent-decoded and canonicalized; anything resolving outside the directory
//! is answered with `404`.

use crate::config::AppState;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Per-request inputs for serving a report file
pub struct FileRequest<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Serve a stored report by its URL path
pub async fn serve_report(req: &FileRequest<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let Some(relative) = relative_path(req.path, state.store.url_prefix()) else {
        return http::build_404_response();
    };

    match load_from_directory(state.store.dir(), &relative).await {
        Some((content, file_path)) => {
            let content_type = mime::content_type_for(&file_path);
            let cache_control =
                cache::CachePolicy::from_max_age(state.config.reports.cache_max_age)
                    .to_header_value();
            build_file_response(
                content,
                content_type,
                &cache_control,
                req.if_none_match,
                req.is_head,
            )
        }
        None => http::build_404_response(),
    }
}

/// Decoded path below `url_prefix`, or `None` if the request is not under it
fn relative_path(path: &str, url_prefix: &str) -> Option<String> {
    let rest = path.strip_prefix(url_prefix)?.strip_prefix('/')?;
    if rest.is_empty() {
        return None;
    }
    urlencoding::decode(rest).ok().map(|decoded| decoded.into_owned())
}

/// Read `relative` inside `dir`, refusing anything that resolves outside it
pub async fn load_from_directory(dir: &Path, relative: &str) -> Option<(Vec<u8>, PathBuf)> {
    let dir_canonical = match fs::canonicalize(dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Report directory not found or inaccessible '{}': {e}",
                dir.display()
            ));
            return None;
        }
    };

    // Missing files are ordinary 404s
    let file_canonical = fs::canonicalize(dir.join(relative)).await.ok()?;
    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_canonical.display()
        ));
        return None;
    }
    if !fs::metadata(&file_canonical).await.ok()?.is_file() {
        return None;
    }

    match fs::read(&file_canonical).await {
        Ok(content) => Some((content, file_canonical)),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_canonical.display()
            ));
            None
        }
    }
}

fn build_file_response(
    content: Vec<u8>,
    content_type: &str,
    cache_control: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&content);

    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag, cache_control);
    }

    http::build_cached_response(
        Bytes::from(content),
        content_type,
        &etag,
        cache_control,
        is_head,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path("/reports/q1.html", "/reports").as_deref(),
            Some("q1.html")
        );
        assert_eq!(
            relative_path("/reports/q1%20summary.html", "/reports").as_deref(),
            Some("q1 summary.html")
        );
        assert_eq!(relative_path("/reports/", "/reports"), None);
        assert_eq!(relative_path("/reportsx/a.html", "/reports"), None);
        assert_eq!(relative_path("/other/a.html", "/reports"), None);
    }

    #[tokio::test]
    async fn test_load_inside_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), "<p>a</p>").unwrap();

        let (content, path) = load_from_directory(dir.path(), "a.html").await.unwrap();
        assert_eq!(content, b"<p>a</p>");
        assert!(path.ends_with("a.html"));
        assert!(load_from_directory(dir.path(), "missing.html").await.is_none());
    }

    #[tokio::test]
    async fn test_traversal_blocked() {
        let root = tempfile::tempdir().unwrap();
        let reports = root.path().join("reports");
        std::fs::create_dir(&reports).unwrap();
        std::fs::write(root.path().join("secret.txt"), "secret").unwrap();

        assert!(load_from_directory(&reports, "../secret.txt").await.is_none());
    }

    #[tokio::test]
    async fn test_directory_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        assert!(load_from_directory(dir.path(), "nested").await.is_none());
    }

    #[test]
    fn test_etag_revalidation() {
        let first = build_file_response(b"x".to_vec(), "text/html", "no-cache", None, false);
        let etag = first.headers()["ETag"].to_str().unwrap().to_string();

        let second =
            build_file_response(b"x".to_vec(), "text/html", "no-cache", Some(&etag), false);
        assert_eq!(second.status(), hyper::StatusCode::NOT_MODIFIED);
        assert_eq!(second.headers()["Cache-Control"], "no-cache");
    }
}

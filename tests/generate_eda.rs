//! End-to-end tests for the report endpoints, driving the router directly

mod common;

use common::{encode_multipart, multipart_content_type};
use eda_report_server::config::{AppState, Config};
use eda_report_server::handler::handle_request;
use eda_report_server::report::DARK_THEME_CSS;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const CSV: &[u8] = b"city,temp,rain,sunny\n\
Oslo,4.5,12,false\n\
Rome,18.25,3,true\n\
Lima,22.0,,true\n\
Oslo,4.5,12,false\n";

const JSON: &[u8] = br#"[
  {"id": 1, "name": "alpha", "score": 0.5, "created": "2024-01-05"},
  {"id": 2, "name": "beta", "score": null, "created": "2024-02-11"},
  {"id": 3, "name": "gamma", "score": 0.75, "created": "2024-03-20"}
]"#;

struct TestServer {
    state: Arc<AppState>,
    dir: TempDir,
}

impl TestServer {
    fn new() -> Self {
        Self::with_config(|_| {})
    }

    fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from("does-not-exist", None).unwrap();
        config.reports.dir = dir.path().join("reports").to_string_lossy().into_owned();
        config.logging.access_log = false;
        adjust(&mut config);
        Self {
            state: Arc::new(AppState::new(config)),
            dir,
        }
    }

    fn reports_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("reports")
    }

    async fn send(&self, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(&self.state), None)
            .await
            .unwrap()
    }

    async fn upload(&self, file_name: &str, data: &[u8], html_filename: &str) -> (StatusCode, Value) {
        let body = encode_multipart(&[
            ("file", Some(file_name), data),
            ("html_filename", None, html_filename.as_bytes()),
        ]);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/generate-eda")
            .header("content-type", multipart_content_type())
            .body(Full::new(Bytes::from(body)))
            .unwrap();
        let response = self.send(req).await;
        let status = response.status();
        (status, serde_json::from_slice(&body_bytes(response).await).unwrap())
    }
}

async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn xlsx_bytes() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "region").unwrap();
    sheet.write_string(0, 1, "revenue").unwrap();
    for (row, (region, revenue)) in [("north", 120.0), ("south", 95.5), ("east", 130.25)]
        .into_iter()
        .enumerate()
    {
        let row = u32::try_from(row).unwrap() + 1;
        sheet.write_string(row, 0, region).unwrap();
        sheet.write_number(row, 1, revenue).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

fn assert_styled_report(path: &Path) {
    let html = std::fs::read_to_string(path).unwrap();
    assert_eq!(html.matches("<head>").count(), 1);
    assert!(html.contains(&format!("<head>{DARK_THEME_CSS}")));
    assert_eq!(html.matches("/* Hide navbar */").count(), 1);
}

fn report_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}

#[tokio::test]
async fn test_csv_report() {
    let server = TestServer::new();
    let (status, body) = server.upload("weather.csv", CSV, "weather").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "EDA report generated successfully!");
    assert_eq!(body["report_url"], "/reports/weather.html");

    let path = server.reports_dir().join("weather.html");
    assert_styled_report(&path);
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("city"));
    assert!(html.contains("Oslo"));
}

#[tokio::test]
async fn test_json_report() {
    let server = TestServer::new();
    let (status, body) = server.upload("scores.json", JSON, "scores.html").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report_url"], "/reports/scores.html");
    assert_styled_report(&server.reports_dir().join("scores.html"));
}

#[tokio::test]
async fn test_spreadsheet_reports() {
    let server = TestServer::new();
    let bytes = xlsx_bytes();

    let (status, _) = server.upload("SALES.XLSX", &bytes, "sales").await;
    assert_eq!(status, StatusCode::OK);
    assert_styled_report(&server.reports_dir().join("sales.html"));

    // Content is sniffed, so an .xls name with xlsx content still parses
    let (status, _) = server.upload("renamed.xls", &bytes, "renamed").await;
    assert_eq!(status, StatusCode::OK);
    assert_styled_report(&server.reports_dir().join("renamed.html"));
}

#[tokio::test]
async fn test_legacy_xls_report() {
    let server = TestServer::new();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/regions.xls");
    let bytes = std::fs::read(fixture).unwrap();

    let (status, body) = server.upload("regions.xls", &bytes, "regions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report_url"], "/reports/regions.html");

    let path = server.reports_dir().join("regions.html");
    assert_styled_report(&path);
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("revenue"));
    assert!(html.contains("north"));
}

#[tokio::test]
async fn test_unsupported_extension_writes_nothing() {
    let server = TestServer::new();
    for name in ["notes.txt", "data.parquet", "noextension", "csv"] {
        let (status, body) = server.upload(name, CSV, "out").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Unsupported file type. Please upload CSV, JSON, or Excel."
        );
    }
    assert!(!server.reports_dir().join("out.html").exists());
    assert_eq!(report_count(&server.reports_dir()), 0);
}

#[tokio::test]
async fn test_reupload_overwrites() {
    let server = TestServer::new();
    let path = server.reports_dir().join("same.html");

    server.upload("a.csv", b"first_col\n1\n2\n", "same").await;
    let first = std::fs::read_to_string(&path).unwrap();
    assert!(first.contains("first_col"));

    let (status, _) = server.upload("b.csv", b"second_col\n3\n4\n", "same.html").await;
    assert_eq!(status, StatusCode::OK);
    let second = std::fs::read_to_string(&path).unwrap();
    assert!(second.contains("second_col"));
    assert!(!second.contains("first_col"));
    assert_eq!(report_count(&server.reports_dir()), 1);
}

#[tokio::test]
async fn test_malformed_content_is_server_error() {
    let server = TestServer::new();

    let (status, body) = server.upload("ragged.csv", b"a,b\n1,2,3\n", "ragged").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));

    let (status, _) = server.upload("broken.json", b"{\"a\": [1, 2", "broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = server.upload("fake.xlsx", b"not a workbook", "fake").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert!(!server.reports_dir().join("ragged.html").exists());
    assert!(!server.reports_dir().join("broken.html").exists());
}

#[tokio::test]
async fn test_unsafe_report_names_rejected() {
    let server = TestServer::new();
    for name in ["../escape", "nested/report", "..\\win", ""] {
        let (status, body) = server.upload("data.csv", CSV, name).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "name {name:?}");
        assert_eq!(body["error"], "Invalid report filename");
    }
    assert!(!server.dir.path().join("escape.html").exists());
}

#[tokio::test]
async fn test_missing_form_field() {
    let server = TestServer::new();
    let body = encode_multipart(&[("file", Some("data.csv"), CSV)]);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/generate-eda")
        .header("content-type", multipart_content_type())
        .body(Full::new(Bytes::from(body)))
        .unwrap();

    let response = server.send(req).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "Field required: html_filename");
}

#[tokio::test]
async fn test_body_size_limit() {
    let server = TestServer::with_config(|config| config.http.max_body_size = 64);
    let (status, _) = server.upload("data.csv", CSV, "big").await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/generate-eda")
        .header("content-length", "1000")
        .body(Full::new(Bytes::new()))
        .unwrap();
    assert_eq!(server.send(req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_serve_generated_report() {
    let server = TestServer::new();
    let (_, body) = server.upload("weather.csv", CSV, "served").await;
    let url = body["report_url"].as_str().unwrap().to_string();

    let response = server.send(get(&url)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["Content-Type"], "text/html; charset=utf-8");
    assert_eq!(response.headers()["Cache-Control"], "no-cache");
    let etag = response.headers()["ETag"].to_str().unwrap().to_string();
    let served = body_bytes(response).await;
    let on_disk = std::fs::read(server.reports_dir().join("served.html")).unwrap();
    assert_eq!(served.as_ref(), on_disk.as_slice());

    let revalidate = Request::builder()
        .uri(&url)
        .header("if-none-match", &etag)
        .body(Full::new(Bytes::new()))
        .unwrap();
    assert_eq!(
        server.send(revalidate).await.status(),
        StatusCode::NOT_MODIFIED
    );

    let head = Request::builder()
        .method(Method::HEAD)
        .uri(&url)
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.send(head).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_serve_percent_encoded_name() {
    let server = TestServer::new();
    server.upload("weather.csv", CSV, "q1 summary").await;
    let response = server.send(get("/reports/q1%20summary.html")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_and_escaping_reports_are_404() {
    let server = TestServer::new();
    std::fs::create_dir_all(server.reports_dir()).unwrap();
    std::fs::write(server.dir.path().join("secret.txt"), "secret").unwrap();

    for uri in ["/reports/nope.html", "/reports/..%2Fsecret.txt", "/reports/"] {
        let response = server.send(get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
    }
}

#[tokio::test]
async fn test_cors_headers() {
    let server = TestServer::new();

    let req = Request::builder()
        .uri("/healthz")
        .header("origin", "http://localhost:5173")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.send(req).await;
    assert_eq!(
        response.headers()["Access-Control-Allow-Origin"],
        "http://localhost:5173"
    );
    assert_eq!(response.headers()["Access-Control-Allow-Credentials"], "true");

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/generate-eda")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.send(preflight).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["Access-Control-Allow-Headers"], "content-type");
    assert!(response.headers()["Access-Control-Allow-Methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
}

#[tokio::test]
async fn test_cors_disabled() {
    let server = TestServer::with_config(|config| config.http.enable_cors = false);
    let req = Request::builder()
        .uri("/healthz")
        .header("origin", "http://localhost:5173")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.send(req).await;
    assert!(response.headers().get("Access-Control-Allow-Origin").is_none());
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let server = TestServer::new();

    let response = server.send(get("/nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["error"], "Not Found");

    let response = server.send(get("/generate-eda")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["Allow"], "POST, OPTIONS");

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/reports/a.html")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let response = server.send(delete).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()["Allow"], "GET, HEAD, OPTIONS");
}

#[tokio::test]
async fn test_health_checks() {
    let server = TestServer::new();

    let response = server.send(get("/healthz")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, "ok");

    assert_eq!(
        server.send(get("/readyz")).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    server.state.store.ensure_dir().await.unwrap();
    assert_eq!(server.send(get("/readyz")).await.status(), StatusCode::OK);
}

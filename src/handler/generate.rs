//! `POST /generate-eda`
//!
//! Buffers the multipart body, profiles the upload on a blocking worker and
//! writes the rendered report into the report directory.

use crate::config::AppState;
use crate::error::EdaError;
use crate::handler::form::UploadForm;
use crate::http;
use crate::logger;
use crate::report::{self, Upload};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

pub const SUCCESS_MESSAGE: &str = "EDA report generated successfully!";

#[derive(Debug, Serialize)]
struct GenerateResponse<'a> {
    message: &'a str,
    report_url: String,
}

/// Handle a report generation request
pub async fn generate_eda<B>(
    content_type: Option<&str>,
    body: B,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match run(content_type, body, state).await {
        Ok(report_url) => http::json_response(
            StatusCode::OK,
            &GenerateResponse {
                message: SUCCESS_MESSAGE,
                report_url,
            },
        ),
        Err((source, err)) => {
            if err.is_server_error() {
                logger::log_report_failed(&source, &err);
            } else {
                logger::log_warning(&format!("[Report] Rejected upload {source}: {err}"));
            }
            http::error_response(err.status(), &err.to_string())
        }
    }
}

/// Returns the report URL, or the upload's name alongside the failure
async fn run<B>(
    content_type: Option<&str>,
    body: B,
    state: &Arc<AppState>,
) -> Result<String, (String, EdaError)>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let unnamed = |err: EdaError| ("<request>".to_string(), err);
    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
    let body = read_body(body, limit).await.map_err(unnamed)?;
    let form = UploadForm::parse(content_type, body).await.map_err(unnamed)?;

    let source = form.file_name.clone();
    let with_source = |err: EdaError| (source.clone(), err);

    let upload = Upload::new(form.file_name, form.file_bytes).map_err(with_source)?;
    let name = report::normalize_name(&form.html_filename);
    report::validate_name(&name).map_err(with_source)?;

    let worker_state = Arc::clone(state);
    let html = tokio::task::spawn_blocking(move || {
        report::build_report(
            &upload,
            &worker_state.config.reports,
            &worker_state.config.profiling,
        )
    })
    .await
    .map_err(|e| with_source(e.into()))?
    .map_err(with_source)?;

    let url = state.store.save(&name, &html).await.map_err(with_source)?;
    logger::log_report_saved(&name, &url);
    Ok(url)
}

/// Collect the request body, failing once it grows past `limit` bytes
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, EdaError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(EdaError::PayloadTooLarge)
        }
        Err(err) => Err(EdaError::InvalidForm(format!(
            "Failed to read request body: {err}"
        ))),
    }
}

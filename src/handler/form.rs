//! Multipart upload form
//!
//! `POST /generate-eda` takes two fields: `file` (an uploaded file) and
//! `html_filename` (text). Anything else in the form is ignored.

use futures_util::stream;
use hyper::body::Bytes;
use std::convert::Infallible;

use crate::error::EdaError;

const FILE_FIELD: &str = "file";
const NAME_FIELD: &str = "html_filename";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// Client-side filename of the upload
    pub file_name: String,
    pub file_bytes: Vec<u8>,
    /// Requested report name, before normalization
    pub html_filename: String,
}

impl UploadForm {
    /// Parse a buffered `multipart/form-data` body
    pub async fn parse(content_type: Option<&str>, body: Bytes) -> Result<Self, EdaError> {
        let boundary = content_type
            .and_then(|ct| multer::parse_boundary(ct).ok())
            .ok_or_else(|| {
                EdaError::InvalidForm("Expected a multipart/form-data request body".to_string())
            })?;

        let body_stream = stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::new(body_stream, boundary);

        let mut file: Option<(String, Vec<u8>)> = None;
        let mut html_filename: Option<String> = None;

        while let Some(field) = multipart.next_field().await.map_err(invalid)? {
            let field_name = field.name().map(ToString::to_string);
            match field_name.as_deref() {
                Some(FILE_FIELD) => {
                    let Some(name) = field.file_name().map(ToString::to_string) else {
                        return Err(EdaError::InvalidForm(format!(
                            "Expected UploadFile in field: {FILE_FIELD}"
                        )));
                    };
                    let data = field.bytes().await.map_err(invalid)?;
                    file = Some((name, data.to_vec()));
                }
                Some(NAME_FIELD) => {
                    html_filename = Some(field.text().await.map_err(invalid)?);
                }
                _ => {}
            }
        }

        let (file_name, file_bytes) = file.ok_or_else(|| missing(FILE_FIELD))?;
        let html_filename = html_filename.ok_or_else(|| missing(NAME_FIELD))?;
        Ok(Self {
            file_name,
            file_bytes,
            html_filename,
        })
    }
}

fn missing(field: &str) -> EdaError {
    EdaError::InvalidForm(format!("Field required: {field}"))
}

fn invalid(err: multer::Error) -> EdaError {
    EdaError::InvalidForm(format!("Invalid multipart form: {err}"))
}

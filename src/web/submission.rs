//! Reading a `/process` submission off the wire.
//!
//! Accepts `multipart/form-data` (text and/or file) and
//! `application/x-www-form-urlencoded` (text only). A request with no
//! content type is treated as an empty submission.

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{StatusCode, header};
use axum::Form;
use serde::Deserialize;
use tracing::debug;

use super::MAX_BODY_BYTES;
use crate::error::UploadError;

/// Form field carrying inline email text.
pub const TEXT_FIELD: &str = "email_text";

/// Form field carrying the uploaded email file.
pub const FILE_FIELD: &str = "email_file";

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied filename, used only to choose an extraction strategy.
    pub filename: String,
    pub bytes: Bytes,
}

/// Raw fields of one `/process` request.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub email_text: Option<String>,
    pub email_file: Option<Upload>,
}

impl Submission {
    /// Inline text, if it has anything besides whitespace.
    pub fn inline_text(&self) -> Option<&str> {
        self.email_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// The upload, if it carries a filename. Nameless file parts are what
    /// browsers send for an untouched file input.
    pub fn named_upload(&self) -> Option<&Upload> {
        self.email_file
            .as_ref()
            .filter(|upload| !upload.filename.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TextForm {
    #[serde(default)]
    email_text: Option<String>,
}

/// Parse the request body into a [`Submission`].
///
/// A declared `Content-Length` over [`MAX_BODY_BYTES`] is rejected up front.
/// Streamed bodies are capped by axum's body limit, which the router sets to
/// the same value, and surface here as [`UploadError::TooLarge`] too.
pub async fn read_submission(request: Request) -> Result<Submission, UploadError> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > MAX_BODY_BYTES) {
        return Err(too_large());
    }

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase());

    match content_type.as_deref() {
        Some(ct) if ct.starts_with("multipart/form-data") => read_multipart(request).await,
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            let Form(form) = Form::<TextForm>::from_request(request, &())
                .await
                .map_err(|e| {
                    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        too_large()
                    } else {
                        UploadError::MalformedForm(e.body_text())
                    }
                })?;
            Ok(Submission {
                email_text: form.email_text,
                email_file: None,
            })
        }
        None => Ok(Submission::default()),
        Some(other) => Err(UploadError::UnsupportedContentType(other.to_string())),
    }
}

async fn read_multipart(request: Request) -> Result<Submission, UploadError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| UploadError::MalformedForm(e.body_text()))?;

    let mut submission = Submission::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| field_error(e, UploadError::MalformedForm))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            TEXT_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| field_error(e, UploadError::MalformedForm))?;
                submission.email_text = Some(text);
            }
            FILE_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| field_error(e, UploadError::FileRead))?;
                debug!(filename = %filename, bytes = bytes.len(), "Received upload");
                submission.email_file = Some(Upload { filename, bytes });
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}

/// Oversized bodies surface as stream errors mid-read; keep them distinct.
fn field_error(error: MultipartError, otherwise: fn(String) -> UploadError) -> UploadError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        otherwise(error.body_text())
    }
}

fn too_large() -> UploadError {
    UploadError::TooLarge {
        limit: MAX_BODY_BYTES,
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn multipart_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/process")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body.replace('\n', "\r\n")))
            .unwrap()
    }

    #[tokio::test]
    async fn reads_urlencoded_text() {
        let request = Request::builder()
            .method("POST")
            .uri("/process")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email_text=Bom+dia%2C+feliz+natal%21"))
            .unwrap();

        let submission = read_submission(request).await.unwrap();
        assert_eq!(submission.inline_text(), Some("Bom dia, feliz natal!"));
        assert!(submission.email_file.is_none());
    }

    #[tokio::test]
    async fn reads_multipart_text_and_file() {
        let body = "--XBOUNDARY\n\
                    Content-Disposition: form-data; name=\"email_text\"\n\
                    \n\
                    \n\
                    --XBOUNDARY\n\
                    Content-Disposition: form-data; name=\"email_file\"; filename=\"pedido.txt\"\n\
                    Content-Type: text/plain\n\
                    \n\
                    Segue o boleto em anexo.\n\
                    --XBOUNDARY--\n";

        let submission = read_submission(multipart_request(body)).await.unwrap();
        assert_eq!(submission.inline_text(), None);
        let upload = submission.named_upload().unwrap();
        assert_eq!(upload.filename, "pedido.txt");
        assert_eq!(&upload.bytes[..], b"Segue o boleto em anexo.");
    }

    #[tokio::test]
    async fn nameless_file_part_is_not_an_upload() {
        let body = "--XBOUNDARY\n\
                    Content-Disposition: form-data; name=\"email_file\"; filename=\"\"\n\
                    Content-Type: application/octet-stream\n\
                    \n\
                    \n\
                    --XBOUNDARY--\n";

        let submission = read_submission(multipart_request(body)).await.unwrap();
        assert!(submission.email_file.is_some());
        assert!(submission.named_upload().is_none());
    }

    #[tokio::test]
    async fn missing_content_type_is_empty_submission() {
        let request = Request::builder()
            .method("POST")
            .uri("/process")
            .body(Body::empty())
            .unwrap();
        let submission = read_submission(request).await.unwrap();
        assert!(submission.inline_text().is_none());
        assert!(submission.named_upload().is_none());
    }

    #[tokio::test]
    async fn declared_oversize_body_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/process")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::CONTENT_LENGTH, (MAX_BODY_BYTES + 1).to_string())
            .body(Body::empty())
            .unwrap();
        let err = read_submission(request).await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: MAX_BODY_BYTES }));
    }

    #[tokio::test]
    async fn json_body_is_unsupported() {
        let request = Request::builder()
            .method("POST")
            .uri("/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email_text": "oi"}"#))
            .unwrap();
        let err = read_submission(request).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedContentType(ref ct) if ct == "application/json"));
    }
}

//! HTTP boundary: manual-test form, `/process`, and liveness.

pub mod submission;

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::{ClassifyError, UploadError};
use crate::extract;
use crate::pipeline::classifier::Classifier;
use crate::pipeline::types::{Category, Classification};

use self::submission::{Submission, read_submission};

/// Largest accepted `/process` body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

/// Build the Axum router.
pub fn routes(classifier: Arc<Classifier>) -> Router {
    let state = AppState { classifier };

    Router::new()
        .route("/", get(index))
        .route("/process", post(process))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Responses ───────────────────────────────────────────────────────────

/// Success body of `/process`. Field names are the public contract.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub categoria: Category,
    pub resposta: String,
    pub origem: &'static str,
}

impl From<Classification> for ProcessResponse {
    fn from(c: Classification) -> Self {
        Self {
            categoria: c.category,
            resposta: c.reply,
            origem: c.source,
        }
    }
}

/// Everything `/process` can fail with. Always rendered as `{"erro": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Upload(UploadError::TooLarge { limit }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "Requisição excede o limite de {} MB.",
                    limit / (1024 * 1024)
                ),
            ),
            Self::Upload(UploadError::UnsupportedContentType(ct)) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Tipo de conteúdo não suportado: {ct}"),
            ),
            Self::Upload(UploadError::MalformedForm(detail)) => (
                StatusCode::BAD_REQUEST,
                format!("Formulário inválido: {detail}"),
            ),
            Self::Upload(UploadError::FileRead(detail)) => (
                StatusCode::BAD_REQUEST,
                format!("Falha ao ler arquivo: {detail}"),
            ),
            Self::Classify(ClassifyError::Input(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            Self::Classify(ClassifyError::Config(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Serviço de classificação não configurado.".to_string(),
            ),
            Self::Classify(ClassifyError::Llm(_)) => (
                StatusCode::BAD_GATEWAY,
                "Falha ao consultar o serviço de classificação.".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(serde_json::json!({ "erro": message }))).into_response()
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn process(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ProcessResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    async move {
        let submission = read_submission(request).await?;
        let text = submission_text(submission).await?;
        let classification = state.classifier.classify(&text).await?;
        Ok::<_, ApiError>(Json(ProcessResponse::from(classification)))
    }
    .instrument(info_span!("process", %request_id))
    .await
}

/// Inline text wins; otherwise the named upload is extracted.
async fn submission_text(submission: Submission) -> Result<String, UploadError> {
    if let Some(text) = submission.inline_text() {
        info!(source = "text", chars = text.chars().count(), "Email received");
        return Ok(text.to_string());
    }

    let Some(upload) = submission.named_upload().cloned() else {
        return Ok(String::new());
    };

    let filename = upload.filename.clone();
    let text = tokio::task::spawn_blocking(move || {
        extract::extract_text(&upload.bytes, &upload.filename)
    })
    .await
    .map_err(|e| UploadError::FileRead(e.to_string()))?;

    info!(
        source = "file",
        filename = %filename,
        chars = text.chars().count(),
        "Email received"
    );
    Ok(text)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>Classificador de E-mails</title></head>
<body style="font-family: sans-serif;">
  <h3>Classificador de E-mails</h3>
  <form method="POST" action="/process" enctype="multipart/form-data">
    <textarea name="email_text" rows="8" cols="80" placeholder="Cole o texto do e-mail aqui"></textarea><br/>
    <input type="file" name="email_file" accept=".txt,.pdf,.eml" />
    <button type="submit">Processar</button>
  </form>
</body>
</html>
"#;

//! HTTP upload server.
//!
//! Accepts lecture artifacts over multipart upload and runs the pipeline on
//! them in the background.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::collaborators::SourceKind;
use crate::config::Settings;
use crate::generation::{Flashcard, Generated};
use crate::job::{Job, JobStatus};
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

/// Shared application state.
struct AppState {
    orchestrator: Arc<Orchestrator>,
    upload_dir: PathBuf,
}

/// Run the HTTP upload server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lectio doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let upload_dir = settings.upload_dir();
    std::fs::create_dir_all(&upload_dir)?;

    let orchestrator = Arc::new(Orchestrator::new(settings)?);
    let state = Arc::new(AppState {
        orchestrator,
        upload_dir,
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Lectio Upload Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Upload", "POST /upload?locales=hi-IN,es-ES[&sync=true]");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Debug, Default, Deserialize)]
struct UploadParams {
    /// Comma-separated locale codes.
    #[serde(default)]
    locales: Option<String>,
    /// Run inline and return the result (documents and text only).
    #[serde(default)]
    sync: bool,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    job_id: Uuid,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flashcards: Option<Vec<Generated<Flashcard>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl UploadResponse {
    fn queued(job_id: Uuid) -> Self {
        Self {
            job_id,
            status: "queued".to_string(),
            summary: None,
            flashcards: None,
            error: None,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Response {
    let locales = parse_locales(params.locales.as_deref());

    let (job, path) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return error_response(StatusCode::BAD_REQUEST, "missing multipart field 'file'"),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        };
        if field.name() != Some("file") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or("upload"));
        let job = Job::new(filename);
        let path = state.upload_dir.join(format!("{}-{}", job.id, job.filename));

        if let Err(e) = save_field(field, &path).await {
            warn!("Failed to save upload {:?}: {}", path, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
        break (job, path);
    };

    info!("Accepted upload {} as job {}", job.filename, job.id);

    let inline = params.sync
        && matches!(
            SourceKind::from_path(&path),
            Ok(SourceKind::Document) | Ok(SourceKind::Text)
        );

    if inline {
        let outcome = state.orchestrator.run(job, &path, &locales).await;
        let response = UploadResponse {
            job_id: outcome.job.id,
            status: outcome.job.status().to_string(),
            summary: outcome.result.as_ref().map(|r| r.summary.clone()),
            flashcards: outcome.result.map(|r| r.flashcards),
            error: outcome.job.error().map(str::to_string),
        };
        let code = if outcome.job.status() == JobStatus::Done {
            StatusCode::OK
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        return (code, Json(response)).into_response();
    }

    let job_id = job.id;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let outcome = orchestrator.run(job, &path, &locales).await;
        match outcome.job.status() {
            JobStatus::Done => info!(
                "Job {} done: {}",
                outcome.job.id,
                outcome.job.result_location().unwrap_or_default()
            ),
            _ => warn!(
                "Job {} failed: {}",
                outcome.job.id,
                outcome.job.error().unwrap_or_default()
            ),
        }
    });

    (StatusCode::ACCEPTED, Json(UploadResponse::queued(job_id))).into_response()
}

/// Stream a multipart field to disk.
async fn save_field(mut field: axum::extract::multipart::Field<'_>, path: &Path) -> Result<(), String> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| format!("cannot create upload file: {}", e))?;

    while let Some(chunk) = field.chunk().await.map_err(|e| e.to_string())? {
        file.write_all(&chunk)
            .await
            .map_err(|e| format!("cannot write upload file: {}", e))?;
    }
    file.flush().await.map_err(|e| e.to_string())?;
    Ok(())
}

/// Split a `locales` query value into locale codes.
fn parse_locales(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keep only the final path component of a client-supplied file name.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locales() {
        assert_eq!(parse_locales(Some("hi-IN, es-ES,,")), vec!["hi-IN", "es-ES"]);
        assert!(parse_locales(None).is_empty());
        assert!(parse_locales(Some("")).is_empty());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("lecture.mp4"), "lecture.mp4");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\slides.pptx"), "slides.pptx");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn test_queued_response_shape() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(UploadResponse::queued(id)).unwrap();
        assert_eq!(json["status"], "queued");
        assert_eq!(json["job_id"], id.to_string());
        assert!(json.get("summary").is_none());
    }
}

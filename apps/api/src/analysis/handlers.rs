//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::engine::{Submission, WorkflowError, WorkflowOutcome};
use crate::analysis::stats::{compute_dashboard_stats, DashboardStats};
use crate::analysis::status::{StatusHistory, WorkflowStatus};
use crate::errors::AppError;
use crate::identity::SignedIn;
use crate::models::resume::{DocumentRecord, ResumeContext};
use crate::state::AppState;
use crate::storage::FileBlob;

/// Multipart bodies above this are refused by axum before the handler runs.
/// It sits above the 20 MiB upload ceiling so oversized resumes still reach
/// validation and get a proper size-limit status.
pub const ANALYZE_BODY_LIMIT: usize = 32 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HaltInfo {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub resume_id: Option<Uuid>,
    /// Whether a record was written, so `resume_id` can be fetched later.
    pub persisted: bool,
    pub status: WorkflowStatus,
    pub history: Vec<WorkflowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HaltInfo>,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<DocumentRecord>,
    pub stats: DashboardStats,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/analyze
///
/// Multipart fields: `file` (the PDF), `company_name`, `job_title`, `job_description`.
/// Runs the whole analysis workflow and reports the terminal status together
/// with every status it passed through.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: SignedIn,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let submission = read_submission(user.user_id.clone(), multipart).await?;
    info!(user = %user.user_id, files = submission.files.len(), "Analysis requested");

    let history = StatusHistory::default();
    let outcome = state.engine.run(submission, &history).await;

    let (http_status, persisted, redirect, error) = match &outcome {
        WorkflowOutcome::Completed { record, .. } => (
            StatusCode::OK,
            true,
            Some(format!("/resume/{}", record.id())),
            None,
        ),
        WorkflowOutcome::Halted {
            persisted, error, ..
        } => {
            let (http_status, code) = halt_code(error);
            let info = HaltInfo {
                code,
                message: error.to_string(),
            };
            (http_status, *persisted, None, Some(info))
        }
    };

    Ok((
        http_status,
        Json(AnalyzeResponse {
            resume_id: outcome.record_id(),
            persisted,
            status: outcome.status().clone(),
            history: history.snapshot(),
            redirect,
            error,
        }),
    ))
}

/// GET /api/v1/resumes
///
/// The caller's Document Records, newest first, with dashboard statistics.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: SignedIn,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.records.list(&user.user_id).await?;
    let stats = compute_dashboard_stats(&resumes);
    Ok(Json(ResumeListResponse { resumes, stats }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: SignedIn,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<DocumentRecord>, AppError> {
    // Someone else's record is reported exactly like a missing one.
    let record = state
        .records
        .get(resume_id)
        .await?
        .filter(|record| record.is_owned_by(&user.user_id))
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
    Ok(Json(record))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn halt_code(error: &WorkflowError) -> (StatusCode, &'static str) {
    match error {
        WorkflowError::Input(_) => (StatusCode::BAD_REQUEST, "INVALID_UPLOAD"),
        WorkflowError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
        WorkflowError::Parse(_) => (StatusCode::BAD_GATEWAY, "FEEDBACK_PARSE_ERROR"),
        WorkflowError::Stage { .. } => (StatusCode::BAD_GATEWAY, "STAGE_FAILED"),
    }
}

async fn read_submission(
    owner: String,
    mut multipart: Multipart,
) -> Result<Submission, AppError> {
    let mut files = Vec::new();
    let mut context = ResumeContext::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                files.push(FileBlob::new(file_name, content_type, bytes));
            }
            "company_name" => context.company_name = read_text(field).await?,
            "job_title" => context.job_title = read_text(field).await?,
            "job_description" => context.job_description = read_text(field).await?,
            _ => {}
        }
    }

    Ok(Submission {
        owner,
        files,
        context,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::Validation(format!("Invalid form field: {e}")))
}

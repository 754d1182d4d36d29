//! Axum route handlers for the Builder API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::builder::actions::{Outcome, WizardAction};
use crate::builder::prompts::{
    build_generation_prompt, download_file_name, extract_html, GENERATION_SYSTEM,
};
use crate::builder::record::CollectorRecord;
use crate::builder::wizard::{Wizard, WizardStep};
use crate::errors::AppError;
use crate::identity::SignedIn;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub step: WizardStep,
    pub position: usize,
    pub total_steps: usize,
    pub title: &'static str,
    pub record: CollectorRecord,
}

impl SessionResponse {
    fn new(session_id: Uuid, wizard: Wizard) -> Self {
        let step = wizard.step();
        SessionResponse {
            session_id,
            step,
            position: step.position(),
            total_steps: WizardStep::ALL.len(),
            title: step.title(),
            record: wizard.into_record(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionResponse {
    Updated(SessionResponse),
    Exited { session_id: Uuid },
}

#[derive(Debug, Serialize)]
pub struct PromptPreview {
    pub system: &'static str,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedResume {
    pub file_name: String,
    pub html: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/builder
pub async fn handle_start(
    State(state): State<AppState>,
    user: SignedIn,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, wizard) = state.sessions.start(&user.user_id).await;
    info!(user = %user.user_id, session_id = %id, "Builder session started");
    (StatusCode::CREATED, Json(SessionResponse::new(id, wizard)))
}

/// GET /api/v1/builder/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = state.sessions.snapshot(&user.user_id, id).await?;
    Ok(Json(SessionResponse::new(id, wizard)))
}

/// POST /api/v1/builder/:id/actions
///
/// Applies a single wizard action, e.g. `{"action": "add_skill", "value": "Rust"}`.
pub async fn handle_action(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
    Json(action): Json<WizardAction>,
) -> Result<Json<ActionResponse>, AppError> {
    let (outcome, wizard) = state.sessions.apply(&user.user_id, id, action).await?;
    let response = match outcome {
        Outcome::Updated(_) => ActionResponse::Updated(SessionResponse::new(id, wizard)),
        Outcome::Exited => ActionResponse::Exited { session_id: id },
    };
    Ok(Json(response))
}

/// GET /api/v1/builder/:id/prompt
///
/// The exact request generation would send, available at any step.
pub async fn handle_prompt_preview(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
) -> Result<Json<PromptPreview>, AppError> {
    let wizard = state.sessions.snapshot(&user.user_id, id).await?;
    Ok(Json(PromptPreview {
        system: GENERATION_SYSTEM,
        prompt: build_generation_prompt(wizard.record()),
    }))
}

/// POST /api/v1/builder/:id/generate
///
/// Only from the review step. The session is dropped once the HTML comes back;
/// on failure it is kept so the user can retry.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
) -> Result<Json<GeneratedResume>, AppError> {
    let record = state.sessions.review_record(&user.user_id, id).await?;

    if !state.llm.is_configured() {
        return Err(AppError::NotConfigured(
            "AI service is not configured. Set ANTHROPIC_API_KEY.".to_string(),
        ));
    }

    let prompt = build_generation_prompt(&record);
    let text = state
        .llm
        .call_text(&prompt, GENERATION_SYSTEM)
        .await
        .map_err(|e| {
            warn!(session_id = %id, error = %e, "Resume generation failed");
            AppError::Llm(e.to_string())
        })?;

    let html = extract_html(&text).to_string();
    let file_name = download_file_name(&record.personal_info);
    state.sessions.discard(&user.user_id, id).await?;
    info!(session_id = %id, file_name = %file_name, "Resume generated");

    Ok(Json(GeneratedResume { file_name, html }))
}

/// DELETE /api/v1/builder/:id
pub async fn handle_abandon(
    State(state): State<AppState>,
    user: SignedIn,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.discard(&user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

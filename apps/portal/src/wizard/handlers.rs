use axum::{extract::State, http::StatusCode, Json};
use chrono::{Local, Utc};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::state::AppState;
use crate::wizard::submission::{submit_draft, SubmissionError, SubmissionReceipt};
use crate::wizard::FormDraft;

impl From<SubmissionError> for AppError {
    fn from(e: SubmissionError) -> Self {
        let message = e.to_string();
        match e {
            SubmissionError::InvalidFields(fields) => AppError::InvalidFields(fields),
            SubmissionError::Draft(_) => AppError::Validation(message),
            SubmissionError::Timeout => AppError::UpstreamTimeout(message),
            SubmissionError::Network | SubmissionError::Rejected { .. } => {
                AppError::Upstream(message)
            }
        }
    }
}

/// GET /api/v1/wizard
pub async fn handle_load(State(state): State<AppState>) -> Json<FormDraft> {
    Json(state.wizard.load().await)
}

/// POST /api/v1/wizard/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Json(step_data): Json<Map<String, Value>>,
) -> Result<Json<FormDraft>, AppError> {
    let draft = state
        .wizard
        .advance(step_data, Local::now().date_naive())
        .await
        .map_err(|outcome| AppError::InvalidFields(outcome.field_errors))?;
    Ok(Json(draft))
}

/// POST /api/v1/wizard/retreat
pub async fn handle_retreat(State(state): State<AppState>) -> Json<FormDraft> {
    Json(state.wizard.retreat().await)
}

/// POST /api/v1/wizard/autosave
pub async fn handle_autosave(
    State(state): State<AppState>,
    Json(step_data): Json<Map<String, Value>>,
) -> StatusCode {
    state
        .wizard
        .autosave(step_data, Local::now().date_naive())
        .await;
    StatusCode::ACCEPTED
}

/// POST /api/v1/wizard/submit
pub async fn handle_submit(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let receipt = submit_draft(
        &state.wizard,
        state.store.as_ref(),
        &state.backend,
        &state.receipts,
        Local::now().date_naive(),
        Utc::now(),
    )
    .await?;
    state.dashboard.invalidate().await;
    Ok((StatusCode::CREATED, Json(receipt)))
}

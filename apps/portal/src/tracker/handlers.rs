use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::StatusCacheEntry;
use crate::state::AppState;
use crate::tracker::{track_application, TrackerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[serde(default)]
    pub application_number: String,
}

impl From<TrackerError> for AppError {
    fn from(e: TrackerError) -> Self {
        let message = e.to_string();
        match e {
            TrackerError::EmptyNumber => AppError::Validation(message),
            TrackerError::NotFound => AppError::NotFound(message),
            TrackerError::Timeout => AppError::UpstreamTimeout(message),
            TrackerError::Network | TrackerError::Server { .. } | TrackerError::Unavailable => {
                AppError::Upstream(message)
            }
        }
    }
}

/// POST /api/v1/tracker
pub async fn handle_track(
    State(state): State<AppState>,
    Json(req): Json<TrackRequest>,
) -> Result<Json<StatusCacheEntry>, AppError> {
    let entry = track_application(
        state.store.as_ref(),
        &state.backend,
        &req.application_number,
        Utc::now(),
    )
    .await?;
    Ok(Json(entry))
}

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::PortalMode;
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::PRIVACY_ACCEPTED_KEY;

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeBody {
    pub mode: PortalMode,
}

/// GET /api/v1/mode
pub async fn handle_get_mode(State(state): State<AppState>) -> Json<ModeBody> {
    Json(ModeBody {
        mode: state.backend.api().mode(),
    })
}

/// PUT /api/v1/mode
pub async fn handle_set_mode(
    State(state): State<AppState>,
    Json(req): Json<ModeBody>,
) -> Json<ModeBody> {
    state.backend.api().set_mode(req.mode);
    state.dashboard.invalidate().await;
    info!("Portal mode switched to {:?}", req.mode);
    Json(ModeBody {
        mode: state.backend.api().mode(),
    })
}

#[derive(Debug, Serialize)]
pub struct PrivacyBody {
    pub accepted: bool,
}

/// GET /api/v1/privacy
pub async fn handle_get_privacy(State(state): State<AppState>) -> Json<PrivacyBody> {
    let accepted = match state.store.get(PRIVACY_ACCEPTED_KEY).await {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            error!("Failed to read privacy flag: {e}");
            false
        }
    };
    Json(PrivacyBody { accepted })
}

/// POST /api/v1/privacy
pub async fn handle_accept_privacy(
    State(state): State<AppState>,
) -> Result<Json<PrivacyBody>, AppError> {
    state.store.set(PRIVACY_ACCEPTED_KEY, "true").await?;
    Ok(Json(PrivacyBody { accepted: true }))
}

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::admin::{AdminError, DashboardStats, DateFilter, MutationOutcome};
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus, OnboardingStatus};
use crate::state::AppState;

impl From<AdminError> for AppError {
    fn from(e: AdminError) -> Self {
        match e {
            AdminError::NotFound(_) => AppError::NotFound(e.to_string()),
            AdminError::InvalidUpdate(_) => AppError::Validation(e.to_string()),
            AdminError::Export(_) => AppError::Internal(e.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub filter: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

impl DashboardQuery {
    fn date_filter(&self) -> DateFilter {
        DateFilter::from_query(self.filter.as_deref(), self.from.as_deref(), self.to.as_deref())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub applications: Vec<Application>,
    pub stats: DashboardStats,
    pub filter: &'static str,
    pub demo_mode: bool,
    pub notice: Option<String>,
}

/// GET /api/v1/admin/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let now = Utc::now();
    let loaded = if query.refresh {
        state.dashboard.fetch_applications(now).await
    } else {
        state.dashboard.applications(now).await
    };

    let filter = query.date_filter();
    let applications = filter.apply(&loaded.applications, Local::now().date_naive());
    Ok(Json(DashboardResponse {
        stats: DashboardStats::compute(&applications),
        applications,
        filter: filter.label(),
        demo_mode: state.backend.api().should_show_sample_data(),
        notice: loaded.notice,
    }))
}

/// GET /api/v1/admin/export
pub async fn handle_export(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let export = state
        .dashboard
        .export_csv(query.date_filter(), Local::now().date_naive(), Utc::now())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
    pub comments: Option<String>,
}

/// POST /api/v1/admin/applications/:reference/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(req): Json<StatusChange>,
) -> Result<Json<MutationOutcome>, AppError> {
    let status: ApplicationStatus = req
        .status
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown status '{}'", req.status)))?;
    let outcome = state
        .dashboard
        .update_status(&reference, status, req.comments, Utc::now())
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingChange {
    pub onboarding_status: String,
}

/// POST /api/v1/admin/applications/:reference/onboarding
pub async fn handle_update_onboarding(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(req): Json<OnboardingChange>,
) -> Result<Json<MutationOutcome>, AppError> {
    let onboarding: OnboardingStatus = req
        .onboarding_status
        .parse()
        .map_err(AppError::Validation)?;
    let outcome = state
        .dashboard
        .update_onboarding(&reference, onboarding, Utc::now())
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct CommentChange {
    #[serde(default)]
    pub comments: String,
}

/// POST /api/v1/admin/applications/:reference/comment
pub async fn handle_update_comment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(req): Json<CommentChange>,
) -> Result<Json<MutationOutcome>, AppError> {
    let outcome = state
        .dashboard
        .update_comment(&reference, req.comments, Utc::now())
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/admin/applications/:reference
pub async fn handle_update_application(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<MutationOutcome>, AppError> {
    let outcome = state
        .dashboard
        .update_application(&reference, fields, Utc::now())
        .await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub token: String,
}

/// PUT /api/v1/admin/session
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Result<StatusCode, AppError> {
    let token = req.token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("Token must not be empty".to_string()));
    }
    state.dashboard.set_token(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/session
pub async fn handle_logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.dashboard.clear_session().await?;
    Ok(StatusCode::NO_CONTENT)
}

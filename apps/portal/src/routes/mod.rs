pub mod health;
pub mod settings;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::admin::handlers as admin;
use crate::lookup::handlers as lookup;
use crate::state::AppState;
use crate::tracker::handlers as tracker;
use crate::wizard::handlers as wizard;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Applicant wizard
        .route("/api/v1/wizard", get(wizard::handle_load))
        .route("/api/v1/wizard/advance", post(wizard::handle_advance))
        .route("/api/v1/wizard/retreat", post(wizard::handle_retreat))
        .route("/api/v1/wizard/autosave", post(wizard::handle_autosave))
        .route("/api/v1/wizard/submit", post(wizard::handle_submit))
        .route("/api/v1/lookup/pincode", post(lookup::handle_pincode))
        .route("/api/v1/lookup/ifsc", post(lookup::handle_ifsc))
        // Public status tracker
        .route("/api/v1/tracker", post(tracker::handle_track))
        // Admin dashboard
        .route(
            "/api/v1/admin/applications",
            get(admin::handle_list_applications),
        )
        .route("/api/v1/admin/export", get(admin::handle_export))
        .route(
            "/api/v1/admin/applications/:reference",
            post(admin::handle_update_application),
        )
        .route(
            "/api/v1/admin/applications/:reference/status",
            post(admin::handle_update_status),
        )
        .route(
            "/api/v1/admin/applications/:reference/onboarding",
            post(admin::handle_update_onboarding),
        )
        .route(
            "/api/v1/admin/applications/:reference/comment",
            post(admin::handle_update_comment),
        )
        .route(
            "/api/v1/admin/session",
            put(admin::handle_login).delete(admin::handle_logout),
        )
        // Portal settings
        .route(
            "/api/v1/mode",
            get(settings::handle_get_mode).put(settings::handle_set_mode),
        )
        .route(
            "/api/v1/privacy",
            get(settings::handle_get_privacy).post(settings::handle_accept_privacy),
        )
        .with_state(state)
}

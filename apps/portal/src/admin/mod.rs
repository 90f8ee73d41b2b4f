//! Admin dashboard: the merged application list held for the session, plus
//! the optimistic mutations, export and token handling built on top of it.
//!
//! Local writes always win. Remote calls are best-effort: a failure is
//! reported back as a message and never rolls anything back.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::backend::{AdminChange, BackendClient, BackendError};
use crate::models::application::{Application, ApplicationStatus, OnboardingStatus};
use crate::storage::{
    read_json, status_cache_key, write_json, KeyValueStore, StoreError, ADMIN_TOKEN_KEY,
    ALL_APPLICATIONS_KEY,
};
use crate::util::csv::json_to_csv;

pub mod filter;
pub mod handlers;
pub mod samples;

pub use filter::{DashboardStats, DateFilter};

const UPDATED_BY: &str = "admin";

pub const UNAUTHORIZED_NOTICE: &str = "Unauthorized access. Please login again.";
pub const ENDPOINT_MISSING_NOTICE: &str = "Applications endpoint not found. Using local data.";
pub const TIMEOUT_NOTICE: &str = "Request timeout. Loading local data.";
pub const FETCH_FAILED_NOTICE: &str =
    "Failed to fetch applications from server. Loading local data.";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Application {0} not found")]
    NotFound(String),

    #[error("Invalid field update: {0}")]
    InvalidUpdate(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

/// Result of a load: the list plus the notice to show, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub applications: Vec<Application>,
    pub notice: Option<String>,
}

/// Result of a mutation. `synced` is false when the remote call failed;
/// the local change stands either way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub application: Application,
    pub synced: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// `remote` first, then every local record the remote list does not have.
pub fn merge_applications(remote: Vec<Application>, local: Vec<Application>) -> Vec<Application> {
    let local_only: Vec<Application> = local
        .into_iter()
        .filter(|local| !remote.iter().any(|r| r.same_record(local)))
        .collect();
    let mut merged = remote;
    merged.extend(local_only);
    merged
}

pub struct AdminDashboard {
    store: Arc<dyn KeyValueStore>,
    backend: BackendClient,
    applications: RwLock<Option<Vec<Application>>>,
}

impl AdminDashboard {
    pub fn new(store: Arc<dyn KeyValueStore>, backend: BackendClient) -> Self {
        Self {
            store,
            backend,
            applications: RwLock::new(None),
        }
    }

    pub async fn token(&self) -> Option<String> {
        match self.store.get(ADMIN_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                error!("Failed to read admin token: {e}");
                None
            }
        }
    }

    pub async fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(ADMIN_TOKEN_KEY, token).await
    }

    /// Logout: drops the token and the loaded list.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        self.invalidate().await;
        self.store.remove(ADMIN_TOKEN_KEY).await
    }

    /// Drops the session list so the next read loads it again.
    pub async fn invalidate(&self) {
        *self.applications.write().await = None;
    }

    async fn local_applications(&self) -> Vec<Application> {
        match read_json::<Vec<Application>>(self.store.as_ref(), ALL_APPLICATIONS_KEY).await {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                error!("Failed to read local applications: {e}");
                Vec::new()
            }
        }
    }

    /// Local list, seeded with the sample records when empty in demo mode.
    async fn local_with_samples(&self, now: DateTime<Utc>) -> Vec<Application> {
        let local = self.local_applications().await;
        if local.is_empty() && self.backend.api().should_show_sample_data() {
            return samples::sample_applications(&now.to_rfc3339());
        }
        local
    }

    /// Loads the list from the backend (or local data) and keeps it for the
    /// session.
    pub async fn fetch_applications(&self, now: DateTime<Utc>) -> FetchOutcome {
        let token = self.token().await;
        let result = self.backend.list_applications(token.as_deref()).await;
        let notice = match result {
            Ok(remote) => {
                let count = remote.len();
                let merged = merge_applications(remote, self.local_applications().await);
                info!("Loaded {count} remote applications ({} total)", merged.len());
                return self.hold(merged, None).await;
            }
            Err(BackendError::Disabled) => None,
            Err(BackendError::Unauthorized) => {
                warn!("Applications fetch rejected; clearing admin token");
                if let Err(e) = self.store.remove(ADMIN_TOKEN_KEY).await {
                    error!("Failed to clear admin token: {e}");
                }
                Some(UNAUTHORIZED_NOTICE)
            }
            Err(BackendError::NotFound) => Some(ENDPOINT_MISSING_NOTICE),
            Err(BackendError::Timeout) => Some(TIMEOUT_NOTICE),
            Err(e) => {
                warn!("Error fetching applications: {e}");
                Some(FETCH_FAILED_NOTICE)
            }
        };
        let local = self.local_with_samples(now).await;
        self.hold(local, notice).await
    }

    async fn hold(&self, applications: Vec<Application>, notice: Option<&str>) -> FetchOutcome {
        *self.applications.write().await = Some(applications.clone());
        FetchOutcome {
            applications,
            notice: notice.map(str::to_string),
        }
    }

    /// The session list, loading it first if nothing is held yet.
    pub async fn applications(&self, now: DateTime<Utc>) -> FetchOutcome {
        if let Some(applications) = self.applications.read().await.clone() {
            return FetchOutcome {
                applications,
                notice: None,
            };
        }
        self.fetch_applications(now).await
    }

    pub async fn update_status(
        &self,
        reference: &str,
        status: ApplicationStatus,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, AdminError> {
        let comments = comments.filter(|c| !c.is_empty());
        let updated = self
            .apply_locally(reference, now, |app| {
                app.status = status;
                if let Some(comments) = &comments {
                    app.comments = comments.clone();
                }
                Ok(())
            })
            .await?;

        let change = AdminChange::StatusUpdate {
            status,
            comments: updated.comments.clone(),
            updated_by: UPDATED_BY.to_string(),
            updated_at: now.to_rfc3339(),
        };
        Ok(self
            .sync(
                updated,
                change,
                now,
                format!("Status updated to {} successfully", status.as_str()),
                "Failed to update status. Please try again.",
            )
            .await)
    }

    pub async fn update_onboarding(
        &self,
        reference: &str,
        onboarding: OnboardingStatus,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, AdminError> {
        let updated = self
            .apply_locally(reference, now, |app| {
                app.onboarding_status = onboarding;
                Ok(())
            })
            .await?;

        let change = AdminChange::OnboardingUpdate {
            onboarding_status: onboarding,
            updated_by: UPDATED_BY.to_string(),
            updated_at: now.to_rfc3339(),
        };
        Ok(self
            .sync(
                updated,
                change,
                now,
                format!("Onboarding status updated to {}", onboarding.as_str()),
                "Failed to update onboarding status. Please try again.",
            )
            .await)
    }

    pub async fn update_comment(
        &self,
        reference: &str,
        comments: String,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, AdminError> {
        let updated = self
            .apply_locally(reference, now, |app| {
                if !comments.is_empty() {
                    app.comments = comments.clone();
                }
                Ok(())
            })
            .await?;

        let change = AdminChange::CommentUpdate {
            comments: updated.comments.clone(),
            updated_by: UPDATED_BY.to_string(),
            updated_at: now.to_rfc3339(),
        };
        Ok(self
            .sync(
                updated,
                change,
                now,
                "Comment saved successfully".to_string(),
                "Failed to save comment. Please try again.",
            )
            .await)
    }

    /// Overlays edited fields. `id` and `applicationNumber` are identity and
    /// are never overwritten.
    pub async fn update_application(
        &self,
        reference: &str,
        mut fields: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome, AdminError> {
        fields.remove("id");
        fields.remove("applicationNumber");
        let updated = self
            .apply_locally(reference, now, |app| app.merge_fields(&fields))
            .await?;

        let change = AdminChange::UpdatedData(Box::new(updated.clone()));
        Ok(self
            .sync(
                updated,
                change,
                now,
                "Changes saved successfully".to_string(),
                "Failed to save changes. Please try again.",
            )
            .await)
    }

    /// Applies `edit` to the session record, the aggregate list entry with
    /// the same application number, and rewrites the status cache entry.
    async fn apply_locally<F>(
        &self,
        reference: &str,
        now: DateTime<Utc>,
        edit: F,
    ) -> Result<Application, AdminError>
    where
        F: Fn(&mut Application) -> Result<(), serde_json::Error>,
    {
        if self.applications.read().await.is_none() {
            self.fetch_applications(now).await;
        }

        let updated = {
            let mut guard = self.applications.write().await;
            let app = guard
                .as_mut()
                .and_then(|list| list.iter_mut().find(|app| app.matches_reference(reference)))
                .ok_or_else(|| AdminError::NotFound(reference.to_string()))?;
            edit(app)?;
            app.last_updated = now.to_rfc3339();
            app.clone()
        };

        if !updated.application_number.is_empty() {
            let key = status_cache_key(&updated.application_number);
            let entry = updated.status_cache_entry();
            if let Err(e) = write_json(self.store.as_ref(), &key, &entry).await {
                error!(
                    "Failed to refresh status cache for {}: {e}",
                    updated.application_number
                );
            }
            self.update_local_record(&updated.application_number, now, &edit)
                .await;
        }

        Ok(updated)
    }

    async fn update_local_record<F>(
        &self,
        application_number: &str,
        now: DateTime<Utc>,
        edit: &F,
    ) where
        F: Fn(&mut Application) -> Result<(), serde_json::Error>,
    {
        let mut local = self.local_applications().await;
        let mut changed = false;
        for app in local
            .iter_mut()
            .filter(|app| app.application_number == application_number)
        {
            if let Err(e) = edit(app) {
                warn!("Skipping local update of {application_number}: {e}");
                continue;
            }
            app.last_updated = now.to_rfc3339();
            changed = true;
        }
        if changed {
            if let Err(e) = write_json(self.store.as_ref(), ALL_APPLICATIONS_KEY, &local).await {
                error!("Failed to save local applications: {e}");
            }
        }
    }

    async fn sync(
        &self,
        application: Application,
        change: AdminChange,
        now: DateTime<Utc>,
        success: String,
        failure: &str,
    ) -> MutationOutcome {
        let token = self.token().await;
        let result = self
            .backend
            .send_admin_change(token.as_deref(), &application, &change, &now.to_rfc3339())
            .await;

        let synced = match result {
            Ok(()) | Err(BackendError::Disabled) => true,
            Err(e) => {
                warn!(
                    "Remote update of {} failed, keeping local change: {e}",
                    application.application_number
                );
                false
            }
        };

        MutationOutcome {
            application,
            synced,
            message: if synced { success } else { failure.to_string() },
        }
    }

    /// CSV of the filtered list, or of the backend's export when it answers.
    pub async fn export_csv(
        &self,
        filter: DateFilter,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CsvExport, AdminError> {
        let loaded = self.applications(now).await.applications;
        let filtered = filter.apply(&loaded, today);

        let token = self.token().await;
        let rows = match self
            .backend
            .export_applications(token.as_deref(), &filter.export_request())
            .await
        {
            Ok(Some(rows)) => rows,
            Ok(None) | Err(BackendError::Disabled) => to_rows(&filtered),
            Err(e) => {
                warn!("Export failed, exporting local data instead: {e}");
                to_rows(&filtered)
            }
        };

        Ok(CsvExport {
            filename: format!("LMS_Applications_{}.csv", today.format("%Y-%m-%d")),
            content: json_to_csv(&rows)?,
        })
    }
}

fn to_rows(applications: &[Application]) -> Vec<Value> {
    applications
        .iter()
        .filter_map(|app| app.to_value().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, PortalMode};
    use crate::models::application::{ApplicationId, StatusCacheEntry};
    use crate::storage::MemoryStore;
    use mockito::Server;
    use std::io::Write;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn record(id: i64, number: &str) -> Application {
        Application {
            id: Some(ApplicationId::Numeric(id)),
            application_number: number.to_string(),
            first_name: "Local".to_string(),
            submission_date: "18/10/2026".to_string(),
            ..Default::default()
        }
    }

    fn dashboard(url: &str, mode: PortalMode) -> (Arc<MemoryStore>, AdminDashboard) {
        let store = Arc::new(MemoryStore::default());
        let backend = BackendClient::new(ApiConfig::new(url, mode), Duration::from_secs(5));
        let dashboard = AdminDashboard::new(store.clone(), backend);
        (store, dashboard)
    }

    #[test]
    fn test_merge_keeps_remote_and_appends_local_only() {
        let remote = vec![record(1, "A"), record(2, "B")];
        let mut shadow = record(99, "B");
        shadow.first_name = "Stale".to_string();
        let local = vec![shadow, record(2, "Z"), record(3, "C")];

        let merged = merge_applications(remote, local);
        let numbers: Vec<_> = merged.iter().map(|a| a.application_number.as_str()).collect();
        assert_eq!(numbers, vec!["A", "B", "C"]);
        assert_eq!(merged[1].first_name, "Local");
    }

    #[test]
    fn test_merge_does_not_match_on_missing_identifiers() {
        let remote = vec![Application::default()];
        let local = vec![Application::default()];
        assert_eq!(merge_applications(remote, local).len(), 2);
    }

    #[tokio::test]
    async fn test_demo_mode_seeds_samples_when_empty() {
        let (_, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        let outcome = dashboard.fetch_applications(now()).await;
        assert_eq!(outcome.applications.len(), 2);
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.applications[0].application_number, "23876957639");
    }

    #[tokio::test]
    async fn test_demo_mode_prefers_local_records() {
        let (store, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![record(5, "L1")])
            .await
            .unwrap();

        let outcome = dashboard.fetch_applications(now()).await;
        assert_eq!(outcome.applications.len(), 1);
        assert_eq!(outcome.applications[0].application_number, "L1");
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_loads_local() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/resumebuilder/applications")
            .match_header("authorization", "Bearer stale-token")
            .with_status(401)
            .create_async()
            .await;

        let (store, dashboard) = dashboard(&server.url(), PortalMode::Production);
        dashboard.set_token("stale-token").await.unwrap();
        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![record(5, "L1")])
            .await
            .unwrap();

        let outcome = dashboard.fetch_applications(now()).await;
        assert_eq!(outcome.notice.as_deref(), Some(UNAUTHORIZED_NOTICE));
        assert_eq!(outcome.applications.len(), 1);
        assert!(dashboard.token().await.is_none());
    }

    #[tokio::test]
    async fn test_remote_list_is_merged_with_local() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/resumebuilder/applications")
            .with_status(200)
            .with_body(
                r#"{"applications":[{"id":1,"applicationNumber":"R1","status":"Approved"}]}"#,
            )
            .create_async()
            .await;

        let (store, dashboard) = dashboard(&server.url(), PortalMode::Production);
        write_json(
            store.as_ref(),
            ALL_APPLICATIONS_KEY,
            &vec![record(1, "R1"), record(7, "L7")],
        )
        .await
        .unwrap();

        let outcome = dashboard.fetch_applications(now()).await;
        let numbers: Vec<_> = outcome
            .applications
            .iter()
            .map(|a| a.application_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["R1", "L7"]);
        assert_eq!(outcome.applications[0].status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_status_update_survives_remote_failure() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/resumebuilder/applications")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let update = server
            .mock("POST", "/resumebuilder/application/update/status")
            .with_status(500)
            .create_async()
            .await;

        let (store, dashboard) = dashboard(&server.url(), PortalMode::Production);
        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![record(5, "L1")])
            .await
            .unwrap();
        dashboard.fetch_applications(now()).await;

        let outcome = dashboard
            .update_status(
                "L1",
                ApplicationStatus::Approved,
                Some("Verified".to_string()),
                now(),
            )
            .await
            .unwrap();
        update.assert_async().await;

        assert!(!outcome.synced);
        assert_eq!(outcome.message, "Failed to update status. Please try again.");
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);

        let held = dashboard.applications(now()).await.applications;
        assert_eq!(held[0].status, ApplicationStatus::Approved);

        let local: Vec<Application> = read_json(store.as_ref(), ALL_APPLICATIONS_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(local[0].status, ApplicationStatus::Approved);
        assert_eq!(local[0].comments, "Verified");
        assert_eq!(local[0].last_updated, now().to_rfc3339());

        let cached: StatusCacheEntry = read_json(store.as_ref(), &status_cache_key("L1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_empty_comment_keeps_previous() {
        let (store, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        let mut existing = record(5, "L1");
        existing.comments = "Call back Monday".to_string();
        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![existing])
            .await
            .unwrap();

        let outcome = dashboard
            .update_status("5", ApplicationStatus::Reviewing, Some(String::new()), now())
            .await
            .unwrap();
        assert!(outcome.synced);
        assert_eq!(outcome.message, "Status updated to Reviewing successfully");
        assert_eq!(outcome.application.comments, "Call back Monday");
    }

    #[tokio::test]
    async fn test_onboarding_and_field_updates_in_demo() {
        let (_, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);

        let onboarded = dashboard
            .update_onboarding("23876957639", OnboardingStatus::Done, now())
            .await
            .unwrap();
        assert_eq!(onboarded.message, "Onboarding status updated to Done");
        assert_eq!(onboarded.application.onboarding_status, OnboardingStatus::Done);

        let mut fields = Map::new();
        fields.insert("village".to_string(), Value::from("Lakeside"));
        fields.insert("applicationNumber".to_string(), Value::from("HIJACK"));
        let edited = dashboard
            .update_application("23876957639", fields, now())
            .await
            .unwrap();
        assert_eq!(edited.application.village, "Lakeside");
        assert_eq!(edited.application.application_number, "23876957639");
        assert_eq!(edited.message, "Changes saved successfully");
    }

    #[tokio::test]
    async fn test_unknown_reference_is_not_found() {
        let (_, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        let err = dashboard
            .update_comment("nope", "hi".to_string(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_export_in_demo_uses_filtered_list() {
        let (_, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        let export = dashboard
            .export_csv(DateFilter::All, today(), now())
            .await
            .unwrap();

        assert_eq!(export.filename, "LMS_Applications_2026-10-18.csv");
        let lines: Vec<_> = export.content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,applicationNumber,"));
    }

    #[tokio::test]
    async fn test_export_uses_backend_rows_when_available() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/resumebuilder/applications")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let _export = server
            .mock("POST", "/resumebuilder/applications/export")
            .with_status(200)
            .with_body(r#"{"applications":[{"name":"A, B","status":"Approved"}]}"#)
            .create_async()
            .await;

        let (_, dashboard) = dashboard(&server.url(), PortalMode::Production);
        let export = dashboard
            .export_csv(DateFilter::Today, today(), now())
            .await
            .unwrap();
        assert_eq!(export.content, "name,status\n\"A, B\",Approved");
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_session_list() {
        let (_, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        dashboard.set_token("t").await.unwrap();
        dashboard.fetch_applications(now()).await;

        dashboard.clear_session().await.unwrap();
        assert!(dashboard.token().await.is_none());
        assert!(dashboard.applications.read().await.is_none());
    }

    async fn failed_fetch(status: usize) -> FetchOutcome {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/resumebuilder/applications")
            .with_status(status)
            .with_body("{}")
            .create_async()
            .await;

        let (store, dashboard) = dashboard(&server.url(), PortalMode::Production);
        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![record(5, "L1")])
            .await
            .unwrap();
        dashboard.fetch_applications(now()).await
    }

    #[tokio::test]
    async fn test_missing_endpoint_falls_back_to_local() {
        let outcome = failed_fetch(404).await;
        assert_eq!(outcome.notice.as_deref(), Some(ENDPOINT_MISSING_NOTICE));
        assert_eq!(outcome.applications.len(), 1);
        assert_eq!(outcome.applications[0].application_number, "L1");
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_local() {
        let outcome = failed_fetch(500).await;
        assert_eq!(outcome.notice.as_deref(), Some(FETCH_FAILED_NOTICE));
        assert_eq!(outcome.applications[0].application_number, "L1");
    }

    #[tokio::test]
    async fn test_slow_list_times_out_with_notice() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/resumebuilder/applications")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(800));
                w.write_all(b"[]")
            })
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::default());
        let backend = BackendClient::new(
            ApiConfig::new(server.url(), PortalMode::Production),
            Duration::from_millis(100),
        );
        let dashboard = AdminDashboard::new(store.clone(), backend);
        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![record(5, "L1")])
            .await
            .unwrap();

        let outcome = dashboard.fetch_applications(now()).await;
        assert_eq!(outcome.notice.as_deref(), Some(TIMEOUT_NOTICE));
        assert_eq!(outcome.applications[0].application_number, "L1");
    }

    #[tokio::test]
    async fn test_invalidate_picks_up_new_local_records() {
        let (store, dashboard) = dashboard("http://127.0.0.1:9", PortalMode::Demo);
        let first = dashboard.applications(now()).await.applications;
        assert_eq!(first.len(), 2);

        write_json(store.as_ref(), ALL_APPLICATIONS_KEY, &vec![record(5, "L1")])
            .await
            .unwrap();
        dashboard.invalidate().await;

        let reloaded = dashboard.applications(now()).await.applications;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].application_number, "L1");
    }
}

//! Backend client. Every call to the remote REST API goes through here.
//!
//! Each call is attempted exactly once with a client-side timeout. Callers
//! decide what a failure degrades to; this module only classifies it.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ApiConfig, Endpoint};
use crate::models::application::{
    Application, ApplicationId, ApplicationStatus, OnboardingStatus, StatusCacheEntry,
};

const ADMIN_ID: &str = "admin";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Server error: {status} - {body}")]
    Server { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Remote API is disabled in demo mode")]
    Disabled,
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_decode() {
            BackendError::Malformed(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

/// What a successful submission returned.
#[derive(Debug, Clone, Default)]
pub struct SubmitResponse {
    /// Server-assigned application number, when the body carried one.
    pub application_number: Option<String>,
    /// The stored record as the server echoed it back (`data`).
    pub record: Option<Value>,
}

/// A single admin mutation, serialized under the key the backend expects
/// (`statusUpdate`, `onboardingUpdate`, `commentUpdate`, `updatedData`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminChange {
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        status: ApplicationStatus,
        comments: String,
        updated_by: String,
        updated_at: String,
    },
    #[serde(rename_all = "camelCase")]
    OnboardingUpdate {
        onboarding_status: OnboardingStatus,
        updated_by: String,
        updated_at: String,
    },
    #[serde(rename_all = "camelCase")]
    CommentUpdate {
        comments: String,
        updated_by: String,
        updated_at: String,
    },
    UpdatedData(Box<Application>),
}

impl AdminChange {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            AdminChange::StatusUpdate { .. } => Endpoint::UpdateStatus,
            AdminChange::OnboardingUpdate { .. } => Endpoint::UpdateOnboardingStatus,
            AdminChange::CommentUpdate { .. } => Endpoint::UpdateComment,
            AdminChange::UpdatedData(_) => Endpoint::UpdateApplication,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminChangeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    application_id: Option<&'a ApplicationId>,
    application_number: &'a str,
    #[serde(flatten)]
    change: &'a AdminChange,
    admin_id: &'a str,
    timestamp: &'a str,
}

/// Body of an export request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub date_filter: String,
    pub custom_date_range: Option<CustomDateRange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDateRange {
    pub from_date: String,
    pub to_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusLookupRequest<'a> {
    application_number: &'a str,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    api: ApiConfig,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(api: ApiConfig, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api,
            timeout,
        }
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    fn request(
        &self,
        method: reqwest::Method,
        endpoint: Endpoint,
    ) -> Result<RequestBuilder, BackendError> {
        if !self.api.should_use_api() {
            return Err(BackendError::Disabled);
        }
        let url = self.api.endpoint_url(endpoint);
        debug!("{method} {url}");
        Ok(self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header("Accept", "application/json"))
    }

    /// POST the completed application. The idempotency key is the same for
    /// every retry of one draft.
    pub async fn submit(
        &self,
        payload: &Application,
        idempotency_key: Uuid,
    ) -> Result<SubmitResponse, BackendError> {
        let response = self
            .request(reqwest::Method::POST, Endpoint::Submit)?
            .header("Idempotency-Key", idempotency_key.to_string())
            .json(payload)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.text().await?;

        Ok(parse_submit_response(&body))
    }

    /// Public status lookup; no token required.
    pub async fn application_status(
        &self,
        application_number: &str,
    ) -> Result<StatusCacheEntry, BackendError> {
        let response = self
            .request(reqwest::Method::POST, Endpoint::ApplicationStatus)?
            .json(&StatusLookupRequest { application_number })
            .send()
            .await?;
        let response = check_status(response).await?;
        let value: Value = response.json().await?;

        let record = match value.get("data") {
            Some(data @ Value::Object(_)) if value.get("status").is_none() => data.clone(),
            _ => value,
        };
        serde_json::from_value(record).map_err(|e| BackendError::Malformed(e.to_string()))
    }

    pub async fn list_applications(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Application>, BackendError> {
        let response = self
            .request(reqwest::Method::GET, Endpoint::Applications)?
            .bearer_auth(token.unwrap_or_default())
            .send()
            .await?;
        let response = check_status(response).await?;
        let value: Value = response.json().await?;

        Ok(normalize_application_list(value)
            .into_iter()
            .filter_map(|record| match Application::from_value(record) {
                Ok(app) => Some(app),
                Err(e) => {
                    warn!("Skipping unreadable application record: {e}");
                    None
                }
            })
            .collect())
    }

    pub async fn send_admin_change(
        &self,
        token: Option<&str>,
        application: &Application,
        change: &AdminChange,
        timestamp: &str,
    ) -> Result<(), BackendError> {
        let body = AdminChangeRequest {
            application_id: application.id.as_ref(),
            application_number: &application.application_number,
            change,
            admin_id: ADMIN_ID,
            timestamp,
        };
        let response = self
            .request(reqwest::Method::POST, change.endpoint())?
            .bearer_auth(token.unwrap_or_default())
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Returns the exported rows, or `None` if the body had no `applications`.
    pub async fn export_applications(
        &self,
        token: Option<&str>,
        request: &ExportRequest,
    ) -> Result<Option<Vec<Value>>, BackendError> {
        let response = self
            .request(reqwest::Method::POST, Endpoint::ExportExcel)?
            .bearer_auth(token.unwrap_or_default())
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let value: Value = response.json().await?;

        Ok(match value.get("applications") {
            Some(Value::Array(rows)) => Some(rows.clone()),
            _ => None,
        })
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(BackendError::Unauthorized),
        StatusCode::NOT_FOUND => Err(BackendError::NotFound),
        _ => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown server error".to_string());
            Err(BackendError::Server {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// A 2xx with a non-JSON body still counts as accepted.
fn parse_submit_response(body: &str) -> SubmitResponse {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => {
            warn!("Submit response is not JSON, proceeding with submission data");
            return SubmitResponse::default();
        }
    };

    let application_number = ["/data/applicationNumber", "/employeeData/applicationNumber"]
        .iter()
        .filter_map(|pointer| value.pointer(pointer))
        .find_map(|number| match number {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    let record = value.get("data").filter(|data| data.is_object()).cloned();

    SubmitResponse {
        application_number,
        record,
    }
}

/// Accepts a bare array, `{applications: [...]}` or `{data: [...]}`.
pub fn normalize_application_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Object(mut body) => match (body.remove("applications"), body.remove("data")) {
            (Some(Value::Array(rows)), _) => rows,
            (_, Some(Value::Array(rows))) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalMode;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: &str) -> BackendClient {
        BackendClient::new(
            ApiConfig::new(url, PortalMode::Production),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_normalize_list_shapes() {
        assert_eq!(normalize_application_list(json!([{ "a": 1 }])).len(), 1);
        assert_eq!(
            normalize_application_list(json!({ "applications": [{}, {}] })).len(),
            2
        );
        assert_eq!(normalize_application_list(json!({ "data": [{}] })).len(), 1);
        assert!(normalize_application_list(json!({ "data": {} })).is_empty());
        assert!(normalize_application_list(json!("nope")).is_empty());
    }

    #[test]
    fn test_parse_submit_response_number_locations() {
        let data = parse_submit_response(r#"{"data":{"applicationNumber":"LMS001"}}"#);
        assert_eq!(data.application_number.as_deref(), Some("LMS001"));
        assert!(data.record.is_some());

        let employee = parse_submit_response(r#"{"employeeData":{"applicationNumber":42}}"#);
        assert_eq!(employee.application_number.as_deref(), Some("42"));
        assert!(employee.record.is_none());

        let plain = parse_submit_response("OK");
        assert!(plain.application_number.is_none());
    }

    #[test]
    fn test_admin_change_body_shape() {
        let app = Application {
            id: Some(ApplicationId::Numeric(7)),
            application_number: "A1".to_string(),
            ..Default::default()
        };
        let change = AdminChange::StatusUpdate {
            status: ApplicationStatus::Approved,
            comments: "ok".to_string(),
            updated_by: "admin".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let body = serde_json::to_value(AdminChangeRequest {
            application_id: app.id.as_ref(),
            application_number: &app.application_number,
            change: &change,
            admin_id: ADMIN_ID,
            timestamp: "2025-01-01T00:00:00Z",
        })
        .unwrap();

        assert_eq!(body["applicationId"], 7);
        assert_eq!(body["applicationNumber"], "A1");
        assert_eq!(body["statusUpdate"]["status"], "Approved");
        assert_eq!(body["statusUpdate"]["updatedBy"], "admin");
        assert_eq!(body["adminId"], "admin");
    }

    #[tokio::test]
    async fn test_demo_mode_never_sends() {
        let client = BackendClient::new(
            ApiConfig::new("http://127.0.0.1:9", PortalMode::Demo),
            Duration::from_secs(1),
        );
        let err = client.list_applications(None).await.unwrap_err();
        assert!(matches!(err, BackendError::Disabled));
    }

    #[tokio::test]
    async fn test_list_applications_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/resumebuilder/applications")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"applications":[{"applicationNumber":"A1","status":"reviewing"}]}"#)
            .create_async()
            .await;

        let apps = client_for(&server.url())
            .list_applications(Some("secret"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].status, ApplicationStatus::Reviewing);
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let mut server = Server::new_async().await;
        let _unauthorized = server
            .mock("GET", "/resumebuilder/applications")
            .with_status(401)
            .create_async()
            .await;
        let _missing = server
            .mock("POST", "/resumebuilder/application/status")
            .with_status(404)
            .create_async()
            .await;
        let _broken = server
            .mock("POST", "/resumebuilder/applications/submit")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(matches!(
            client.list_applications(None).await,
            Err(BackendError::Unauthorized)
        ));
        assert!(matches!(
            client.application_status("X").await,
            Err(BackendError::NotFound)
        ));
        match client.submit(&Application::default(), Uuid::new_v4()).await {
            Err(BackendError::Server { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_sends_idempotency_key() {
        let mut server = Server::new_async().await;
        let key = Uuid::new_v4();
        let mock = server
            .mock("POST", "/resumebuilder/applications/submit")
            .match_header("idempotency-key", key.to_string().as_str())
            .match_body(Matcher::PartialJson(json!({ "firstName": "John" })))
            .with_status(201)
            .with_body(r#"{"data":{"applicationNumber":"LMS123"}}"#)
            .create_async()
            .await;

        let payload = Application {
            first_name: "John".to_string(),
            ..Default::default()
        };
        let response = client_for(&server.url()).submit(&payload, key).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.application_number.as_deref(), Some("LMS123"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = client_for("http://127.0.0.1:9");
        let err = client.application_status("A1").await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
    }
}

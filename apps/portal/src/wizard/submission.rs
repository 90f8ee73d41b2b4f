//! Review & submit: one remote attempt, then three local copies.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::backend::{BackendClient, BackendError};
use crate::models::application::{
    Application, ApplicationId, ApplicationStatus, OnboardingStatus,
};
use crate::receipt::ReceiptWriter;
use crate::storage::{
    read_json, status_cache_key, write_json, KeyValueStore, ALL_APPLICATIONS_KEY,
};
use crate::util::dates::display_date;
use crate::wizard::steps::Step;
use crate::wizard::WizardController;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Form has {} invalid field(s)", .0.len())]
    InvalidFields(BTreeMap<String, String>),

    #[error("Draft could not be read as an application: {0}")]
    Draft(#[from] serde_json::Error),

    #[error("Request timeout. Please check your connection and try again.")]
    Timeout,

    #[error("Network connection error. Please check your internet connection and try again.")]
    Network,

    #[error(
        "Failed to submit application. Please try again or contact support if the problem persists."
    )]
    Rejected { detail: String },
}

impl From<BackendError> for SubmissionError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Timeout => SubmissionError::Timeout,
            BackendError::Network(_) => SubmissionError::Network,
            other => SubmissionError::Rejected {
                detail: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberSource {
    /// Assigned by the backend.
    Server,
    /// Backend accepted the submission but returned no number.
    Local,
    /// Remote API disabled; placeholder number.
    Demo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub application_number: String,
    pub number_source: NumberSource,
    pub receipt_path: Option<PathBuf>,
    pub application: Application,
}

/// `prefix` followed by eleven random digits.
pub fn placeholder_number(prefix: &str) -> String {
    let digits: u64 = rand::rng().random_range(10_000_000_000..100_000_000_000);
    format!("{prefix}{digits}")
}

/// Stamps the review fields onto the draft data.
fn build_payload(
    data: &serde_json::Map<String, Value>,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Application, SubmissionError> {
    let mut payload = Application::from_value(Value::Object(data.clone()))?;
    payload.full_name = payload.candidate_name();
    payload.submission_date = display_date(today);
    payload.status = ApplicationStatus::Submitted;
    payload.comments = String::new();
    payload.onboarding_status = OnboardingStatus::NotDone;
    payload.last_updated = now.to_rfc3339();
    Ok(payload)
}

/// Submits the stored draft.
///
/// A single remote attempt is made. When the API is disabled a `DEMO`
/// placeholder number is used instead; any other failure is returned and the
/// draft is kept for a retry, which reuses the same idempotency key.
pub async fn submit_draft(
    wizard: &WizardController,
    store: &dyn KeyValueStore,
    backend: &BackendClient,
    receipts: &ReceiptWriter,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<SubmissionReceipt, SubmissionError> {
    let (draft, idempotency_key) = wizard.prepare_submission().await;

    let outcome = Step::Review.validate(&draft.data);
    if !outcome.valid {
        return Err(SubmissionError::InvalidFields(outcome.field_errors));
    }

    let mut payload = build_payload(&draft.data, today, now)?;
    let (number, source, server_record) = send(backend, &payload, idempotency_key).await?;
    payload.application_number = number.clone();
    info!("Application {number} submitted ({source:?})");

    wizard.clear().await;
    save_local_copies(store, &payload, now).await;

    let receipt_source = server_record
        .and_then(|record| Application::from_value(record).ok())
        .map(|mut record| {
            if record.application_number.is_empty() {
                record.application_number = number.clone();
            }
            record
        })
        .unwrap_or_else(|| payload.clone());
    let receipt_path = match receipts.write(&receipt_source).await {
        Ok(path) => Some(path),
        Err(e) => {
            error!("Receipt generation failed for {number}: {e}");
            None
        }
    };

    Ok(SubmissionReceipt {
        application_number: number,
        number_source: source,
        receipt_path,
        application: payload,
    })
}

async fn send(
    backend: &BackendClient,
    payload: &Application,
    idempotency_key: Uuid,
) -> Result<(String, NumberSource, Option<Value>), SubmissionError> {
    match backend.submit(payload, idempotency_key).await {
        Ok(response) => match response.application_number {
            Some(number) => Ok((number, NumberSource::Server, response.record)),
            None => {
                warn!("Backend accepted submission without an application number");
                Ok((placeholder_number("LOCAL"), NumberSource::Local, response.record))
            }
        },
        Err(BackendError::Disabled) => Ok((placeholder_number("DEMO"), NumberSource::Demo, None)),
        Err(e) => {
            warn!("Submission failed: {e}");
            Err(e.into())
        }
    }
}

/// Status cache entry plus an append to the aggregate list. Write failures
/// are logged only.
async fn save_local_copies(
    store: &dyn KeyValueStore,
    payload: &Application,
    now: DateTime<Utc>,
) {
    let number = &payload.application_number;
    let entry = payload.status_cache_entry();
    if let Err(e) = write_json(store, &status_cache_key(number), &entry).await {
        error!("Failed to cache status for {number}: {e}");
    }

    let mut all: Vec<Application> = match read_json(store, ALL_APPLICATIONS_KEY).await {
        Ok(list) => list.unwrap_or_default(),
        Err(e) => {
            error!("Failed to read local applications: {e}");
            Vec::new()
        }
    };
    let mut record = payload.clone();
    record.id = Some(ApplicationId::Numeric(now.timestamp_millis()));
    all.push(record);
    if let Err(e) = write_json(store, ALL_APPLICATIONS_KEY, &all).await {
        error!("Failed to append {number} to local applications: {e}");
    }
}

//! Application status tracker: local cache first, then one remote lookup.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::backend::{BackendClient, BackendError};
use crate::models::application::StatusCacheEntry;
use crate::storage::{read_json, status_cache_key, write_json, KeyValueStore};

pub mod handlers;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("Please enter your application number")]
    EmptyNumber,

    #[error("Application not found. Please check your application number.")]
    NotFound,

    #[error("Request timeout. Please check your connection and try again.")]
    Timeout,

    #[error(
        "Network connection error. Please check your internet connection and try again."
    )]
    Network,

    #[error("Server error: {status} - {body}")]
    Server { status: u16, body: String },

    #[error("Unable to connect to server. Please try again later or contact support.")]
    Unavailable,
}

impl From<BackendError> for TrackerError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound | BackendError::Disabled => TrackerError::NotFound,
            BackendError::Timeout => TrackerError::Timeout,
            BackendError::Network(_) => TrackerError::Network,
            BackendError::Server { status, body } => TrackerError::Server { status, body },
            BackendError::Unauthorized => TrackerError::Server {
                status: 401,
                body: "Unauthorized".to_string(),
            },
            BackendError::Malformed(_) => TrackerError::Unavailable,
        }
    }
}

/// Looks up the status of `application_number`.
///
/// A cached entry is returned without any network traffic. Remote answers are
/// written back to the cache, with `lastUpdated` defaulting to `now`.
pub async fn track_application(
    store: &dyn KeyValueStore,
    backend: &BackendClient,
    application_number: &str,
    now: DateTime<Utc>,
) -> Result<StatusCacheEntry, TrackerError> {
    let number = application_number.trim();
    if number.is_empty() {
        return Err(TrackerError::EmptyNumber);
    }

    let key = status_cache_key(number);
    match read_json::<StatusCacheEntry>(store, &key).await {
        Ok(Some(entry)) => {
            debug!("Status for {number} served from local cache");
            return Ok(entry);
        }
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable status cache for {number}: {e}"),
    }

    let mut entry = backend.application_status(number).await.map_err(|e| {
        warn!("Status lookup for {number} failed: {e}");
        TrackerError::from(e)
    })?;
    info!("Status for {number} fetched from server: {}", entry.status.as_str());

    if entry.application_number.is_empty() {
        entry.application_number = number.to_string();
    }
    if entry.last_updated.is_empty() {
        entry.last_updated = now.to_rfc3339();
    }
    if let Err(e) = write_json(store, &key, &entry).await {
        error!("Failed to cache status for {number}: {e}");
    }

    Ok(entry)
}

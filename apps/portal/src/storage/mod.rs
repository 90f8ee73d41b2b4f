//! Client-side key/value persistence.
//!
//! Mirrors the browser storage the portal was designed around: string keys,
//! string (JSON) values, whole-value overwrites and last-write-wins. Nothing
//! here coordinates between operations.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod file;
#[cfg(test)]
pub mod memory;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

/// In-progress wizard draft.
pub const DRAFT_KEY: &str = "lms_resume_data";
/// Aggregate list of every locally submitted application.
pub const ALL_APPLICATIONS_KEY: &str = "lms_all_applications";
/// Bearer token used for authenticated backend calls.
pub const ADMIN_TOKEN_KEY: &str = "lms_admin_token";
pub const PRIVACY_ACCEPTED_KEY: &str = "lms_privacy_accepted";

const STATUS_CACHE_PREFIX: &str = "lms_app_";

/// Per-application status cache key.
pub fn status_cache_key(application_number: &str) -> String {
    format!("{STATUS_CACHE_PREFIX}{application_number}")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Reads and decodes a JSON value.
///
/// A value that fails to decode is treated as absent and its key is cleared.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Discarding corrupted value under '{key}': {e}");
            store.remove(key).await?;
            Ok(None)
        }
    }
}

pub async fn write_json<T: Serialize + Sync + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

//! Third-party enrichment lookups: pincode → locality, IFSC → bank branch.
//!
//! Both are advisory. A failed lookup leaves the form fields editable and
//! never blocks the wizard.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod handlers;
pub mod pincode;

pub use pincode::{PostalPincodeProvider, ZippopotamProvider};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Administrative area resolved for a pincode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    pub district: String,
    pub state: String,
    pub taluk: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankBranch {
    pub bank_name: String,
    pub branch_name: String,
}

/// One pincode geocoding service.
#[async_trait]
pub trait PincodeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the provider answered but knows no such pincode.
    async fn locate(&self, pincode: &str) -> Result<Option<Locality>, LookupError>;
}

/// Tries each provider in order; the first hit wins and results are never
/// merged.
pub struct PincodeLookup {
    providers: Vec<Arc<dyn PincodeProvider>>,
}

impl PincodeLookup {
    pub fn new(providers: Vec<Arc<dyn PincodeProvider>>) -> Self {
        Self { providers }
    }

    pub fn with_defaults(primary_url: &str, fallback_url: &str, timeout: Duration) -> Self {
        let client = Client::new();
        Self::new(vec![
            Arc::new(PostalPincodeProvider::new(client.clone(), primary_url, timeout)),
            Arc::new(ZippopotamProvider::new(client, fallback_url, timeout)),
        ])
    }

    pub async fn fetch_location(&self, pincode: &str) -> Option<Locality> {
        if pincode.chars().count() != 6 {
            return None;
        }

        for provider in &self.providers {
            match provider.locate(pincode).await {
                Ok(Some(locality)) => {
                    info!("Pincode {pincode} resolved by {}", provider.name());
                    return Some(locality);
                }
                Ok(None) => debug!("{} has no match for pincode {pincode}", provider.name()),
                Err(e) => warn!("{} lookup failed for {pincode}: {e}", provider.name()),
            }
        }

        None
    }
}

/// IFSC → bank/branch via a single public service. No fallback, no caching.
#[derive(Clone)]
pub struct IfscLookup {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl IfscLookup {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// `Ok(None)` for codes too short to look up and for non-2xx answers.
    pub async fn bank_for_ifsc(&self, ifsc: &str) -> Result<Option<BankBranch>, LookupError> {
        if ifsc.chars().count() < 4 {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, ifsc))
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            debug!("IFSC lookup for {ifsc} returned {}", response.status());
            return Ok(None);
        }

        let body: Value = response.json().await?;
        Ok(Some(BankBranch {
            bank_name: text_field(&body, "BANK"),
            branch_name: text_field(&body, "BRANCH"),
        }))
    }
}

pub(crate) fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

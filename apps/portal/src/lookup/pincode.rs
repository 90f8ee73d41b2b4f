use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{text_field, Locality, LookupError, PincodeProvider};

/// India Post directory (`/<pincode>` → `[{Status, PostOffice: [...]}]`).
pub struct PostalPincodeProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl PostalPincodeProvider {
    pub fn new(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl PincodeProvider for PostalPincodeProvider {
    fn name(&self) -> &'static str {
        "postalpincode"
    }

    async fn locate(&self, pincode: &str) -> Result<Option<Locality>, LookupError> {
        let body = get_json(&self.client, &self.base_url, pincode, self.timeout).await?;
        Ok(body.as_ref().and_then(parse_postal_response))
    }
}

/// Zippopotam (`/<pincode>` → `{places: [...]}`).
pub struct ZippopotamProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ZippopotamProvider {
    pub fn new(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl PincodeProvider for ZippopotamProvider {
    fn name(&self) -> &'static str {
        "zippopotam"
    }

    async fn locate(&self, pincode: &str) -> Result<Option<Locality>, LookupError> {
        let body = get_json(&self.client, &self.base_url, pincode, self.timeout).await?;
        Ok(body.as_ref().and_then(parse_zippopotam_response))
    }
}

/// `None` on a non-2xx answer; a 2xx that is not JSON is an error.
async fn get_json(
    client: &Client,
    base_url: &str,
    pincode: &str,
    timeout: Duration,
) -> Result<Option<Value>, LookupError> {
    let response = client
        .get(format!("{base_url}/{pincode}"))
        .header("Accept", "application/json")
        .timeout(timeout)
        .send()
        .await?;

    if !response.status().is_success() {
        return Ok(None);
    }
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| LookupError::Unexpected(format!("body is not JSON: {e}")))
}

fn parse_postal_response(body: &Value) -> Option<Locality> {
    let first = body.get(0)?;
    if first.get("Status").and_then(Value::as_str) != Some("Success") {
        return None;
    }
    let office = first.get("PostOffice")?.get(0)?;

    let block = text_field(office, "Block");
    let taluk = if block.is_empty() {
        text_field(office, "Division")
    } else {
        block
    };

    Some(Locality {
        district: text_field(office, "District"),
        state: text_field(office, "State"),
        taluk,
    })
}

fn parse_zippopotam_response(body: &Value) -> Option<Locality> {
    let place = body.get("places")?.get(0)?;
    let place_name = text_field(place, "place name");

    Some(Locality {
        district: place_name.clone(),
        state: text_field(place, "state"),
        taluk: place_name,
    })
}

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::lookup::{BankBranch, Locality};
use crate::state::AppState;

const LOCATION_FILLED: &str = "Location details auto-filled successfully!";
const LOCATION_MISSING: &str = "Could not auto-fill location details. Please enter manually.";
const BANK_MISSING: &str = "Bank name and branch not found. Please enter manually.";
const BANK_ERROR: &str = "Error fetching bank details. Please try again.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeRequest {
    pub pincode: String,
    /// Values already on the form; kept wherever the lookup has nothing.
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub taluk: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeResponse {
    pub found: bool,
    pub locality: Locality,
    pub message: Option<&'static str>,
}

fn prefer(looked_up: String, current: String) -> String {
    if looked_up.trim().is_empty() {
        current
    } else {
        looked_up
    }
}

/// POST /api/v1/lookup/pincode
pub async fn handle_pincode(
    State(state): State<AppState>,
    Json(req): Json<PincodeRequest>,
) -> Result<Json<PincodeResponse>, AppError> {
    let current = Locality {
        district: req.district,
        state: req.state,
        taluk: req.taluk,
    };

    if req.pincode.chars().count() != 6 {
        return Ok(Json(PincodeResponse {
            found: false,
            locality: current,
            message: None,
        }));
    }

    let response = match state.pincode.fetch_location(&req.pincode).await {
        Some(found) => PincodeResponse {
            found: true,
            locality: Locality {
                district: prefer(found.district, current.district),
                state: prefer(found.state, current.state),
                taluk: prefer(found.taluk, current.taluk),
            },
            message: Some(LOCATION_FILLED),
        },
        None => PincodeResponse {
            found: false,
            locality: current,
            message: Some(LOCATION_MISSING),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct IfscRequest {
    pub ifsc: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IfscResponse {
    pub found: bool,
    #[serde(flatten)]
    pub branch: Option<BankBranch>,
    pub message: Option<String>,
}

/// POST /api/v1/lookup/ifsc
pub async fn handle_ifsc(
    State(state): State<AppState>,
    Json(req): Json<IfscRequest>,
) -> Result<Json<IfscResponse>, AppError> {
    let ifsc = req.ifsc.trim().to_uppercase();
    if ifsc.chars().count() < 4 {
        return Ok(Json(IfscResponse {
            found: false,
            branch: None,
            message: None,
        }));
    }

    let response = match state.ifsc.bank_for_ifsc(&ifsc).await {
        Ok(Some(branch)) => IfscResponse {
            found: true,
            message: Some(format!(
                "Bank name and branch auto-filled: {} - {}",
                branch.bank_name, branch.branch_name
            )),
            branch: Some(branch),
        },
        Ok(None) => IfscResponse {
            found: false,
            branch: None,
            message: Some(BANK_MISSING.to_string()),
        },
        Err(e) => {
            warn!("IFSC lookup for {ifsc} failed: {e}");
            IfscResponse {
                found: false,
                branch: None,
                message: Some(BANK_ERROR.to_string()),
            }
        }
    };
    Ok(Json(response))
}

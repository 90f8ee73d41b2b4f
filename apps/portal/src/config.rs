use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE_URL: &str = "https://api.lmscs.in/api";
const DEFAULT_PINCODE_PRIMARY_URL: &str = "https://api.postalpincode.in/pincode";
const DEFAULT_PINCODE_FALLBACK_URL: &str = "https://api.zippopotam.us/in";
const DEFAULT_IFSC_URL: &str = "https://ifsc.razorpay.com";

/// Whether the portal talks to the remote backend or works from local data only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PortalMode {
    Production,
    Demo,
}

impl PortalMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "development" => Ok(PortalMode::Production),
            "demo" => Ok(PortalMode::Demo),
            other => bail!("PORTAL_MODE must be 'production' or 'demo', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: PortalMode,
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub receipts_dir: PathBuf,
    pub api_timeout: Duration,
    pub lookup_timeout: Duration,
    pub autosave_debounce: Duration,
    pub pincode_primary_url: String,
    pub pincode_fallback_url: String,
    pub ifsc_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let data_dir = PathBuf::from(env_or("DATA_DIR", "./data"));
        let receipts_dir = std::env::var("RECEIPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("receipts"));

        Ok(Config {
            mode: PortalMode::parse(&env_or("PORTAL_MODE", "production"))?,
            api_base_url: env_or("API_BASE_URL", DEFAULT_API_BASE_URL),
            data_dir,
            receipts_dir,
            api_timeout: Duration::from_secs(parse_env("API_TIMEOUT_SECS", 15)?),
            lookup_timeout: Duration::from_secs(parse_env("LOOKUP_TIMEOUT_SECS", 8)?),
            autosave_debounce: Duration::from_millis(parse_env("AUTOSAVE_DEBOUNCE_MS", 2000)?),
            pincode_primary_url: env_or("PINCODE_PRIMARY_URL", DEFAULT_PINCODE_PRIMARY_URL),
            pincode_fallback_url: env_or("PINCODE_FALLBACK_URL", DEFAULT_PINCODE_FALLBACK_URL),
            ifsc_url: env_or("IFSC_URL", DEFAULT_IFSC_URL),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Environment variable '{key}' must be a whole number")),
        Err(_) => Ok(default),
    }
}

/// Named backend operations. Paths are relative to the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Applications,
    Submit,
    // Backend surface the portal does not call itself.
    #[allow(dead_code)]
    AdminChanges,
    ExportExcel,
    #[allow(dead_code)]
    ApplicationsByDate,
    ApplicationStatus,
    UpdateApplication,
    UpdateStatus,
    UpdateComment,
    UpdateOnboardingStatus,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Applications => "/resumebuilder/applications",
            Endpoint::Submit => "/resumebuilder/applications/submit",
            Endpoint::AdminChanges => "/resumebuilder/applications/admin_changes",
            Endpoint::ExportExcel => "/resumebuilder/applications/export",
            Endpoint::ApplicationsByDate => "/resumebuilder/applications/filter",
            Endpoint::ApplicationStatus => "/resumebuilder/application/status",
            Endpoint::UpdateApplication => "/resumebuilder/application/update/application",
            Endpoint::UpdateStatus => "/resumebuilder/application/update/status",
            Endpoint::UpdateComment => "/resumebuilder/application/update/comment",
            Endpoint::UpdateOnboardingStatus => {
                "/resumebuilder/application/update/onBoarding_Status"
            }
        }
    }
}

/// Endpoint resolution plus the runtime demo/production switch.
///
/// Cloning shares the switch, so flipping the mode from one handler is seen
/// by every component holding an `ApiConfig`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    demo: Arc<AtomicBool>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, mode: PortalMode) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            demo: Arc::new(AtomicBool::new(mode == PortalMode::Demo)),
        }
    }

    pub fn mode(&self) -> PortalMode {
        if self.demo.load(Ordering::SeqCst) {
            PortalMode::Demo
        } else {
            PortalMode::Production
        }
    }

    pub fn set_mode(&self, mode: PortalMode) {
        self.demo.store(mode == PortalMode::Demo, Ordering::SeqCst);
    }

    pub fn should_use_api(&self) -> bool {
        self.mode() == PortalMode::Production
    }

    pub fn should_show_sample_data(&self) -> bool {
        self.mode() == PortalMode::Demo
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        if !self.should_use_api() {
            return String::new();
        }
        format!("{}{}", self.base_url, endpoint.path())
    }
}

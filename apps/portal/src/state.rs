use std::sync::Arc;

use crate::admin::AdminDashboard;
use crate::backend::BackendClient;
use crate::config::{ApiConfig, Config};
use crate::lookup::{IfscLookup, PincodeLookup};
use crate::receipt::ReceiptWriter;
use crate::storage::KeyValueStore;
use crate::wizard::WizardController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Local key/value store standing in for browser storage.
    pub store: Arc<dyn KeyValueStore>,
    pub backend: BackendClient,
    pub wizard: Arc<WizardController>,
    /// Holds the admin's loaded application list between requests.
    pub dashboard: Arc<AdminDashboard>,
    pub pincode: Arc<PincodeLookup>,
    pub ifsc: IfscLookup,
    pub receipts: ReceiptWriter,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let api = ApiConfig::new(config.api_base_url.clone(), config.mode);
        let backend = BackendClient::new(api, config.api_timeout);

        Self {
            wizard: Arc::new(WizardController::new(
                Arc::clone(&store),
                config.autosave_debounce,
            )),
            dashboard: Arc::new(AdminDashboard::new(Arc::clone(&store), backend.clone())),
            pincode: Arc::new(PincodeLookup::with_defaults(
                &config.pincode_primary_url,
                &config.pincode_fallback_url,
                config.lookup_timeout,
            )),
            ifsc: IfscLookup::new(&config.ifsc_url, config.lookup_timeout),
            receipts: ReceiptWriter::new(config.receipts_dir.clone()),
            backend,
            store,
        }
    }
}

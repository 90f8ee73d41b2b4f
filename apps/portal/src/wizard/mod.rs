//! Form wizard controller: current step plus the accumulated draft.
//!
//! The draft lives in the local store under one key and is overwritten whole
//! on every save. Store failures are logged and otherwise ignored.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::application::full_name;
use crate::storage::{read_json, write_json, KeyValueStore, DRAFT_KEY};
use crate::util::dates::detailed_age_from_str;

pub mod autosave;
pub mod handlers;
pub mod steps;
pub mod submission;

use autosave::Debouncer;
use steps::{Step, ValidationOutcome, FIRST_STEP, LAST_STEP};

pub const DEFAULT_VENDOR_NAME: &str = "LMS Corporate Services PVT LTD";

/// Identifier fields entered in upper case whatever the user typed.
const UPPERCASE_FIELDS: [&str; 3] = ["pan", "ifsc", "employeeId"];

fn first_step() -> u8 {
    FIRST_STEP
}

/// In-progress wizard state. `data` holds the partial application in its
/// camelCase JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    #[serde(default = "first_step")]
    pub current_step: u8,
    /// Reused across submission retries of this draft.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_key: Option<Uuid>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            current_step: FIRST_STEP,
            submission_key: None,
            data: Map::new(),
        }
    }
}

impl FormDraft {
    pub fn step(&self) -> Step {
        Step::from_number(self.current_step)
    }

    /// Overlays `step_data` and recomputes the derived fields.
    pub fn merge(&mut self, step_data: Map<String, Value>, today: NaiveDate) {
        self.data.extend(uppercase_codes(step_data));
        self.refresh_derived(today);
    }

    fn text(&self, key: &str) -> String {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn refresh_derived(&mut self, today: NaiveDate) {
        if !self.data.contains_key("vendorName") {
            self.data
                .insert("vendorName".to_string(), Value::from(DEFAULT_VENDOR_NAME));
        }

        let has_name = ["firstName", "middleName", "lastName"]
            .iter()
            .any(|key| self.data.contains_key(*key));
        if has_name {
            let name = full_name(
                &self.text("firstName"),
                &self.text("middleName"),
                &self.text("lastName"),
            );
            self.data.insert("fullName".to_string(), Value::from(name));
        }

        if self.data.contains_key("dob") {
            let age = detailed_age_from_str(&self.text("dob"), today);
            self.data.insert("age".to_string(), Value::from(age));
        }

        if self.text("lmsExperience") == "No" {
            self.data.insert("employeeId".to_string(), Value::from(""));
        }
    }
}

pub struct WizardController {
    store: Arc<dyn KeyValueStore>,
    autosave: Debouncer,
}

impl WizardController {
    pub fn new(store: Arc<dyn KeyValueStore>, debounce: Duration) -> Self {
        Self {
            store,
            autosave: Debouncer::new(debounce),
        }
    }

    /// The stored draft, or a fresh one when absent or unreadable.
    pub async fn load(&self) -> FormDraft {
        load_draft(self.store.as_ref()).await
    }

    /// Validates the current step over the merged data; on success moves one
    /// step forward (never past the last) and persists.
    pub async fn advance(
        &self,
        step_data: Map<String, Value>,
        today: NaiveDate,
    ) -> Result<FormDraft, ValidationOutcome> {
        let mut draft = self.load().await;
        let step_data = uppercase_codes(step_data);

        let mut candidate = draft.data.clone();
        candidate.extend(step_data.clone());
        let outcome = draft.step().validate(&candidate);
        if !outcome.valid {
            debug!(
                "Step {} blocked by {} field error(s)",
                draft.current_step,
                outcome.field_errors.len()
            );
            return Err(outcome);
        }

        self.autosave.cancel().await;
        draft.merge(step_data, today);
        draft.current_step = draft.current_step.saturating_add(1).clamp(FIRST_STEP, LAST_STEP);
        persist_draft(self.store.as_ref(), &draft).await;

        info!("Wizard advanced to step {}", draft.current_step);
        Ok(draft)
    }

    /// Moves one step back (never before the first). Unsaved step input is
    /// discarded; only the step number is written.
    pub async fn retreat(&self) -> FormDraft {
        self.autosave.cancel().await;
        let mut draft = self.load().await;
        draft.current_step = draft
            .current_step
            .saturating_sub(1)
            .clamp(FIRST_STEP, LAST_STEP);
        persist_draft(self.store.as_ref(), &draft).await;
        draft
    }

    /// Schedules a debounced save of in-progress step input.
    pub async fn autosave(&self, step_data: Map<String, Value>, today: NaiveDate) {
        let store = Arc::clone(&self.store);
        self.autosave
            .schedule(async move {
                let mut draft = load_draft(store.as_ref()).await;
                draft.merge(step_data, today);
                persist_draft(store.as_ref(), &draft).await;
                debug!("Autosaved draft at step {}", draft.current_step);
            })
            .await;
    }

    /// Returns the draft together with its submission key, creating and
    /// persisting the key on first use.
    pub async fn prepare_submission(&self) -> (FormDraft, Uuid) {
        let mut draft = self.load().await;
        let key = match draft.submission_key {
            Some(key) => key,
            None => {
                let key = Uuid::new_v4();
                draft.submission_key = Some(key);
                persist_draft(self.store.as_ref(), &draft).await;
                key
            }
        };
        (draft, key)
    }

    pub async fn clear(&self) {
        self.autosave.cancel().await;
        if let Err(e) = self.store.remove(DRAFT_KEY).await {
            error!("Failed to clear draft: {e}");
        }
    }
}

fn uppercase_codes(mut step_data: Map<String, Value>) -> Map<String, Value> {
    for key in UPPERCASE_FIELDS {
        if let Some(Value::String(code)) = step_data.get_mut(key) {
            *code = code.to_uppercase();
        }
    }
    step_data
}

async fn load_draft(store: &dyn KeyValueStore) -> FormDraft {
    match read_json::<FormDraft>(store, DRAFT_KEY).await {
        Ok(Some(draft)) => draft,
        Ok(None) => FormDraft::default(),
        Err(e) => {
            error!("Failed to read draft, starting fresh: {e}");
            FormDraft::default()
        }
    }
}

async fn persist_draft(store: &dyn KeyValueStore, draft: &FormDraft) {
    if let Err(e) = write_json(store, DRAFT_KEY, draft).await {
        error!("Failed to save draft: {e}");
    }
}

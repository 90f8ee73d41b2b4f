use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    Reviewing,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Reviewing => "Reviewing",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Backend and stored records are not trusted to spell statuses
    /// consistently; anything unrecognised reads as `Submitted`.
    fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            if !raw.trim().is_empty() {
                warn!("Unknown application status '{raw}', treating as Submitted");
            }
            ApplicationStatus::Submitted
        })
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(format!("Unknown application status '{s}'")),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(ApplicationStatus::parse_lenient(raw.as_str().unwrap_or_default()))
    }
}

/// Post-approval completion flag, independent of the review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnboardingStatus {
    Done,
    #[default]
    NotDone,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::Done => "Done",
            OnboardingStatus::NotDone => "Not Done",
        }
    }
}

impl FromStr for OnboardingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "done" => Ok(OnboardingStatus::Done),
            "not done" => Ok(OnboardingStatus::NotDone),
            _ => Err(format!("Unknown onboarding status '{s}'")),
        }
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OnboardingStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OnboardingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        // Anything other than "Done" counts as pending.
        Ok(if raw.as_str().is_some_and(|s| s.trim().eq_ignore_ascii_case("done")) {
            OnboardingStatus::Done
        } else {
            OnboardingStatus::NotDone
        })
    }
}

/// Local ids are epoch milliseconds; backend ids may be strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationId::Numeric(n) => write!(f, "{n}"),
            ApplicationId::Text(s) => f.write_str(s),
        }
    }
}

/// Accepts strings, numbers, booleans and null for text fields.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// A candidate's application record.
///
/// Field names follow the backend's camelCase JSON. Keys this struct does not
/// know are carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ApplicationId>,
    #[serde(deserialize_with = "lenient_string")]
    pub application_number: String,

    // Personal
    #[serde(deserialize_with = "lenient_string")]
    pub vendor_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub middle_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_string")]
    pub dob: String,
    #[serde(deserialize_with = "lenient_string")]
    pub age: String,
    #[serde(deserialize_with = "lenient_string")]
    pub aadhaar: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pan: String,

    // Contact
    #[serde(deserialize_with = "lenient_string")]
    pub contact: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub father_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub mother_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub emergency_contact_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub emergency_contact_no: String,
    #[serde(deserialize_with = "lenient_string")]
    pub blood_group: String,
    #[serde(deserialize_with = "lenient_string")]
    pub marital_status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub marriage_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub spouse_name: String,

    // Address
    #[serde(deserialize_with = "lenient_string")]
    pub village: String,
    #[serde(deserialize_with = "lenient_string")]
    pub taluk: String,
    #[serde(deserialize_with = "lenient_string")]
    pub district: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,

    // Education & bank
    #[serde(deserialize_with = "lenient_string")]
    pub education: String,
    #[serde(deserialize_with = "lenient_string")]
    pub specialization: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub account_no: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ifsc: String,
    #[serde(deserialize_with = "lenient_string")]
    pub bank_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub branch_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub lms_experience: String,
    #[serde(deserialize_with = "lenient_string")]
    pub employee_id: String,

    // Review
    pub status: ApplicationStatus,
    pub onboarding_status: OnboardingStatus,
    #[serde(deserialize_with = "lenient_string")]
    pub comments: String,
    #[serde(deserialize_with = "lenient_string")]
    pub submission_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_updated: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Application {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Stored full name, or the name parts when the record predates it.
    pub fn candidate_name(&self) -> String {
        if self.full_name.trim().is_empty() {
            full_name(&self.first_name, &self.middle_name, &self.last_name)
        } else {
            self.full_name.clone()
        }
    }

    /// True when `reference` is this record's application number or id.
    pub fn matches_reference(&self, reference: &str) -> bool {
        (!self.application_number.is_empty() && self.application_number == reference)
            || self.id.as_ref().is_some_and(|id| id.to_string() == reference)
    }

    /// Same record if the application numbers agree or both carry the same id.
    pub fn same_record(&self, other: &Application) -> bool {
        let same_number = !self.application_number.is_empty()
            && self.application_number == other.application_number;
        let same_id = matches!((&self.id, &other.id), (Some(a), Some(b)) if a == b);
        same_number || same_id
    }

    /// Overlays `fields` onto this record, keeping everything not mentioned.
    pub fn merge_fields(&mut self, fields: &Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut value = self.to_value()?;
        if let Value::Object(current) = &mut value {
            for (key, field) in fields {
                current.insert(key.clone(), field.clone());
            }
        }
        *self = Application::from_value(value)?;
        Ok(())
    }

    pub fn status_cache_entry(&self) -> StatusCacheEntry {
        StatusCacheEntry {
            application_number: self.application_number.clone(),
            candidate_name: self.candidate_name(),
            status: self.status,
            submission_date: self.submission_date.clone(),
            last_updated: self.last_updated.clone(),
            comments: self.comments.clone(),
            onboarding_status: Some(self.onboarding_status),
        }
    }
}

/// Joins the non-blank name parts with single spaces.
pub fn full_name(first: &str, middle: &str, last: &str) -> String {
    [first, middle, last]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduced per-application record kept for the tracker's offline lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusCacheEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub application_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub candidate_name: String,
    pub status: ApplicationStatus,
    #[serde(deserialize_with = "lenient_string")]
    pub submission_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_updated: String,
    #[serde(deserialize_with = "lenient_string")]
    pub comments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_status: Option<OnboardingStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_name_omits_empty_parts() {
        assert_eq!(full_name("John", "", "Smith"), "John Smith");
        assert_eq!(full_name(" John ", "Michael", "Smith"), "John Michael Smith");
        assert_eq!(full_name("", "  ", ""), "");
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        let app = Application::from_value(json!({ "status": "APPROVED" })).unwrap();
        assert_eq!(app.status, ApplicationStatus::Approved);
        assert_eq!(app.to_value().unwrap()["status"], "Approved");
    }

    #[test]
    fn test_unknown_status_reads_as_submitted() {
        let app = Application::from_value(json!({ "status": "On Hold" })).unwrap();
        assert_eq!(app.status, ApplicationStatus::Submitted);
    }

    #[test]
    fn test_non_string_status_does_not_fail_the_record() {
        let app = Application::from_value(json!({
            "applicationNumber": "A1",
            "status": 3,
            "onboardingStatus": null
        }))
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Submitted);
        assert_eq!(app.onboarding_status, OnboardingStatus::NotDone);
    }

    #[test]
    fn test_onboarding_anything_but_done_is_pending() {
        let done = Application::from_value(json!({ "onboardingStatus": "Done" })).unwrap();
        let other = Application::from_value(json!({ "onboardingStatus": "maybe" })).unwrap();
        assert_eq!(done.onboarding_status, OnboardingStatus::Done);
        assert_eq!(other.onboarding_status, OnboardingStatus::NotDone);
        assert_eq!(other.to_value().unwrap()["onboardingStatus"], "Not Done");
    }

    #[test]
    fn test_onboarding_input_parses_strictly() {
        assert_eq!("done".parse::<OnboardingStatus>(), Ok(OnboardingStatus::Done));
        assert_eq!(
            " Not Done ".parse::<OnboardingStatus>(),
            Ok(OnboardingStatus::NotDone)
        );
        assert!("bogus".parse::<OnboardingStatus>().is_err());
    }

    #[test]
    fn test_lenient_fields_and_extra_keys_survive() {
        let app = Application::from_value(json!({
            "applicationNumber": 23876957639u64,
            "pincode": 400001,
            "email": null,
            "_id": "665f0c",
            "createdBy": "portal"
        }))
        .unwrap();

        assert_eq!(app.application_number, "23876957639");
        assert_eq!(app.pincode, "400001");
        assert_eq!(app.email, "");
        assert_eq!(app.extra["_id"], "665f0c");

        let value = app.to_value().unwrap();
        assert_eq!(value["createdBy"], "portal");
    }

    #[test]
    fn test_matches_reference_by_number_or_id() {
        let app = Application {
            id: Some(ApplicationId::Numeric(1700000000000)),
            application_number: "A1".to_string(),
            ..Default::default()
        };
        assert!(app.matches_reference("A1"));
        assert!(app.matches_reference("1700000000000"));
        assert!(!app.matches_reference("A2"));
    }

    #[test]
    fn test_same_record_requires_a_real_identifier() {
        let blank = Application::default();
        assert!(!blank.same_record(&Application::default()));

        let a = Application {
            application_number: "A1".to_string(),
            ..Default::default()
        };
        let b = Application {
            application_number: "A1".to_string(),
            first_name: "Changed".to_string(),
            ..Default::default()
        };
        assert!(a.same_record(&b));
    }

    #[test]
    fn test_merge_fields_overlays_values() {
        let mut app = Application {
            application_number: "A1".to_string(),
            district: "Old".to_string(),
            ..Default::default()
        };
        let mut fields = Map::new();
        fields.insert("district".to_string(), json!("New"));
        fields.insert("status".to_string(), json!("reviewing"));
        app.merge_fields(&fields).unwrap();

        assert_eq!(app.district, "New");
        assert_eq!(app.status, ApplicationStatus::Reviewing);
        assert_eq!(app.application_number, "A1");
    }

    #[test]
    fn test_cache_entry_uses_derived_name_when_missing() {
        let app = Application {
            application_number: "A1".to_string(),
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            ..Default::default()
        };
        let entry = app.status_cache_entry();
        assert_eq!(entry.candidate_name, "Sarah Johnson");
        assert_eq!(entry.onboarding_status, Some(OnboardingStatus::NotDone));
    }
}

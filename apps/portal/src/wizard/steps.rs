//! Field validation for the five wizard steps.
//!
//! Each step checks only the fields it owns. The review step re-runs every
//! other step over the whole draft before anything is sent upstream.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

static AADHAAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));
static PAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid regex"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));
static PINCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid regex"));
static IFSC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("valid regex"));
static ACCOUNT_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9,18}$").expect("valid regex"));
static EMPLOYEE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{6,12}$").expect("valid regex"));

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Personal,
    Contact,
    Address,
    EducationBank,
    Review,
}

impl Step {
    /// Out-of-range numbers clamp to the nearest step.
    pub fn from_number(step: u8) -> Self {
        match step {
            0 | 1 => Step::Personal,
            2 => Step::Contact,
            3 => Step::Address,
            4 => Step::EducationBank,
            _ => Step::Review,
        }
    }

    pub fn validate(&self, data: &Map<String, Value>) -> ValidationOutcome {
        let fields = Fields(data);
        let mut errors = FieldErrors::default();
        match self {
            Step::Personal => validate_personal(&fields, &mut errors),
            Step::Contact => validate_contact(&fields, &mut errors),
            Step::Address => validate_address(&fields, &mut errors),
            Step::EducationBank => validate_education_bank(&fields, &mut errors),
            Step::Review => {
                validate_personal(&fields, &mut errors);
                validate_contact(&fields, &mut errors);
                validate_address(&fields, &mut errors);
                validate_education_bank(&fields, &mut errors);
            }
        }
        errors.into_outcome()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    pub field_errors: BTreeMap<String, String>,
}

#[derive(Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    fn into_outcome(self) -> ValidationOutcome {
        ValidationOutcome {
            valid: self.0.is_empty(),
            field_errors: self.0,
        }
    }
}

/// Read-only view over draft values; numbers read as their decimal text.
struct Fields<'a>(&'a Map<String, Value>);

impl Fields<'_> {
    fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    fn blank(&self, key: &str) -> bool {
        self.text(key).trim().is_empty()
    }

    fn require(&self, key: &str, message: &str, errors: &mut FieldErrors) {
        if self.blank(key) {
            errors.add(key, message);
        }
    }

    /// Required field that must also satisfy `check`.
    fn require_valid(
        &self,
        key: &str,
        missing: &str,
        invalid: &str,
        check: impl Fn(&str) -> bool,
        errors: &mut FieldErrors,
    ) {
        let value = self.text(key);
        if value.trim().is_empty() {
            errors.add(key, missing);
        } else if !check(&value) {
            errors.add(key, invalid);
        }
    }
}

pub fn is_valid_aadhaar(value: &str) -> bool {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    AADHAAR.is_match(&digits)
}

pub fn is_valid_pan(value: &str) -> bool {
    PAN.is_match(&value.to_uppercase())
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_valid_pincode(value: &str) -> bool {
    PINCODE.is_match(value)
}

pub fn is_valid_ifsc(value: &str) -> bool {
    IFSC.is_match(value)
}

pub fn is_valid_account_no(value: &str) -> bool {
    ACCOUNT_NO.is_match(value)
}

pub fn is_valid_employee_id(value: &str) -> bool {
    EMPLOYEE_ID.is_match(value)
}

fn validate_personal(f: &Fields, errors: &mut FieldErrors) {
    f.require("firstName", "First name is required", errors);
    f.require("lastName", "Last name is required", errors);
    f.require("gender", "Gender is required", errors);
    f.require("dob", "Date of birth is required", errors);
    f.require_valid(
        "aadhaar",
        "Aadhaar number is required",
        "Invalid Aadhaar number",
        is_valid_aadhaar,
        errors,
    );
    f.require_valid(
        "pan",
        "PAN number is required",
        "Invalid PAN number format",
        is_valid_pan,
        errors,
    );
}

fn validate_contact(f: &Fields, errors: &mut FieldErrors) {
    f.require_valid(
        "contact",
        "Contact number is required",
        "Invalid contact number",
        is_valid_phone,
        errors,
    );
    f.require_valid(
        "email",
        "Email is required",
        "Invalid email format",
        is_valid_email,
        errors,
    );
    f.require("fatherName", "Father's name is required", errors);
    f.require("motherName", "Mother's name is required", errors);
    f.require(
        "emergencyContactName",
        "Emergency contact name is required",
        errors,
    );
    f.require_valid(
        "emergencyContactNo",
        "Emergency contact number is required",
        "Invalid emergency contact number",
        is_valid_phone,
        errors,
    );
    f.require("bloodGroup", "Blood group is required", errors);
    f.require("maritalStatus", "Marital status is required", errors);

    if f.text("maritalStatus") == "Married" {
        f.require("marriageDate", "Marriage date is required", errors);
        f.require("spouseName", "Spouse name is required", errors);
    }
}

fn validate_address(f: &Fields, errors: &mut FieldErrors) {
    f.require("village", "Village/City is required", errors);
    f.require("taluk", "Taluk is required", errors);
    f.require("district", "District is required", errors);
    f.require("state", "State is required", errors);
    f.require_valid(
        "pincode",
        "Pincode is required",
        "Invalid pincode format",
        is_valid_pincode,
        errors,
    );
}

fn validate_education_bank(f: &Fields, errors: &mut FieldErrors) {
    f.require("education", "Education level is required", errors);
    f.require("specialization", "Specialization is required", errors);
    f.require("year", "Year is required", errors);
    f.require_valid(
        "accountNo",
        "Account number is required",
        "Invalid account number format",
        is_valid_account_no,
        errors,
    );
    f.require_valid(
        "ifsc",
        "IFSC code is required",
        "Invalid IFSC code format",
        is_valid_ifsc,
        errors,
    );
    f.require("bankName", "Bank name is required", errors);
    f.require("branchName", "Branch name is required", errors);
    f.require("lmsExperience", "LMS experience is required", errors);

    if f.text("lmsExperience") == "Yes" {
        f.require_valid(
            "employeeId",
            "Employee ID is required for experienced candidates",
            "Employee ID must be 6-12 characters (letters and numbers only)",
            is_valid_employee_id,
            errors,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    fn personal() -> Map<String, Value> {
        map(json!({
            "firstName": "John",
            "middleName": "",
            "lastName": "Smith",
            "gender": "Male",
            "dob": "1995-05-15",
            "aadhaar": "4353 5345 3433",
            "pan": "abcde1234f"
        }))
    }

    fn contact() -> Map<String, Value> {
        map(json!({
            "contact": "9876543210",
            "email": "john.smith@email.com",
            "fatherName": "Robert Smith",
            "motherName": "Mary Smith",
            "emergencyContactName": "Jane Smith",
            "emergencyContactNo": "9876543211",
            "bloodGroup": "O+",
            "maritalStatus": "Single"
        }))
    }

    fn education_bank() -> Map<String, Value> {
        map(json!({
            "education": "Degree",
            "specialization": "Computer Science",
            "year": 2018,
            "accountNo": "1234567890123456",
            "ifsc": "SBIN0001234",
            "bankName": "State Bank of India",
            "branchName": "Main Branch",
            "lmsExperience": "No"
        }))
    }

    #[test]
    fn test_aadhaar_accepts_twelve_digits_with_spaces() {
        assert!(is_valid_aadhaar("435353453433"));
        assert!(is_valid_aadhaar("4353 5345 3433"));
        assert!(!is_valid_aadhaar("43535345343"));
        assert!(!is_valid_aadhaar("4353534534331"));
        assert!(!is_valid_aadhaar("43535345343a"));
    }

    #[test]
    fn test_pan_is_case_insensitive() {
        assert!(is_valid_pan("ABCDE1234F"));
        assert!(is_valid_pan("abcde1234f"));
        assert!(!is_valid_pan("ABCD1234F"));
        assert!(!is_valid_pan("ABCDE12345"));
    }

    #[test]
    fn test_phone_must_start_six_to_nine() {
        assert!(is_valid_phone("6123456789"));
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("5876543210"));
        assert!(!is_valid_phone("987654321"));
    }

    #[test]
    fn test_ifsc_fifth_character_is_zero() {
        assert!(is_valid_ifsc("HDFC0001234"));
        assert!(!is_valid_ifsc("HDFC1001234"));
        assert!(!is_valid_ifsc("hdfc0001234"));
    }

    #[test]
    fn test_account_and_employee_id_lengths() {
        assert!(is_valid_account_no("123456789"));
        assert!(!is_valid_account_no("12345678"));
        assert!(!is_valid_account_no("1234567890123456789"));
        assert!(is_valid_employee_id("LMS2019001"));
        assert!(!is_valid_employee_id("LMS1"));
        assert!(!is_valid_employee_id("lms2019001"));
    }

    #[test]
    fn test_personal_step_passes() {
        let outcome = Step::Personal.validate(&personal());
        assert!(outcome.valid, "{:?}", outcome.field_errors);
    }

    #[test]
    fn test_personal_step_reports_each_field() {
        let outcome = Step::Personal.validate(&map(json!({ "aadhaar": "123", "pan": "" })));
        assert!(!outcome.valid);
        assert_eq!(outcome.field_errors["aadhaar"], "Invalid Aadhaar number");
        assert_eq!(outcome.field_errors["pan"], "PAN number is required");
        assert_eq!(outcome.field_errors["firstName"], "First name is required");
        assert!(!outcome.field_errors.contains_key("middleName"));
    }

    #[test]
    fn test_married_requires_spouse_details() {
        let mut data = contact();
        data.insert("maritalStatus".to_string(), json!("Married"));
        let outcome = Step::Contact.validate(&data);
        assert_eq!(outcome.field_errors["marriageDate"], "Marriage date is required");
        assert_eq!(outcome.field_errors["spouseName"], "Spouse name is required");

        assert!(Step::Contact.validate(&contact()).valid);
    }

    #[test]
    fn test_address_pincode_format() {
        let data = map(json!({
            "village": "Springfield",
            "taluk": "Central",
            "district": "Metro",
            "state": "Maharashtra",
            "pincode": "40001"
        }));
        let outcome = Step::Address.validate(&data);
        assert_eq!(outcome.field_errors.len(), 1);
        assert_eq!(outcome.field_errors["pincode"], "Invalid pincode format");
    }

    #[test]
    fn test_experienced_candidate_needs_employee_id() {
        let mut data = education_bank();
        assert!(Step::EducationBank.validate(&data).valid);

        data.insert("lmsExperience".to_string(), json!("Yes"));
        let outcome = Step::EducationBank.validate(&data);
        assert_eq!(
            outcome.field_errors["employeeId"],
            "Employee ID is required for experienced candidates"
        );
    }

    #[test]
    fn test_review_runs_every_step() {
        let mut all = personal();
        all.extend(contact());
        all.extend(education_bank());
        let outcome = Step::Review.validate(&all);
        assert!(!outcome.valid);
        assert!(outcome.field_errors.contains_key("village"));
        assert!(!outcome.field_errors.contains_key("firstName"));
    }

    #[test]
    fn test_from_number_clamps() {
        assert_eq!(Step::from_number(0), Step::Personal);
        assert_eq!(Step::from_number(4), Step::EducationBank);
        assert_eq!(Step::from_number(9), Step::Review);
    }
}

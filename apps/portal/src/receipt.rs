//! Printable HTML application receipt.
//!
//! The receipt is plain HTML meant to be opened in a browser and printed to
//! PDF; nothing here produces binary PDF.

use std::path::{Path, PathBuf};

use askama::Template;
use thiserror::Error;
use tracing::info;

use crate::models::application::Application;
use crate::util::dates::format_to_display;

const COMPANY_NAME: &str = "LMS Corporate Services";

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Receipt template failed: {0}")]
    Render(#[from] askama::Error),

    #[error("Application has no number to name the receipt after")]
    MissingNumber,
}

#[derive(Debug, Clone)]
pub struct ReceiptWriter {
    dir: PathBuf,
}

impl ReceiptWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renders and writes `LMS_Application_Receipt_<number>.html`.
    pub async fn write(&self, application: &Application) -> Result<PathBuf, ReceiptError> {
        let number = file_safe(&application.application_number);
        if number.is_empty() {
            return Err(ReceiptError::MissingNumber);
        }

        let html = render_receipt(application)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self
            .dir
            .join(format!("LMS_Application_Receipt_{number}.html"));
        tokio::fs::write(&path, html).await?;

        info!("Receipt written to {}", path.display());
        Ok(path)
    }
}

fn file_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

struct Row<'a> {
    label: &'a str,
    value: String,
}

struct Section<'a> {
    title: &'a str,
    rows: Vec<Row<'a>>,
}

impl<'a> Section<'a> {
    /// Blank values are left off the receipt.
    fn new(title: &'a str, rows: Vec<(&'a str, String)>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(label, value)| Row { label, value })
            .collect();
        Self { title, rows }
    }
}

#[derive(Template)]
#[template(path = "receipt.html")]
struct ReceiptTemplate<'a> {
    company: &'a str,
    sections: Vec<Section<'a>>,
}

pub fn render_receipt(app: &Application) -> Result<String, askama::Error> {
    let sections = vec![
        Section::new(
            "Application",
            vec![
                ("Application Number", app.application_number.clone()),
                ("Submission Date", app.submission_date.clone()),
                ("Status", app.status.to_string()),
                ("Vendor Name", app.vendor_name.clone()),
            ],
        ),
        Section::new(
            "Personal Information",
            vec![
                ("Full Name", app.candidate_name()),
                ("Gender", app.gender.clone()),
                ("Date of Birth", format_to_display(&app.dob)),
                ("Age", app.age.clone()),
                ("Aadhaar Number", app.aadhaar.clone()),
                ("PAN Number", app.pan.clone()),
            ],
        ),
        Section::new(
            "Contact Details",
            vec![
                ("Contact Number", app.contact.clone()),
                ("Email", app.email.clone()),
                ("Father's Name", app.father_name.clone()),
                ("Mother's Name", app.mother_name.clone()),
                ("Emergency Contact", app.emergency_contact_name.clone()),
                ("Emergency Contact No", app.emergency_contact_no.clone()),
                ("Blood Group", app.blood_group.clone()),
                ("Marital Status", app.marital_status.clone()),
                ("Marriage Date", format_to_display(&app.marriage_date)),
                ("Spouse Name", app.spouse_name.clone()),
            ],
        ),
        Section::new(
            "Address",
            vec![
                ("Village/City", app.village.clone()),
                ("Taluk", app.taluk.clone()),
                ("District", app.district.clone()),
                ("State", app.state.clone()),
                ("Pincode", app.pincode.clone()),
            ],
        ),
        Section::new(
            "Education & Bank Details",
            vec![
                ("Education", app.education.clone()),
                ("Specialization", app.specialization.clone()),
                ("Year", app.year.clone()),
                ("Account Number", app.account_no.clone()),
                ("IFSC Code", app.ifsc.clone()),
                ("Bank Name", app.bank_name.clone()),
                ("Branch Name", app.branch_name.clone()),
                ("LMS Experience", app.lms_experience.clone()),
                ("Employee ID", app.employee_id.clone()),
            ],
        ),
    ];

    ReceiptTemplate {
        company: COMPANY_NAME,
        sections,
    }
    .render()
}

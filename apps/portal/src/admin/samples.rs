//! Fixed sample records shown on an empty dashboard in demo mode.

use crate::models::application::{
    Application, ApplicationId, ApplicationStatus, OnboardingStatus,
};
use crate::wizard::DEFAULT_VENDOR_NAME;

fn s(value: &str) -> String {
    value.to_string()
}

/// The two demo applications, both stamped with `last_updated`.
pub fn sample_applications(last_updated: &str) -> Vec<Application> {
    vec![
        Application {
            id: Some(ApplicationId::Numeric(1)),
            application_number: s("23876957639"),
            vendor_name: s(DEFAULT_VENDOR_NAME),
            first_name: s("John"),
            middle_name: s("Michael"),
            last_name: s("Smith"),
            full_name: s("John Michael Smith"),
            gender: s("Male"),
            dob: s("1995-05-15"),
            age: s("28 years, 4 months, 15 days"),
            aadhaar: s("435353453433"),
            pan: s("ABCDE1234F"),
            contact: s("9876543210"),
            email: s("john.smith@email.com"),
            father_name: s("Robert Smith"),
            mother_name: s("Mary Smith"),
            emergency_contact_name: s("Jane Smith"),
            emergency_contact_no: s("9876543211"),
            blood_group: s("O+"),
            marital_status: s("Single"),
            village: s("Springfield"),
            taluk: s("Central District"),
            district: s("Metro District"),
            state: s("Maharashtra"),
            pincode: s("400001"),
            education: s("Degree"),
            specialization: s("Computer Science"),
            year: s("2018"),
            account_no: s("1234567890123456"),
            ifsc: s("SBIN0001234"),
            bank_name: s("State Bank of India"),
            branch_name: s("Main Branch"),
            lms_experience: s("No"),
            status: ApplicationStatus::Reviewing,
            onboarding_status: OnboardingStatus::NotDone,
            submission_date: s("21/09/2023"),
            last_updated: s(last_updated),
            ..Default::default()
        },
        Application {
            id: Some(ApplicationId::Numeric(2)),
            application_number: s("23876957640"),
            vendor_name: s(DEFAULT_VENDOR_NAME),
            first_name: s("Sarah"),
            last_name: s("Johnson"),
            full_name: s("Sarah Johnson"),
            gender: s("Female"),
            dob: s("1992-08-20"),
            age: s("31 years, 2 months, 10 days"),
            aadhaar: s("435353453434"),
            pan: s("FGHIJ5678K"),
            contact: s("9876543212"),
            email: s("sarah.john.com@email.com"),
            father_name: s("Michael Johnson"),
            mother_name: s("Linda Johnson"),
            emergency_contact_name: s("David Johnson"),
            emergency_contact_no: s("9876543213"),
            blood_group: s("A+"),
            marital_status: s("Married"),
            marriage_date: s("2020-02-15"),
            spouse_name: s("Mark Wilson"),
            village: s("Riverside"),
            taluk: s("North District"),
            district: s("River District"),
            state: s("Karnataka"),
            pincode: s("560001"),
            education: s("Master's"),
            specialization: s("Business Administration"),
            year: s("2015"),
            account_no: s("2345678901234567"),
            ifsc: s("HDFC0001234"),
            bank_name: s("HDFC Bank"),
            branch_name: s("Corporate Branch"),
            lms_experience: s("Yes"),
            employee_id: s("LMS2019001"),
            status: ApplicationStatus::Approved,
            onboarding_status: OnboardingStatus::Done,
            comments: s("Documents verified successfully"),
            submission_date: s("22/09/2023"),
            last_updated: s(last_updated),
            ..Default::default()
        },
    ]
}

use chrono::NaiveDate;
use serde::Serialize;

use crate::backend::{CustomDateRange, ExportRequest};
use crate::models::application::{Application, ApplicationStatus, OnboardingStatus};
use crate::util::dates::{format_for_api, parse_record_date};

/// Submission-date filter applied to the dashboard list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    /// Inclusive range. Behaves as `All` unless both ends are set.
    Custom {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateFilter {
    /// Builds a filter from its query form (`All`, `Today`, `Custom`).
    /// Unknown names fall back to `All`; unparseable bounds count as unset.
    pub fn from_query(name: Option<&str>, from: Option<&str>, to: Option<&str>) -> Self {
        let bound = |value: Option<&str>| value.and_then(parse_record_date);
        match name.map(str::trim) {
            Some(n) if n.eq_ignore_ascii_case("today") => DateFilter::Today,
            Some(n) if n.eq_ignore_ascii_case("custom") => DateFilter::Custom {
                from: bound(from),
                to: bound(to),
            },
            _ => DateFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateFilter::All => "All",
            DateFilter::Today => "Today",
            DateFilter::Custom { .. } => "Custom",
        }
    }

    /// Records whose submission date passes the filter. Records with an
    /// unreadable date only pass `All`.
    pub fn apply(&self, applications: &[Application], today: NaiveDate) -> Vec<Application> {
        let keep = |app: &Application| -> bool {
            match *self {
                DateFilter::All | DateFilter::Custom { from: None, .. } => true,
                DateFilter::Custom { to: None, .. } => true,
                DateFilter::Today => parse_record_date(&app.submission_date) == Some(today),
                DateFilter::Custom {
                    from: Some(from),
                    to: Some(to),
                } => parse_record_date(&app.submission_date)
                    .is_some_and(|date| date >= from && date <= to),
            }
        };
        applications.iter().filter(|app| keep(app)).cloned().collect()
    }

    pub fn export_request(&self) -> ExportRequest {
        let custom_date_range = match *self {
            DateFilter::Custom { from, to } => Some(CustomDateRange {
                from_date: from.map(format_for_api).unwrap_or_default(),
                to_date: to.map(format_for_api).unwrap_or_default(),
            }),
            _ => None,
        };
        ExportRequest {
            date_filter: self.label().to_string(),
            custom_date_range,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub submitted: usize,
    pub reviewing: usize,
    pub approved: usize,
    pub rejected: usize,
    pub onboard_done: usize,
    pub onboard_pending: usize,
}

impl DashboardStats {
    pub fn compute(applications: &[Application]) -> Self {
        let mut stats = DashboardStats {
            total: applications.len(),
            ..Default::default()
        };
        for app in applications {
            match app.status {
                ApplicationStatus::Submitted => stats.submitted += 1,
                ApplicationStatus::Reviewing => stats.reviewing += 1,
                ApplicationStatus::Approved => stats.approved += 1,
                ApplicationStatus::Rejected => stats.rejected += 1,
            }
            match app.onboarding_status {
                OnboardingStatus::Done => stats.onboard_done += 1,
                OnboardingStatus::NotDone => stats.onboard_pending += 1,
            }
        }
        stats
    }
}

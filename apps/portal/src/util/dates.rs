//! Calendar helpers shared by the wizard, the dashboard filter and exports.
//!
//! Input dates arrive as `YYYY-MM-DD`; submission dates are stored for display
//! as `DD/MM/YYYY`.

use chrono::{DateTime, Datelike, Duration, NaiveDate};

const INPUT_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), INPUT_FORMAT).ok()
}

/// `YYYY-MM-DD` → `DD/MM/YYYY`. Empty stays empty; anything unparseable is
/// returned unchanged.
pub fn format_to_display(value: &str) -> String {
    if value.trim().is_empty() {
        return String::new();
    }
    match parse_input_date(value) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => value.to_string(),
    }
}

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// `YYYY-MM-DD`, the format the backend expects.
pub fn format_for_api(date: NaiveDate) -> String {
    date.format(INPUT_FORMAT).to_string()
}

/// Parses a stored record date in any of the shapes the portal has written:
/// display (`DD/MM/YYYY`), input (`YYYY-MM-DD`) or an RFC 3339 timestamp.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DISPLAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, INPUT_FORMAT))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Age as "`Y` years, `M` months, `D` days".
///
/// Days borrow the length of the month before `today`'s month, months borrow
/// twelve.
pub fn detailed_age(birth: NaiveDate, today: NaiveDate) -> String {
    let mut years = today.year() - birth.year();
    let mut months = today.month() as i32 - birth.month() as i32;
    let mut days = today.day() as i32 - birth.day() as i32;

    if days < 0 {
        months -= 1;
        days += days_in_previous_month(today) as i32;
    }

    if months < 0 {
        years -= 1;
        months += 12;
    }

    format!("{years} years, {months} months, {days} days")
}

/// `detailed_age` over an input-format string; empty or invalid gives "".
pub fn detailed_age_from_str(dob: &str, today: NaiveDate) -> String {
    parse_input_date(dob)
        .map(|birth| detailed_age(birth, today))
        .unwrap_or_default()
}

fn days_in_previous_month(today: NaiveDate) -> u32 {
    today
        .with_day(1)
        .map(|first| first - Duration::days(1))
        .map(|last| last.day())
        .unwrap_or(30)
}

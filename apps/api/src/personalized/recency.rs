//! One-year recency window for job postings.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};

use crate::models::jobs::JobPosting;

/// Size of the window, in calendar days.
pub const RECENCY_WINDOW_DAYS: u64 = 365;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// True unless `posted_date` parses to a day more than a year before `now`.
///
/// A missing or unparseable date counts as recent. Future dates are recent.
pub fn is_recent(posted_date: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(posted) = posted_date.and_then(parse_posted_date) else {
        return true;
    };
    match now.date_naive().checked_sub_days(Days::new(RECENCY_WINDOW_DAYS)) {
        Some(cutoff) => posted >= cutoff,
        None => true,
    }
}

/// Keeps the postings for which `is_recent` holds, in order.
pub fn retain_recent(postings: Vec<JobPosting>, now: DateTime<Utc>) -> Vec<JobPosting> {
    postings
        .into_iter()
        .filter(|p| is_recent(p.posted_date.as_deref(), now))
        .collect()
}

/// Parses the date formats the backend is known to emit, keeping only the day.
fn parse_posted_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

//! Mapping of feed records to whole-day calendar events.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    options::Options,
    skatteverket_client::{DateRecord, RecordDate, ORIGIN},
};

/// One whole-day event of the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub url: String,
    /// When the calendar was generated, the same for every event of a calendar.
    pub timestamp: DateTime<Utc>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Map a record to one event per date, in the order of its dates.
///
/// Employer related records are dropped unless the options ask for them.
pub fn map_record(
    record: &DateRecord,
    options: &Options,
    now: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    if record.is_employer_related && !options.include_employer_events {
        return vec![];
    }
    let summary = format!("{} {}", record.kind, record.category);
    let url = absolute_url(&record.uri);
    record
        .dates
        .iter()
        .map(|date| CalendarEvent {
            uid: uid(&record.id, date),
            summary: summary.clone(),
            url: url.clone(),
            timestamp: now,
            start: date.date(),
            end: date.date(),
        })
        .collect()
}

fn absolute_url(uri: &str) -> String {
    if uri.starts_with('/') {
        format!("{ORIGIN}{uri}")
    } else {
        uri.to_string()
    }
}

/// Get a unique id for a specific date of a record.
///
/// Changing this function is a breaking change!
fn uid(id: &str, date: &RecordDate) -> String {
    format!("{}-{}", id, date.raw())
}

//! Assembly of the calendar from both date sets of the feed.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::{
    error::FetchError,
    event::{map_record, CalendarEvent},
    options::Options,
    skatteverket_client::{DateRecord, DateSet, SkatteverketClient},
};

static VERSION: &str = "2.0";
static PROD_ID: &str = "ics-worker/skatteverket/company";
static NAME: &str = "Skatteverket Viktiga Datum";
static DATE_FORMAT: &str = "%Y%m%d";
static STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A calendar ready to be rendered, its events are ordered by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    pub events: Vec<CalendarEvent>,
}

impl CalendarDocument {
    pub fn version(&self) -> &'static str {
        VERSION
    }

    pub fn prod_id(&self) -> &'static str {
        PROD_ID
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    /// Build the iCalendar representation.
    pub fn to_ical(&self) -> Calendar {
        let mut calendar = Calendar::empty();
        for (key, value) in [
            ("VERSION", VERSION),
            ("PRODID", PROD_ID),
            ("CALSCALE", "GREGORIAN"),
            ("NAME", NAME),
            ("X-WR-CALNAME", NAME),
        ] {
            calendar.append_property(Property::new(key, value));
        }
        for event in &self.events {
            calendar.push(get_event(event));
        }
        calendar.done()
    }

    /// Render the iCalendar text.
    ///
    /// Text values are escaped and long lines are folded without splitting a character.
    pub fn generate(&self) -> String {
        self.to_ical().to_string()
    }
}

fn get_event(event: &CalendarEvent) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    // DTSTAMP has to be in UTC form
    ics_event.add_property("DTSTAMP", event.timestamp.format(STAMP_FORMAT).to_string());
    let mut start = Property::new("DTSTART", event.start.format(DATE_FORMAT).to_string());
    start.append_parameter(ValueType::Date);
    ics_event.append_property(start);
    ics_event.summary(&event.summary);
    ics_event.add_property("URL", &event.url);
    ics_event.add_property("TRANSP", "TRANSPARENT");
    ics_event.done()
}

/// Get the calendar for the given options.
///
/// Both date sets are fetched concurrently and both have to succeed, there is no partial calendar.
pub async fn get(
    client: &SkatteverketClient,
    options: &Options,
) -> Result<CalendarDocument, FetchError> {
    let now = Utc::now();
    let (current, historical) = tokio::try_join!(
        client.fetch_dates(options, DateSet::Current),
        client.fetch_dates(options, DateSet::Historical),
    )?;
    Ok(assemble(historical, current, options, now))
}

/// Map the historical records followed by the current ones and order the events by date.
///
/// The sort is stable, so events on the same date keep the order of their records. Records which
/// occur in both sets are not deduplicated.
pub fn assemble(
    historical: Vec<DateRecord>,
    current: Vec<DateRecord>,
    options: &Options,
    now: DateTime<Utc>,
) -> CalendarDocument {
    let mut events: Vec<CalendarEvent> = historical
        .iter()
        .chain(current.iter())
        .flat_map(|record| map_record(record, options, now))
        .collect();
    events.sort_by_key(|event| event.start);
    tracing::debug!(count = events.len(), "assembled calendar");
    CalendarDocument { events }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};
    use mockito::Matcher;

    use super::*;
    use crate::skatteverket_client::RecordDate;

    fn record(id: &str, dates: &[&str], is_employer_related: bool) -> DateRecord {
        DateRecord {
            id: id.to_string(),
            kind: format!("Type {id}"),
            category: "Category".to_string(),
            uri: format!("/{id}"),
            dates: dates
                .iter()
                .map(|date| RecordDate::try_from(date.to_string()).unwrap())
                .collect(),
            is_employer_related,
        }
    }

    fn get_test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap()
    }

    fn unfold(ics: &str) -> String {
        ics.replace("\r\n ", "")
    }

    #[test]
    fn test_assemble_sorts_by_date() {
        let historical = vec![record("old", &["2023-12-12", "2023-01-12"], false)];
        let current = vec![
            record("b", &["2024-05-12", "2024-02-12"], false),
            record("a", &["2024-02-12"], false),
        ];
        let calendar = assemble(historical, current, &Options::default(), get_test_now());
        let uids: Vec<&str> = calendar.events.iter().map(|event| event.uid.as_str()).collect();
        assert_eq!(
            uids,
            vec![
                "old-2023-01-12",
                "old-2023-12-12",
                "b-2024-02-12",
                "a-2024-02-12",
                "b-2024-05-12",
            ]
        );
        assert!(calendar
            .events
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start));
    }

    #[test]
    fn test_assemble_historical_first_on_ties() {
        let historical = vec![record("old", &["2024-02-12"], false)];
        let current = vec![record("new", &["2024-02-12"], false)];
        let calendar = assemble(historical, current, &Options::default(), get_test_now());
        assert_eq!(calendar.events[0].uid, "old-2024-02-12");
        assert_eq!(calendar.events[1].uid, "new-2024-02-12");
    }

    #[test]
    fn test_assemble_keeps_duplicates() {
        let historical = vec![record("same", &["2024-02-12"], false)];
        let current = vec![record("same", &["2024-02-12"], false)];
        let calendar = assemble(historical, current, &Options::default(), get_test_now());
        assert_eq!(calendar.events.len(), 2);
    }

    #[test]
    fn test_assemble_employer_exclusion() {
        let current = vec![
            record("employer", &["2024-02-12", "2024-03-12"], true),
            record("vat", &["2024-02-26"], false),
        ];
        let calendar = assemble(vec![], current.clone(), &Options::default(), get_test_now());
        assert_eq!(calendar.events.len(), 1);

        let options = Options {
            include_employer_events: true,
            ..Options::default()
        };
        let calendar = assemble(vec![], current, &options, get_test_now());
        assert_eq!(calendar.events.len(), 3);
        assert!(calendar
            .events
            .iter()
            .all(|event| event.timestamp == get_test_now()));
    }

    #[test]
    fn test_to_ical() {
        let current = vec![record("5.test123", &["2024-03-15"], false)];
        let ics = assemble(vec![], current, &Options::default(), get_test_now())
            .to_ical()
            .to_string();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("UID:5.test123-2024-03-15\r\n"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20240315\r\n"));
        assert!(ics.contains("DTSTAMP:20240101T083000Z\r\n"));
        assert!(!ics.contains("TZID"));
        assert!(ics.contains("SUMMARY:Type 5.test123 Category\r\n"));
        assert!(ics.contains("URL:https://www.skatteverket.se/5.test123\r\n"));
        assert!(ics.contains("TRANSP:TRANSPARENT\r\n"));
    }

    #[test]
    fn test_generate_long_swedish_summary() {
        let mut employer = record("5.71fe", &["2024-02-12"], true);
        employer.kind = "Arbetsgivardeklaration".to_string();
        employer.category =
            "Deklarera och betala skatter och avgifter för löner som betalats ut".to_string();
        let options = Options {
            include_employer_events: true,
            ..Options::default()
        };
        let ics = assemble(vec![], vec![employer], &options, get_test_now()).generate();
        assert!(ics.lines().any(|line| line.starts_with(' ')));
        assert!(unfold(&ics).contains(
            "SUMMARY:Arbetsgivardeklaration Deklarera och betala skatter och avgifter för löner som betalats ut\r\n"
        ));
    }

    #[test]
    fn test_generate_escapes_text() {
        let mut vat = record("5.moms", &["2024-02-12"], false);
        vat.kind = "Moms, 25%; kvartal".to_string();
        vat.category = "Deklaration\nEND:VEVENT".to_string();
        let ics = assemble(vec![], vec![vat], &Options::default(), get_test_now()).generate();
        assert_eq!(ics.lines().filter(|line| *line == "END:VEVENT").count(), 1);
        assert!(!ics.lines().any(|line| line.starts_with("END:VEVENT ")));
        let unfolded = unfold(&ics);
        assert!(unfolded.contains("Moms\\, 25%\\; kvartal"));
        assert!(unfolded.contains("Deklaration\\nEND:VEVENT"));
    }

    #[test]
    fn test_generate() {
        let current = vec![record("5.test123", &["2024-03-15"], false)];
        let calendar = assemble(vec![], current, &Options::default(), get_test_now());
        assert_eq!(calendar.version(), "2.0");
        assert_eq!(calendar.prod_id(), "ics-worker/skatteverket/company");
        assert_eq!(calendar.name(), "Skatteverket Viktiga Datum");
        let ics = calendar.generate();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("VERSION:2.0"));
        assert!(ics.contains("PRODID:ics-worker/skatteverket/company"));
        assert!(ics.contains("X-WR-CALNAME:Skatteverket Viktiga Datum"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("20240315"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    static BODY_CURRENT: &str = r#"{"viktigaDatum": [
        {"id": "current", "type": "Moms", "category": "Deklaration", "uri": "/moms",
         "dates": ["2024-05-12"], "arbetsgivare": false}
    ]}"#;
    static BODY_HISTORICAL: &str = r#"{"viktigaDatum": [
        {"id": "historical", "type": "Moms", "category": "Deklaration", "uri": "/moms",
         "dates": ["2024-02-12"], "arbetsgivare": false}
    ]}"#;

    /// Test whether both date sets are fetched exactly once and merged in date order.
    #[tokio::test]
    async fn test_get() {
        let mut server = mockito::Server::new_async().await;
        let current = server
            .mock("GET", "/")
            .match_query(Matcher::Exact(
                "foretagsform=ENSKILD_NARINGSIDKARE&momsredovisningsperiod=KVARTAL&omsattning=UPP_TILL_EN_MILJON&rakenskapsaretsSistaManad=12&arbetsgivare=false".into(),
            ))
            .with_status(200)
            .with_body(BODY_CURRENT)
            .expect(1)
            .create_async()
            .await;
        let historical = server
            .mock("GET", "/")
            .match_query(Matcher::Exact(
                "foretagsform=ENSKILD_NARINGSIDKARE&momsredovisningsperiod=KVARTAL&omsattning=UPP_TILL_EN_MILJON&rakenskapsaretsSistaManad=12&arbetsgivare=false&tidigareDatum=true".into(),
            ))
            .with_status(200)
            .with_body(BODY_HISTORICAL)
            .expect(1)
            .create_async()
            .await;
        let client = SkatteverketClient::new(format!("{}/", server.url()));
        let calendar = get(&client, &Options::default()).await.unwrap();
        current.assert_async().await;
        historical.assert_async().await;
        let starts: Vec<NaiveDate> = calendar.events.iter().map(|event| event.start).collect();
        assert_eq!(
            starts,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(),
            ]
        );
        assert_eq!(calendar.events[0].timestamp, calendar.events[1].timestamp);
    }

    #[tokio::test]
    async fn test_get_fails_without_partial_calendar() {
        let mut server = mockito::Server::new_async().await;
        let _current = server
            .mock("GET", "/")
            .match_query(Matcher::Regex("arbetsgivare=false$".into()))
            .with_status(200)
            .with_body(BODY_CURRENT)
            .create_async()
            .await;
        let _historical = server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("tidigareDatum".into(), "true".into()))
            .with_status(500)
            .create_async()
            .await;
        let client = SkatteverketClient::new(format!("{}/", server.url()));
        let err = get(&client, &Options::default()).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}

//! This client fetches the important dates for companies from Skatteverket.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::FetchError, options::Options};

pub static URL: &str =
    "https://www.skatteverket.se/viktiga-datum-api/api/v1/viktiga-datum-foretag";
pub static ORIGIN: &str = "https://www.skatteverket.se";

static HISTORICAL_PARAM: &str = "tidigareDatum";
static DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether to ask for the upcoming dates or for those which already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSet {
    Current,
    Historical,
}

/// A handle to the date feed.
///
/// Cloning is cheap, the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct SkatteverketClient {
    client: Client,
    url: String,
}

impl Default for SkatteverketClient {
    fn default() -> Self {
        Self::new(URL)
    }
}

impl SkatteverketClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Fetch one set of dates for the given options.
    ///
    /// There is exactly one attempt, failures are not retried.
    pub async fn fetch_dates(
        &self,
        options: &Options,
        date_set: DateSet,
    ) -> Result<Vec<DateRecord>, FetchError> {
        let mut request = self.client.get(&self.url).query(options);
        if date_set == DateSet::Historical {
            request = request.query(&[(HISTORICAL_PARAM, "true")]);
        }
        tracing::debug!(url = %self.url, ?date_set, ?options, "fetching dates");
        let response = request.send().await.map_err(FetchError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.text().await.map_err(FetchError::Request)?;
        let records = parse(&body)?;
        tracing::debug!(?date_set, count = records.len(), "fetched dates");
        Ok(records)
    }
}

/// Validate the response body against the shape of the feed.
///
/// Unknown fields are ignored, missing fields, wrong types and dates which are no calendar dates
/// are rejected.
fn parse(body: &str) -> Result<Vec<DateRecord>, FetchError> {
    let response: DatesResponse = serde_json::from_str(body).map_err(FetchError::Malformed)?;
    Ok(response.records)
}

#[derive(Debug, Deserialize)]
struct DatesResponse {
    #[serde(rename = "viktigaDatum")]
    records: Vec<DateRecord>,
}

/// One entry of the feed, e.g. a VAT return which is due on several dates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    /// Either an absolute URL or a path on [`ORIGIN`].
    pub uri: String,
    pub dates: Vec<RecordDate>,
    #[serde(rename = "arbetsgivare")]
    pub is_employer_related: bool,
}

/// A date of a record, keeping the exact string the feed used for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct RecordDate {
    raw: String,
    date: NaiveDate,
}

impl RecordDate {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl TryFrom<String> for RecordDate {
    type Error = chrono::ParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT)?;
        Ok(Self { raw, date })
    }
}

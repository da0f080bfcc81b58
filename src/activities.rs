/*
 *  activities.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Upcoming activities: retrieval from the association API and
 *	condensing of their dates into something that fits on one line
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime};
use deunicode::deunicode_with_tofu;
use log::{error, info};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const ACTIVITY_DATE_FORMAT: &str = "%d %b";
pub const ACTIVITY_TIME_FORMAT: &str = "%H:%M";

/// Reasons the activity list could not be refreshed. The `Display` text
/// goes straight onto the column, so it is kept short.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No connection to the\nactivity server!")]
    Connect(#[source] reqwest::Error),
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("Received nonsense!")]
    Malformed(String),
}

/// One activity ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub name: String,
    pub when: String,
}

impl Activity {
    pub fn new(name: impl Into<String>, when: impl Into<String>) -> Self {
        Self { name: name.into(), when: when.into() }
    }
}

/// An activity as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawActivity {
    pub name: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Anything that can produce the current list of upcoming activities.
///
/// One call is one bounded attempt; retrying is the caller's business.
pub trait ActivitySource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Activity>, FetchError>> + Send;
}

/// Fetches activities over HTTP.
#[derive(Debug, Clone)]
pub struct ActivityClient {
    url: String,
    client: Client,
}

impl ActivityClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        const VERSION: &'static str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(timeout)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Connect)?;

        Ok(ActivityClient { url: url.to_string(), client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ActivitySource for ActivityClient {
    async fn fetch(&self) -> Result<Vec<Activity>, FetchError> {
        info!("Fetching activities from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!("Failed to connect: {}", e);
            FetchError::Connect(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read response body: {}", e);
            FetchError::Connect(e)
        })?;

        if status != StatusCode::OK {
            error!("HTTP error: {}", status);
            error!("Response content: {}", body);
            return Err(FetchError::Status(status.as_u16()));
        }

        let today = Local::now().date_naive();
        let activities = parse_activities(&body, today)?;
        info!("Retrieved {} activities", activities.len());
        Ok(activities)
    }
}

/// Turns an API payload into display-ready activities.
pub fn parse_activities(body: &str, today: NaiveDate) -> Result<Vec<Activity>, FetchError> {
    let raw: Vec<RawActivity> = serde_json::from_str(body).map_err(|e| {
        error!("Invalid API output ({}): {}", e, body);
        FetchError::Malformed(e.to_string())
    })?;

    raw.iter()
        .map(|event| {
            let when = build_when(event, today).map_err(|e| {
                error!("Unreadable dates for '{}': {}", event.name, e);
                FetchError::Malformed(e)
            })?;
            Ok(Activity::new(fold_to_ascii(&event.name), when))
        })
        .collect()
}

/// A point in time from the API: a whole day, an exact moment with an
/// offset, or a wall-clock moment without one (taken as local time).
#[derive(Debug, Clone, Copy, PartialEq)]
enum Moment {
    Day(NaiveDate),
    At(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

/// Offset-less date-time layouts, `T` or space separated.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl Moment {
    fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if !value.contains(['T', ' ']) {
            return NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Moment::Day)
                .map_err(|e| format!("bad date '{}': {}", value, e));
        }

        let rfc3339 = match DateTime::parse_from_rfc3339(value) {
            Ok(at) => return Ok(Moment::At(at)),
            Err(e) => e,
        };
        if let Ok(at) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Ok(Moment::At(at));
        }
        NAIVE_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(Moment::Local)
            .ok_or_else(|| format!("bad date-time '{}': {}", value, rfc3339))
    }

    /// Calendar date in the moment's own offset.
    fn date(&self) -> NaiveDate {
        match self {
            Moment::Day(date) => *date,
            Moment::At(at) => at.date_naive(),
            Moment::Local(at) => at.date(),
        }
    }

    fn time(&self) -> Option<NaiveTime> {
        match self {
            Moment::Day(_) => None,
            Moment::At(at) => Some(at.time()),
            Moment::Local(at) => Some(at.time()),
        }
    }
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(ACTIVITY_DATE_FORMAT).to_string()
}

fn fmt_time(time: NaiveTime) -> String {
    time.format(ACTIVITY_TIME_FORMAT).to_string()
}

/// Condenses an activity's start and end into just enough text to tell
/// the reader when it happens. The start date is left out for timed
/// single-day activities that start `today`.
pub fn build_when(event: &RawActivity, today: NaiveDate) -> Result<String, String> {
    let start = Moment::parse(&event.start_date)?;
    let start_date = fmt_date(start.date());

    let Some(end_raw) = event.end_date.as_deref() else {
        return Ok(start_date);
    };
    let end = Moment::parse(end_raw)?;
    let end_date = fmt_date(end.date());

    let starts_today = start.date() == today;
    let multiday = start.date() != end.date();

    let result = match (multiday, start.time(), end.time()) {
        (false, None, _) => start_date,
        (false, Some(st), None) => {
            if starts_today { fmt_time(st) } else { format!("{} {}", start_date, fmt_time(st)) }
        }
        (false, Some(st), Some(et)) => {
            let span = format!("{}~{}", fmt_time(st), fmt_time(et));
            if starts_today { span } else { format!("{} {}", start_date, span) }
        }
        (true, None, _) => format!("{}~{}", start_date, end_date),
        (true, Some(st), None) => format!("{} {}~{}", start_date, fmt_time(st), end_date),
        (true, Some(st), Some(et)) => {
            format!("{} {} ~ {} {}", start_date, fmt_time(st), end_date, fmt_time(et))
        }
    };
    Ok(result)
}

/// The controller only has ASCII glyphs: transliterate to the closest
/// ASCII spelling, `?` where there is none. Control characters become
/// spaces.
pub fn fold_to_ascii(text: &str) -> String {
    deunicode_with_tofu(text, "?")
        .chars()
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 6, 8).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 6, 9).unwrap()
    }

    fn event(start: &str, end: Option<&str>) -> RawActivity {
        RawActivity {
            name: "Honking".to_string(),
            start_date: start.to_string(),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn test_start_only() {
        assert_eq!(build_when(&event("2016-06-08", None), today()).unwrap(), "08 Jun");
    }

    #[test]
    fn test_all_single_day() {
        let e = event("2016-06-08", Some("2016-06-08"));
        assert_eq!(build_when(&e, tomorrow()).unwrap(), "08 Jun");
        assert_eq!(build_when(&e, today()).unwrap(), "08 Jun");
    }

    #[test]
    fn test_single_day_start_time() {
        let e = event("2016-06-08T12:34:00+02:00", Some("2016-06-08"));
        assert_eq!(build_when(&e, today()).unwrap(), "12:34");
        assert_eq!(build_when(&e, tomorrow()).unwrap(), "08 Jun 12:34");
    }

    #[test]
    fn test_single_day_start_end_times() {
        let e = event("2016-06-08T12:34:00+02:00", Some("2016-06-08T13:37:00+02:00"));
        assert_eq!(build_when(&e, today()).unwrap(), "12:34~13:37");
        assert_eq!(build_when(&e, tomorrow()).unwrap(), "08 Jun 12:34~13:37");
    }

    #[test]
    fn test_multiday_all_day() {
        let e = event("2016-06-08", Some("2016-06-09"));
        assert_eq!(build_when(&e, today()).unwrap(), "08 Jun~09 Jun");
    }

    #[test]
    fn test_multiday_start_time() {
        let e = event("2016-06-08T12:34:00+02:00", Some("2016-06-09"));
        assert_eq!(build_when(&e, today()).unwrap(), "08 Jun 12:34~09 Jun");
    }

    #[test]
    fn test_multiday_start_end_times() {
        let e = event("2016-06-08T12:34:00+02:00", Some("2016-06-09T13:37:00+02:00"));
        assert_eq!(build_when(&e, today()).unwrap(), "08 Jun 12:34 ~ 09 Jun 13:37");
    }

    #[test]
    fn test_local_date_times() {
        let e = event("2016-06-08T12:34:00", Some("2016-06-08T13:37:00"));
        assert_eq!(build_when(&e, today()).unwrap(), "12:34~13:37");
        assert_eq!(build_when(&e, tomorrow()).unwrap(), "08 Jun 12:34~13:37");

        let e = event("2016-06-08 12:34:00", Some("2016-06-09T13:37:00.250"));
        assert_eq!(build_when(&e, today()).unwrap(), "08 Jun 12:34 ~ 09 Jun 13:37");

        let e = event("2016-06-08T12:34", Some("2016-06-09"));
        assert_eq!(build_when(&e, today()).unwrap(), "08 Jun 12:34~09 Jun");
    }

    #[test]
    fn test_mixed_offsets_in_one_event() {
        let e = event("2016-06-08T12:34:00+02:00", Some("2016-06-08 13:37:00"));
        assert_eq!(build_when(&e, today()).unwrap(), "12:34~13:37");
    }

    #[test]
    fn test_bad_dates() {
        assert!(build_when(&event("yesterday", None), today()).is_err());
        assert!(build_when(&event("2016-06-08T25:00:00+02:00", None), today()).is_err());
        assert!(build_when(&event("2016-06-08T25:00:00", None), today()).is_err());
        assert!(build_when(&event("2016-06-08Tnoon", None), today()).is_err());
    }

    #[test]
    fn test_parse_payload() {
        let body = r#"[
            {"name": "Borrel", "start_date": "2016-06-08T17:00:00+02:00", "end_date": "2016-06-08T21:00:00+02:00"},
            {"name": "Café tour", "start_date": "2016-06-10"}
        ]"#;
        let activities = parse_activities(body, today()).unwrap();
        assert_eq!(activities, vec![
            Activity::new("Borrel", "17:00~21:00"),
            Activity::new("Cafe tour", "10 Jun"),
        ]);
    }

    #[test]
    fn test_parse_payload_without_offsets() {
        let body = r#"[
            {"name": "Borrel", "start_date": "2016-06-08T17:00:00+02:00", "end_date": "2016-06-08T21:00:00+02:00"},
            {"name": "Lunch lecture", "start_date": "2016-06-10T12:15:00", "end_date": "2016-06-10T13:00:00"}
        ]"#;
        let activities = parse_activities(body, today()).unwrap();
        assert_eq!(activities, vec![
            Activity::new("Borrel", "17:00~21:00"),
            Activity::new("Lunch lecture", "10 Jun 12:15~13:00"),
        ]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_activities("<html>", today()), Err(FetchError::Malformed(_))));
        assert!(matches!(parse_activities(r#"{"name": 1}"#, today()), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Crème brûlée"), "Creme brulee");
        assert_eq!(fold_to_ascii("Straße\tnaïef"), "Strasse naief");
        assert_eq!(fold_to_ascii("plain ASCII!"), "plain ASCII!");
    }

    #[test]
    fn test_fold_beyond_latin1() {
        assert_eq!(fold_to_ascii("Łódź Ærø Škoda Đorđe"), "Lodz AEro Skoda Dorde");
        assert!(fold_to_ascii("日本 ☕").is_ascii());
    }

    #[test]
    fn test_error_text_fits_column() {
        for err in [FetchError::Status(503), FetchError::Malformed(String::new())] {
            assert!(err.to_string().lines().all(|l| l.len() <= 32));
        }
    }
}

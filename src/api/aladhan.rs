//! Aladhan timings API client.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{DayResponse, Location, PrayerTimesSource};
use crate::error::{Error, Result};
use crate::format::format_date;
use crate::timings::RawDayTimings;

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

#[derive(Deserialize)]
struct Envelope {
    data: Data,
}

#[derive(Deserialize)]
struct Data {
    timings: RawDayTimings,
    meta: Meta,
}

#[derive(Deserialize)]
struct Meta {
    timezone: String,
}

/// Parses a `/timings` response body.
pub(crate) fn parse_body(body: &str) -> Result<DayResponse> {
    let envelope: Envelope = serde_json::from_str(body)?;
    Ok(DayResponse {
        timings: envelope.data.timings,
        timezone: envelope.data.meta.timezone,
    })
}

/// Fetches daily timings from `api.aladhan.com`.
#[derive(Debug, Clone)]
pub struct AladhanClient {
    http: reqwest::Client,
    base_url: String,
}

impl AladhanClient {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn day_url(&self, date: NaiveDate) -> String {
        format!("{}/timings/{}", self.base_url, format_date(date))
    }
}

#[async_trait]
impl PrayerTimesSource for AladhanClient {
    async fn fetch_day(&self, date: NaiveDate, location: Location) -> Result<DayResponse> {
        let url = self.day_url(date);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("latitude", location.latitude),
                ("longitude", location.longitude),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        parse_body(&body)
    }
}

//! Clients for the remote prayer-times and translation services.

mod aladhan;
mod mymemory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timings::RawDayTimings;

pub use aladhan::{AladhanClient, DEFAULT_BASE_URL as ALADHAN_BASE_URL};
pub use mymemory::{DEFAULT_BASE_URL as MYMEMORY_BASE_URL, MyMemoryClient};

/// Geographic position the timings are computed for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 30.0,
            longitude: 31.0,
        }
    }
}

/// One day of timings plus the upstream timezone name (`Region/City`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayResponse {
    pub timings: RawDayTimings,
    pub timezone: String,
}

/// Fetches the raw timings for one calendar day.
#[async_trait]
pub trait PrayerTimesSource: Send + Sync {
    async fn fetch_day(&self, date: NaiveDate, location: Location) -> Result<DayResponse>;
}

/// Translates short strings between language codes.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String>;
}

/// Optional source of the device position.
///
/// The refresh cycle uses the configured location; providers that consult a
/// real positioning service report failures as `Error::Geolocation`.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> Result<Location>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Location);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Location> {
        Ok(self.0)
    }
}

/// Returns the city segment of a `Region/City` timezone name.
#[must_use]
pub fn city_of(timezone: &str) -> Option<&str> {
    timezone.split('/').nth(1).filter(|city| !city.is_empty())
}

/// Builds the shared HTTP client. `timeout` of `None` lets requests wait forever.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Result<reqwest::Client> {
    let builder = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30));
    match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
    .build()
}

//! MyMemory translation API client.

use async_trait::async_trait;
use serde::Deserialize;

use super::Translator;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.mymemory.translated.net";

#[derive(Deserialize)]
struct TranslationResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct Match {
    translation: String,
}

/// Extracts the first match from a `/get` response body.
pub(crate) fn parse_body(body: &str) -> Result<String> {
    let response: TranslationResponse =
        serde_json::from_str(body).map_err(|e| Error::Translation(e.to_string()))?;
    response
        .matches
        .into_iter()
        .next()
        .map(|m| m.translation)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error::Translation("no translation matches".to_string()))
}

/// Translates via `api.mymemory.translated.net`.
#[derive(Debug, Clone)]
pub struct MyMemoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl MyMemoryClient {
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
}

#[async_trait]
impl Translator for MyMemoryClient {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let langpair = format!("{from}|{to}");
        let response = self
            .http
            .get(format!("{}/get", self.base_url))
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Translation(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;
        parse_body(&body)
    }
}

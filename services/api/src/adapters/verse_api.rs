//! services/api/src/adapters/verse_api.rs
//!
//! `VerseTextLookup` over a bible-api.com style HTTP service:
//! `GET {base}/{reference}` answering `{reference, text, translation_name}`.

use std::time::Duration;

use async_trait::async_trait;
use devotional_core::domain::{VerseReference, VerseText};
use devotional_core::ports::{PortError, PortResult, VerseTextLookup};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

#[derive(Clone)]
pub struct BibleApiAdapter {
    client: reqwest::Client,
    base_url: Url,
}

impl BibleApiAdapter {
    /// Creates an adapter against `base_url`. `timeout` bounds each HTTP call.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortError::Unexpected(format!("invalid verse API url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PortError::Unexpected(format!(
                "verse API url '{}' cannot be a base",
                base_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn url_for(&self, reference: &VerseReference) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&reference.to_string());
        }
        url
    }
}

#[derive(Debug, Deserialize)]
struct PassageResponse {
    text: String,
    translation_name: Option<String>,
}

impl PassageResponse {
    fn into_verse_text(self, reference: &VerseReference) -> PortResult<VerseText> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(PortError::NotFound(format!("no text for {}", reference)));
        }
        Ok(VerseText {
            reference: reference.clone(),
            text: text.to_string(),
            translation: self.translation_name,
        })
    }
}

#[async_trait]
impl VerseTextLookup for BibleApiAdapter {
    async fn fetch(&self, reference: &VerseReference) -> PortResult<VerseText> {
        let url = self.url_for(reference);
        debug!(%reference, %url, "Fetching verse text");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(PortError::NotFound(format!("verse source has no {}", reference)))
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(PortError::Unavailable(format!("HTTP {}: {}", status, body)));
            }
            _ => {}
        }

        let passage: PassageResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("bad verse payload: {}", e)))?;
        passage.into_verse_text(reference)
    }
}

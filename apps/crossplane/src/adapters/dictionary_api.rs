//! HTTP word validator: a content-policy check followed by a dictionary
//! lookup.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::services::validation::{Verdict, WordValidator};

pub const NO_DEFINITION: &str = "No definition found.";

#[derive(Debug, Clone)]
pub struct DictionaryApiValidator {
    http: reqwest::Client,
    dictionary_url: String,
    profanity_url: String,
}

impl DictionaryApiValidator {
    pub fn new(
        dictionary_url: impl Into<String>,
        profanity_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::config(format!("Unable to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            dictionary_url: dictionary_url.into(),
            profanity_url: profanity_url.into(),
        })
    }

    /// Fails open: any error counts as clean.
    async fn is_profane(&self, word: &str) -> bool {
        let response = match self
            .http
            .get(&self.profanity_url)
            .query(&[("text", word)])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(status = %response.status(), "Profanity check failed, allowing word through");
                return false;
            }
            Err(err) => {
                warn!(error = %err, "Profanity service unavailable, allowing word through");
                return false;
            }
        };

        match response.text().await {
            Ok(body) => body.trim() == "true",
            Err(err) => {
                warn!(error = %err, "Unreadable profanity response, allowing word through");
                false
            }
        }
    }
}

#[async_trait]
impl WordValidator for DictionaryApiValidator {
    async fn validate(&self, word: &str) -> Verdict {
        let lower = word.to_ascii_lowercase();

        if self.is_profane(&lower).await {
            debug!(word = %word, "Word blocked by content policy");
            return Verdict::NotFound;
        }

        let url = format!("{}/{}", self.dictionary_url.trim_end_matches('/'), lower);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(word = %word, error = %err, "Dictionary lookup failed");
                return Verdict::Unavailable;
            }
        };

        match response.status() {
            StatusCode::NOT_FOUND => return Verdict::NotFound,
            status if !status.is_success() => {
                warn!(word = %word, status = %status, "Dictionary lookup returned an error");
                return Verdict::Unavailable;
            }
            _ => {}
        }

        // Any JSON body counts as found; its shape only decides the definition.
        match response.json::<Value>().await {
            Ok(body) => Verdict::Accepted {
                definition: Some(first_definition(&body)),
            },
            Err(err) => {
                warn!(word = %word, error = %err, "Unreadable dictionary response");
                Verdict::Unavailable
            }
        }
    }
}

/// First definition of the first meaning of the first entry.
fn first_definition(body: &Value) -> String {
    body.as_array()
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.pointer("/meanings/0/definitions/0/definition"))
        .and_then(Value::as_str)
        .map_or_else(|| NO_DEFINITION.to_string(), str::to_string)
}

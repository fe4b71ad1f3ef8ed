//! Reqwest-backed sentiment scorer adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding of the numeric score.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{SentimentScorer, SentimentScorerError};

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    sentiment: f64,
}

/// Sentiment scorer that POSTs `{"text": ...}` to one endpoint.
pub struct HttpSentimentScorer {
    client: Client,
    endpoint: Url,
}

impl HttpSentimentScorer {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl SentimentScorer for HttpSentimentScorer {
    async fn score(&self, text: &str) -> Result<f64, SentimentScorerError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&ScoreRequest { text })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_score(body.as_ref())
    }
}

fn parse_score(body: &[u8]) -> Result<f64, SentimentScorerError> {
    let decoded: ScoreResponse = serde_json::from_slice(body).map_err(|error| {
        SentimentScorerError::decode(format!("invalid sentiment payload: {error}"))
    })?;
    if decoded.sentiment.is_finite() {
        Ok(decoded.sentiment)
    } else {
        Err(SentimentScorerError::decode("sentiment must be finite"))
    }
}

fn map_transport_error(error: reqwest::Error) -> SentimentScorerError {
    if error.is_timeout() {
        SentimentScorerError::timeout(error.to_string())
    } else {
        SentimentScorerError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SentimentScorerError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            SentimentScorerError::timeout(format!("status {}", status.as_u16()))
        }
        _ => SentimentScorerError::status(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

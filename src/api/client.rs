//! reqwest implementation of the game API

use super::query;
use super::types::{ChatQuery, ChatResponse, HistoryQuery, HistoryResponse};
use super::{PuzzleApi, TransportError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Game API over HTTP, configured with a single base URL
pub struct HttpPuzzleApi {
    client: Client,
    base_url: String,
}

impl HttpPuzzleApi {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint<Q: Serialize>(&self, path: &str, params: &Q) -> Result<Url, TransportError> {
        let encoded = query::encode(params)
            .map_err(|e| TransportError::invalid_url(format!("Failed to encode query: {e}")))?;
        let raw = if encoded.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{encoded}", self.base_url)
        };
        Url::parse(&raw).map_err(|e| TransportError::invalid_url(format!("{raw}: {e}")))
    }

    async fn get_json<Q, R>(&self, path: &str, params: &Q) -> Result<R, TransportError>
    where
        Q: Serialize,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path, params)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                TransportError::network(format!("Connection failed: {e}"))
            } else {
                TransportError::network(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        decode_body(&body)
    }
}

/// Most characters of a response body quoted in an error message
const BODY_EXCERPT_CHARS: usize = 200;

/// Body flattened to one line and cut to `BODY_EXCERPT_CHARS`
fn body_excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= BODY_EXCERPT_CHARS {
        return flat;
    }
    let mut excerpt: String = flat.chars().take(BODY_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

fn decode_body<R: DeserializeOwned>(body: &str) -> Result<R, TransportError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(body = %body, "Undecodable response body");
        TransportError::decode(format!(
            "Failed to parse response: {e} - body: {}",
            body_excerpt(body)
        ))
    })
}

fn classify_status(status: StatusCode, body: &str) -> TransportError {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    let detail = body_excerpt(body);
    let message = if detail.is_empty() {
        format!("HTTP {}: {reason}", status.as_u16())
    } else {
        format!("HTTP {}: {reason} - {detail}", status.as_u16())
    };
    TransportError::status(status.as_u16(), message)
}

#[async_trait]
impl PuzzleApi for HttpPuzzleApi {
    async fn fetch_chat_history(&self, cid: &str) -> Result<HistoryResponse, TransportError> {
        self.get_json("/history", &HistoryQuery { cid }).await
    }

    async fn fetch_chat(
        &self,
        question: &str,
        cid: Option<&str>,
    ) -> Result<ChatResponse, TransportError> {
        self.get_json("/chat", &ChatQuery { question, cid }).await
    }
}

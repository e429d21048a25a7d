use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::model::{ApiReply, WeatherRequest, WeatherResponse};

use super::{WeatherProvider, truncate_body};

/// Posts requests to a weather backend exposing `POST /api/weather`.
#[derive(Debug, Clone)]
pub struct BackendProvider {
    base_url: String,
    http: Client,
}

impl BackendProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string(), http: Client::new() }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/weather", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for BackendProvider {
    async fn fetch(&self, request: &WeatherRequest) -> Result<ApiReply> {
        let url = self.endpoint();
        debug!(%url, ?request, "sending weather request to backend");

        let res = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to weather backend at {url}"))?;

        let status = res.status().as_u16();
        let body = res.text().await.context("Failed to read weather backend response body")?;

        let reply = decode_reply(status, &body)?;
        info!(status, "weather backend answered");
        Ok(reply)
    }
}

/// Decode a backend response. The body is JSON for every status code.
pub fn decode_reply(status: u16, body: &str) -> Result<ApiReply> {
    let parsed: WeatherResponse = serde_json::from_str(body).with_context(|| {
        format!(
            "Failed to parse weather backend JSON (status {status}): {}",
            truncate_body(body)
        )
    })?;

    Ok(ApiReply::new(status, parsed))
}

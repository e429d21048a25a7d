use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::model::{ApiReply, TemperatureReading, WeatherInfo, WeatherRequest, WeatherResponse};

use super::{WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const SUCCESS_MESSAGE: &str = "Weather data retrieved successfully from Open-Meteo.";
const UNEXPECTED_FORMAT: &str = "Data format from Open-Meteo was not as expected.";

/// Queries Open-Meteo directly and answers in the same shape as the backend's
/// `/api/weather` endpoint, so both providers render the same way.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), http })
    }

    fn forecast_url(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Option<Vec<String>>,
    temperature_2m: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: Option<OmHourly>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch(&self, request: &WeatherRequest) -> Result<ApiReply> {
        let latitude = request.latitude.to_string();
        let longitude = request.longitude.to_string();

        let sent = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("start_date", request.start_date.as_str()),
                ("end_date", request.end_date.as_str()),
                ("hourly", "temperature_2m"),
                ("timezone", "auto"),
                ("temperature_unit", "celsius"),
            ])
            .send()
            .await;

        let res = match sent {
            Ok(res) => res,
            Err(err) => return Ok(reply_for_transport_error(&err)),
        };

        let status = res.status().as_u16();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => return Ok(reply_for_transport_error(&err)),
        };

        let reply = translate_forecast(request, status, &body);
        info!(
            status = reply.status,
            latitude = request.latitude,
            longitude = request.longitude,
            start_date = %request.start_date,
            end_date = %request.end_date,
            "processed Open-Meteo request"
        );
        Ok(reply)
    }
}

/// Build the reply for a completed Open-Meteo exchange.
pub fn translate_forecast(request: &WeatherRequest, status: u16, body: &str) -> ApiReply {
    if !(200..300).contains(&status) {
        error!(status, body = %truncate_body(body), "Open-Meteo returned an error status");
        return ApiReply::new(
            status,
            WeatherResponse {
                error: Some(format!("Error fetching weather data from provider: {status}")),
                details: Some(body.to_string()),
                ..WeatherResponse::default()
            },
        );
    }

    let parsed: OmForecastResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            error!(%err, "Failed to parse Open-Meteo forecast JSON");
            return ApiReply::new(
                500,
                WeatherResponse::error("An internal error occurred while processing weather data."),
            );
        }
    };

    let hourly = parsed.hourly.and_then(|h| Some((h.time?, h.temperature_2m?)));

    // The exchange itself succeeded, so the success message stands even when
    // the hourly block is missing; the reading list carries the problem.
    let readings = match hourly {
        Some((times, temperatures)) => times
            .into_iter()
            .enumerate()
            .map(|(i, time)| TemperatureReading::Reading {
                time,
                temp_c: temperatures.get(i).copied().flatten(),
            })
            .collect(),
        None => {
            warn!("Open-Meteo response missing expected hourly data structure");
            vec![TemperatureReading::Failed { error: UNEXPECTED_FORMAT.to_string() }]
        }
    };

    ApiReply::new(
        200,
        WeatherResponse {
            message: Some(SUCCESS_MESSAGE.to_string()),
            data_received: Some(request.clone()),
            weather_info: Some(WeatherInfo { temperature_readings: Some(readings) }),
            ..WeatherResponse::default()
        },
    )
}

/// Map a failure to reach Open-Meteo onto a gateway-style reply.
fn reply_for_transport_error(err: &reqwest::Error) -> ApiReply {
    let (status, message) = if err.is_timeout() {
        (504, "Request to weather data provider timed out.")
    } else if err.is_connect() {
        (503, "Could not connect to weather data provider.")
    } else {
        (500, "An unexpected error occurred while fetching weather data.")
    };

    error!(%err, status, "Open-Meteo request failed");
    ApiReply::new(status, WeatherResponse::error(message))
}

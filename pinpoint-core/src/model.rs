use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::selection::Coordinates;
use crate::validation::DateTimeRange;

/// Body of a weather request. Also echoed back as `data_received`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl WeatherRequest {
    pub fn new(point: Coordinates, range: &DateTimeRange) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            start_date: range.start_date.format("%Y-%m-%d").to_string(),
            end_date: range.end_date.format("%Y-%m-%d").to_string(),
            start_time: range.start_time.map(|t| t.format("%H:%M").to_string()),
            end_time: range.end_time.map(|t| t.format("%H:%M").to_string()),
        }
    }
}

/// Response body of a weather request, for success and failure alike.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "details_text")]
    pub details: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_echo")]
    pub data_received: Option<WeatherRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_info: Option<WeatherInfo>,
}

impl WeatherResponse {
    pub fn error(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_readings")]
    pub temperature_readings: Option<Vec<TemperatureReading>>,
}

/// One hourly entry. An entry with an `error` field replaces a real reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemperatureReading {
    Failed {
        error: String,
    },
    Reading {
        time: String,
        #[serde(default, deserialize_with = "temperature")]
        temp_c: Option<f64>,
    },
}

impl TemperatureReading {
    pub fn error_message(&self) -> Option<&str> {
        match self {
            TemperatureReading::Failed { error } => Some(error),
            TemperatureReading::Reading { .. } => None,
        }
    }

    /// Wall-clock time of the reading at the location.
    ///
    /// Accepts `YYYY-MM-DDTHH:MM`, with optional seconds, and RFC 3339 with an
    /// offset (the offset's local wall clock is used).
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        let TemperatureReading::Reading { time, .. } = self else {
            return None;
        };
        parse_reading_time(time)
    }
}

/// Status code and decoded body of one exchange with a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: WeatherResponse,
}

impl ApiReply {
    pub fn new(status: u16, body: WeatherResponse) -> Self {
        Self { status, body }
    }

    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

pub(crate) fn parse_reading_time(time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(time).ok().map(|dt| dt.naive_local()))
}

/// Temperatures arrive as a number, `null`, or a placeholder like "N/A".
/// Anything that is not a number reads as missing.
fn temperature<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Servers put strings here, but also JSON objects; keep those as text.
fn details_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// A malformed echo of the request is dropped rather than failing the response.
fn lenient_echo<'de, D>(deserializer: D) -> Result<Option<WeatherRequest>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match serde_json::from_value(value) {
        Ok(request) => Ok(Some(request)),
        Err(err) => {
            warn!(%err, "ignoring malformed data_received");
            Ok(None)
        }
    }
}

/// Entries that fit neither reading shape are skipped; a non-list reads as absent.
fn lenient_readings<'de, D>(deserializer: D) -> Result<Option<Vec<TemperatureReading>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries,
        Value::Null => return Ok(None),
        other => {
            warn!(value = %other, "temperature_readings is not a list");
            return Ok(None);
        }
    };

    let readings = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(reading) => Some(reading),
            Err(err) => {
                warn!(%err, "skipping malformed temperature reading");
                None
            }
        })
        .collect();

    Ok(Some(readings))
}

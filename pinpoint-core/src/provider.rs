use crate::{
    ApiReply, Config, WeatherRequest,
    provider::{backend::BackendProvider, openmeteo::OpenMeteoProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod backend;
pub mod openmeteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Backend,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Backend => "backend",
            ProviderId::OpenMeteo => "openmeteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Backend, ProviderId::OpenMeteo]
    }

    /// Base URL used when the config does not name one.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderId::Backend => None,
            ProviderId::OpenMeteo => Some(openmeteo::DEFAULT_BASE_URL),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "backend" => Ok(ProviderId::Backend),
            "openmeteo" | "open-meteo" => Ok(ProviderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: backend, openmeteo."
            )),
        }
    }
}

/// A source that can answer a weather request.
///
/// `Err` is reserved for exchanges that could not be completed or decoded;
/// errors the server reports come back inside the `ApiReply`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, request: &WeatherRequest) -> anyhow::Result<ApiReply>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let base_url = config
        .provider_base_url(id)
        .or_else(|| id.default_base_url())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No base URL configured for provider '{id}'.\n\
                 Hint: run `pinpoint configure {id}` and enter the server address."
            )
        })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Backend => Box::new(BackendProvider::new(base_url)),
        ProviderId::OpenMeteo => {
            let timeout = config.provider_timeout_secs(id).unwrap_or(openmeteo::DEFAULT_TIMEOUT_SECS);
            Box::new(OpenMeteoProvider::new(base_url, Duration::from_secs(timeout))?)
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

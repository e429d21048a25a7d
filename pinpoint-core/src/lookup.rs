//! The controller tying selection, validation and a provider together.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

use crate::model::WeatherRequest;
use crate::provider::WeatherProvider;
use crate::report::Report;
use crate::selection::{Coordinates, Selection, SelectionError};
use crate::validation::{DateTimeRange, RangeInput, ValidationError};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An application error occurred: {0:#}")]
    Transport(#[source] anyhow::Error),
}

impl LookupError {
    /// True for problems with what the user entered, as opposed to the exchange itself.
    pub fn is_input_error(&self) -> bool {
        matches!(self, LookupError::Selection(_) | LookupError::Validation(_))
    }
}

#[derive(Debug)]
pub struct WeatherLookup {
    selection: Selection,
    provider: Box<dyn WeatherProvider>,
}

impl WeatherLookup {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self::with_selection(provider, Selection::default())
    }

    pub fn with_selection(provider: Box<dyn WeatherProvider>, selection: Selection) -> Self {
        Self { selection, provider }
    }

    pub fn select_point(&mut self, latitude: f64, longitude: f64) -> Result<Coordinates, LookupError> {
        Ok(self.selection.select(latitude, longitude)?)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Check the selected point and the date/time input, and build the request.
    pub fn prepare(&self, input: &RangeInput, now: NaiveDateTime) -> Result<WeatherRequest, LookupError> {
        self.checked(input, now).map(|(request, _)| request)
    }

    /// Validate, send one request, and interpret the reply.
    pub async fn run(&self, input: &RangeInput, now: NaiveDateTime) -> Result<Report, LookupError> {
        let (request, range) = self.checked(input, now)?;

        debug!(?request, "dispatching weather request");
        let reply = self.provider.fetch(&request).await.map_err(LookupError::Transport)?;

        Ok(Report::from_reply(reply, &range.time_window()))
    }

    fn checked(
        &self,
        input: &RangeInput,
        now: NaiveDateTime,
    ) -> Result<(WeatherRequest, DateTimeRange), LookupError> {
        check(&self.selection, input, now)
    }
}

/// Location check first, then the date/time rules. Needs no provider, so front
/// ends can reject bad input before any configuration or network work.
pub fn check(
    selection: &Selection,
    input: &RangeInput,
    now: NaiveDateTime,
) -> Result<(WeatherRequest, DateTimeRange), LookupError> {
    let point = selection.require()?;
    let range = input.validate(now)?;
    Ok((WeatherRequest::new(point, &range), range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiReply, TemperatureReading, WeatherInfo, WeatherResponse};
    use crate::report::{Readings, ReportBody};
    use async_trait::async_trait;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct FakeProvider {
        calls: Arc<AtomicUsize>,
        last: Arc<Mutex<Option<WeatherRequest>>>,
        fail: bool,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch(&self, request: &WeatherRequest) -> anyhow::Result<ApiReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            if self.fail {
                anyhow::bail!("connection refused");
            }

            let readings = (0u8..24)
                .map(|h| TemperatureReading::Reading {
                    time: format!("{}T{h:02}:00", request.start_date),
                    temp_c: Some(f64::from(h)),
                })
                .collect();

            Ok(ApiReply::new(
                200,
                WeatherResponse {
                    message: Some("ok".into()),
                    data_received: Some(request.clone()),
                    weather_info: Some(WeatherInfo { temperature_readings: Some(readings) }),
                    ..WeatherResponse::default()
                },
            ))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-05-13T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn no_location_blocks_request() {
        let provider = FakeProvider::default();
        let calls = provider.calls.clone();
        let lookup = WeatherLookup::new(Box::new(provider));

        let err = lookup.run(&RangeInput::new("2025-05-12", "2025-05-12"), now()).await.unwrap_err();

        assert!(err.is_input_error());
        assert_eq!(err.to_string(), "Please select a location on the map first.");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_range_blocks_request() {
        let provider = FakeProvider::default();
        let calls = provider.calls.clone();
        let mut lookup = WeatherLookup::new(Box::new(provider));
        lookup.select_point(0.0, 0.0).unwrap();

        let input = RangeInput::new("2025-05-12", "2025-05-11");
        let err = lookup.run(&input, now()).await.unwrap_err();

        assert!(matches!(err, LookupError::Validation(ValidationError::StartAfterEnd)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_request_is_sent_and_filtered() {
        let provider = FakeProvider::default();
        let last = provider.last.clone();
        let mut lookup = WeatherLookup::new(Box::new(provider));
        lookup.select_point(35.7796, -78.7811).unwrap();

        let input = RangeInput::new("2025-05-12", "2025-05-12").with_times(Some("08:00"), Some("10:00"));
        let report = lookup.run(&input, now()).await.unwrap();

        let sent = last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.latitude, 35.7796);
        assert_eq!(sent.start_time.as_deref(), Some("08:00"));

        let ReportBody::Weather { readings: Some(Readings::List(rows)), request } = report.body else {
            panic!("expected readings");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(request, Some(sent));
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let provider = FakeProvider { fail: true, ..FakeProvider::default() };
        let mut lookup = WeatherLookup::new(Box::new(provider));
        lookup.select_point(1.0, 1.0).unwrap();

        let err = lookup.run(&RangeInput::new("2025-05-12", "2025-05-12"), now()).await.unwrap_err();

        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "An application error occurred: connection refused");
    }

    #[test]
    fn prepare_builds_request_with_null_times() {
        let mut lookup = WeatherLookup::new(Box::new(FakeProvider::default()));
        lookup.select_point(-12.5, 130.8).unwrap();

        let request = lookup.prepare(&RangeInput::new("2025-05-01", "2025-05-02"), now()).unwrap();

        assert_eq!(request.start_date, "2025-05-01");
        assert_eq!(request.end_date, "2025-05-02");
        assert_eq!(request.start_time, None);
        assert_eq!(request.end_time, None);
    }

    #[test]
    fn check_needs_no_provider() {
        let mut selection = Selection::default();
        let input = RangeInput::new("2025-05-12", "2025-05-12");

        let err = check(&selection, &input, now()).unwrap_err();
        assert!(matches!(err, LookupError::Selection(SelectionError::NothingSelected)));

        selection.select(10.0, 20.0).unwrap();
        let (request, range) = check(&selection, &input, now()).unwrap();
        assert_eq!(request.longitude, 20.0);
        assert!(range.time_window().is_unbounded());
    }

    #[tokio::test]
    async fn with_selection_keeps_the_point() {
        let mut selection = Selection::default();
        selection.select(-1.0, -2.0).unwrap();
        let provider = FakeProvider::default();
        let calls = provider.calls.clone();
        let lookup = WeatherLookup::with_selection(Box::new(provider), selection);

        lookup.run(&RangeInput::new("2025-05-12", "2025-05-12"), now()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lookup.selection().point().map(|p| p.latitude), Some(-1.0));
    }
}

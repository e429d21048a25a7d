//! Turning a provider reply into something a front end can display.

use chrono::NaiveDateTime;

use crate::filter::{TimeOfDayWindow, filter_readings};
use crate::model::{ApiReply, TemperatureReading, WeatherRequest, parse_reading_time};

/// Free-form message sent by the server. Shown as an alert when the status is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingRow {
    pub time: String,
    pub temp_c: Option<f64>,
}

impl ReadingRow {
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        parse_reading_time(&self.time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Readings {
    List(Vec<ReadingRow>),
    /// The provider put an error marker in the reading list.
    ProviderError(String),
    /// Nothing left after the time-of-day filter.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    ServerError { error: String, details: Option<String> },
    Weather { request: Option<WeatherRequest>, readings: Option<Readings> },
    /// Success status without a readings block.
    MissingWeatherInfo { request: Option<WeatherRequest> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub status: u16,
    pub notice: Option<Notice>,
    pub body: ReportBody,
}

impl Report {
    pub fn from_reply(reply: ApiReply, window: &TimeOfDayWindow) -> Self {
        let ApiReply { status, body } = reply;

        let notice = body.message.map(|text| Notice { text, alert: status >= 400 });

        if let Some(error) = body.error {
            return Self {
                status,
                notice,
                body: ReportBody::ServerError { error, details: body.details },
            };
        }

        let request = body.data_received;
        let readings = body
            .weather_info
            .and_then(|info| info.temperature_readings)
            .map(|all| summarize(&all, window));

        let body = match readings {
            None if status < 400 => ReportBody::MissingWeatherInfo { request },
            readings => ReportBody::Weather { request, readings },
        };

        Self { status, notice, body }
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.body, ReportBody::ServerError { .. })
    }
}

fn summarize(all: &[TemperatureReading], window: &TimeOfDayWindow) -> Readings {
    let kept = filter_readings(all, window);

    if let Some(error) = kept.iter().find_map(|r| r.error_message()) {
        return Readings::ProviderError(error.to_owned());
    }

    let rows: Vec<ReadingRow> = kept
        .into_iter()
        .filter_map(|r| match r {
            TemperatureReading::Reading { time, temp_c } => {
                Some(ReadingRow { time: time.clone(), temp_c: *temp_c })
            }
            TemperatureReading::Failed { .. } => None,
        })
        .collect();

    if rows.is_empty() { Readings::Empty } else { Readings::List(rows) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{WeatherInfo, WeatherResponse};
    use chrono::NaiveTime;

    fn reading(time: &str, temp: f64) -> TemperatureReading {
        TemperatureReading::Reading { time: time.into(), temp_c: Some(temp) }
    }

    fn with_readings(readings: Vec<TemperatureReading>) -> WeatherResponse {
        WeatherResponse {
            message: Some("Weather data retrieved successfully from Open-Meteo.".into()),
            weather_info: Some(WeatherInfo { temperature_readings: Some(readings) }),
            ..WeatherResponse::default()
        }
    }

    #[test]
    fn error_short_circuits_weather_rendering() {
        let body = WeatherResponse {
            message: Some("failed".into()),
            error: Some("Error fetching weather data from provider: 400".into()),
            details: Some("Invalid parameters".into()),
            weather_info: Some(WeatherInfo { temperature_readings: Some(vec![]) }),
            ..WeatherResponse::default()
        };

        let report = Report::from_reply(ApiReply::new(400, body), &TimeOfDayWindow::default());

        assert!(report.is_server_error());
        assert_eq!(report.notice, Some(Notice { text: "failed".into(), alert: true }));
        assert_eq!(
            report.body,
            ReportBody::ServerError {
                error: "Error fetching weather data from provider: 400".into(),
                details: Some("Invalid parameters".into()),
            }
        );
    }

    #[test]
    fn readings_are_filtered_by_time_window() {
        let body = with_readings(vec![
            reading("2023-01-01T00:00", 10.0),
            reading("2023-01-01T01:00", 10.5),
            reading("2023-01-01T02:00", 11.0),
        ]);
        let window = TimeOfDayWindow::new(NaiveTime::from_hms_opt(1, 0, 0), None);

        let report = Report::from_reply(ApiReply::new(200, body), &window);

        assert_eq!(report.notice.as_ref().map(|n| n.alert), Some(false));
        let ReportBody::Weather { readings: Some(Readings::List(rows)), .. } = &report.body else {
            panic!("expected a reading list, got {:?}", report.body);
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ReadingRow { time: "2023-01-01T01:00".into(), temp_c: Some(10.5) });
    }

    #[test]
    fn error_entry_replaces_list() {
        let body = with_readings(vec![
            reading("2023-01-01T00:00", 10.0),
            TemperatureReading::Failed { error: "Data format from Open-Meteo was not as expected.".into() },
        ]);

        let report = Report::from_reply(ApiReply::new(200, body), &TimeOfDayWindow::default());

        assert_eq!(
            report.body,
            ReportBody::Weather {
                request: None,
                readings: Some(Readings::ProviderError(
                    "Data format from Open-Meteo was not as expected.".into()
                )),
            }
        );
    }

    #[test]
    fn everything_filtered_out_is_empty() {
        let body = with_readings(vec![reading("2023-01-01T00:00", 10.0)]);
        let window = TimeOfDayWindow::new(NaiveTime::from_hms_opt(5, 0, 0), NaiveTime::from_hms_opt(6, 0, 0));

        let report = Report::from_reply(ApiReply::new(200, body), &window);

        assert!(matches!(report.body, ReportBody::Weather { readings: Some(Readings::Empty), .. }));
    }

    #[test]
    fn missing_weather_info_depends_on_status() {
        let ok = Report::from_reply(ApiReply::new(200, WeatherResponse::default()), &TimeOfDayWindow::default());
        assert_eq!(ok.body, ReportBody::MissingWeatherInfo { request: None });

        let body = WeatherResponse { message: Some("Not found".into()), ..WeatherResponse::default() };
        let failed = Report::from_reply(ApiReply::new(404, body), &TimeOfDayWindow::default());
        assert_eq!(failed.body, ReportBody::Weather { request: None, readings: None });
        assert_eq!(failed.notice, Some(Notice { text: "Not found".into(), alert: true }));
    }
}

//! Plain-text rendering of a [`Report`].

use std::fmt;

use pinpoint_core::{Readings, Report, ReportBody, WeatherRequest};

/// Displays a report the way the terminal shows it.
pub struct Rendered<'a>(pub &'a Report);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        if let Some(notice) = &report.notice {
            if notice.alert {
                write!(f, "! ")?;
            }
            writeln!(f, "{}", notice.text)?;
        }

        match &report.body {
            ReportBody::ServerError { error, details } => {
                writeln!(f, "Error: {error}")?;
                if let Some(details) = details {
                    writeln!(f, "  Details: {details}")?;
                }
            }
            ReportBody::Weather { request, readings } => {
                if let Some(request) = request {
                    write_request(f, request)?;
                }
                if let Some(readings) = readings {
                    write_readings(f, readings)?;
                }
            }
            ReportBody::MissingWeatherInfo { request } => {
                if let Some(request) = request {
                    write_request(f, request)?;
                }
                writeln!(f, "Weather information block is missing or incomplete in the response.")?;
            }
        }

        Ok(())
    }
}

pub fn render(report: &Report) -> String {
    Rendered(report).to_string()
}

fn write_request(f: &mut fmt::Formatter<'_>, request: &WeatherRequest) -> fmt::Result {
    writeln!(f, "Request Details:")?;
    writeln!(
        f,
        "  Location: Latitude: {:.4}, Longitude: {:.4}",
        request.latitude, request.longitude
    )?;

    write!(f, "  Date Range: {} to {}", request.start_date, request.end_date)?;
    if request.start_time.is_some() || request.end_time.is_some() {
        write!(
            f,
            " (Times: {} to {})",
            request.start_time.as_deref().unwrap_or("Any"),
            request.end_time.as_deref().unwrap_or("Any"),
        )?;
    }
    writeln!(f)
}

fn write_readings(f: &mut fmt::Formatter<'_>, readings: &Readings) -> fmt::Result {
    writeln!(f, "Hourly Temperature Readings:")?;
    match readings {
        Readings::List(rows) => {
            for row in rows {
                match row.local_time() {
                    Some(t) => write!(f, "  {}", t.format("%Y-%m-%d %H:%M"))?,
                    None => write!(f, "  {}", row.time)?,
                }
                match row.temp_c {
                    Some(c) => writeln!(f, "  {c} °C")?,
                    None => writeln!(f, "  N/A")?,
                }
            }
            Ok(())
        }
        Readings::ProviderError(message) => writeln!(f, "  {message}"),
        Readings::Empty => writeln!(
            f,
            "  No temperature readings available for the selected criteria (including time filter)."
        ),
    }
}

//! Validation of a requested date/time window.
//!
//! The validator never reads a clock: the current moment is always passed in,
//! so the same inputs always produce the same answer.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;
use tracing::debug;

use crate::filter::TimeOfDayWindow;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// 23:59, the last minute of a day at minute resolution.
const LAST_MINUTE_OF_DAY: i64 = 23 * 60 + 59;

/// Reasons a date/time selection is rejected.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select both a start and an end date.")]
    MissingDates,

    #[error("Invalid date or time format. Please use YYYY-MM-DD and HH:MM.")]
    InvalidFormat { value: String },

    #[error("Start date cannot be after end date.")]
    StartAfterEnd,

    #[error("Start time must be before end time on the same day.")]
    StartTimeNotBeforeEndTime,

    #[error("The selected end date and time cannot be later than the current moment.")]
    EndInFuture,
}

/// A date/time window that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl DateTimeRange {
    /// End date combined with the end time, or with 23:59 when no end time was given.
    pub fn effective_end(&self) -> NaiveDateTime {
        match self.end_time {
            Some(time) => self.end_date.and_time(time),
            None => self.end_date.and_time(NaiveTime::MIN) + Duration::minutes(LAST_MINUTE_OF_DAY),
        }
    }

    pub fn time_window(&self) -> TimeOfDayWindow {
        TimeOfDayWindow::new(self.start_time, self.end_time)
    }
}

/// Raw user input for a date/time selection, as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeInput {
    pub start_date: String,
    pub end_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl RangeInput {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self { start_date: start_date.into(), end_date: end_date.into(), ..Self::default() }
    }

    pub fn with_times(mut self, start_time: Option<&str>, end_time: Option<&str>) -> Self {
        self.start_time = start_time.map(str::to_owned);
        self.end_time = end_time.map(str::to_owned);
        self
    }

    pub fn validate(&self, now: NaiveDateTime) -> Result<DateTimeRange, ValidationError> {
        validate(
            &self.start_date,
            &self.end_date,
            self.start_time.as_deref(),
            self.end_time.as_deref(),
            now,
        )
    }
}

/// Check a date/time selection against itself and against `now`.
///
/// Checks run in a fixed order and the first failure is returned:
/// both dates present, dates well-formed and ordered, times well-formed and
/// ordered on a single-day range, and finally the effective end not later than
/// `now` truncated to the minute. An empty or blank string counts as absent.
pub fn validate(
    start_date: &str,
    end_date: &str,
    start_time: Option<&str>,
    end_time: Option<&str>,
    now: NaiveDateTime,
) -> Result<DateTimeRange, ValidationError> {
    let result = check(start_date, end_date, start_time, end_time, now);
    match &result {
        Ok(range) => debug!(?range, "date/time selection accepted"),
        Err(err) => debug!(%err, start_date, end_date, ?start_time, ?end_time, "date/time selection rejected"),
    }
    result
}

fn check(
    start_date: &str,
    end_date: &str,
    start_time: Option<&str>,
    end_time: Option<&str>,
    now: NaiveDateTime,
) -> Result<DateTimeRange, ValidationError> {
    let (Some(start_date), Some(end_date)) = (present(Some(start_date)), present(Some(end_date)))
    else {
        return Err(ValidationError::MissingDates);
    };

    let start_date = parse_date(start_date)?;
    let end_date = parse_date(end_date)?;
    if start_date > end_date {
        return Err(ValidationError::StartAfterEnd);
    }

    let start_time = present(start_time).map(parse_time).transpose()?;
    let end_time = present(end_time).map(parse_time).transpose()?;
    let same_day_unordered = start_date == end_date
        && matches!((start_time, end_time), (Some(start), Some(end)) if start >= end);
    if same_day_unordered {
        return Err(ValidationError::StartTimeNotBeforeEndTime);
    }

    let range = DateTimeRange { start_date, end_date, start_time, end_time };
    if range.effective_end() > truncate_to_minute(now) {
        return Err(ValidationError::EndInFuture);
    }

    Ok(range)
}

/// Zero the seconds and sub-second part of a moment.
pub fn truncate_to_minute(moment: NaiveDateTime) -> NaiveDateTime {
    moment.with_second(0).and_then(|m| m.with_nanosecond(0)).unwrap_or(moment)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    if !has_shape(value, "dddd-dd-dd") {
        return Err(ValidationError::InvalidFormat { value: value.to_owned() });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidFormat { value: value.to_owned() })
}

fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    if !has_shape(value, "dd:dd") {
        return Err(ValidationError::InvalidFormat { value: value.to_owned() });
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidFormat { value: value.to_owned() })
}

/// Exact zero-padded layout. `d` in `pattern` is an ASCII digit, anything else matches literally.
fn has_shape(value: &str, pattern: &str) -> bool {
    value.len() == pattern.len()
        && value.bytes().zip(pattern.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

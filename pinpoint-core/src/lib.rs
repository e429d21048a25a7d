//! Core library for the `pinpoint` CLI.
//!
//! This crate defines:
//! - Validation of a requested date/time window against the current moment
//! - The selected point and the request/response model of the weather API
//! - Abstraction over weather providers (a backend service, or Open-Meteo directly)
//! - Interpretation of replies into a displayable report
//! - Configuration handling
//!
//! It is used by `pinpoint-cli`, but can also be reused by other front ends.

pub mod config;
pub mod filter;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod report;
pub mod selection;
pub mod validation;

pub use config::{Config, ProviderConfig};
pub use filter::{TimeOfDayWindow, filter_readings};
pub use lookup::{LookupError, WeatherLookup};
pub use model::{ApiReply, TemperatureReading, WeatherInfo, WeatherRequest, WeatherResponse};
pub use provider::{ProviderId, WeatherProvider};
pub use report::{Notice, ReadingRow, Readings, Report, ReportBody};
pub use selection::{Coordinates, Selection, SelectionError};
pub use validation::{DateTimeRange, RangeInput, ValidationError, validate};

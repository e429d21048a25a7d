use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("Please select a location on the map first.")]
    NothingSelected,

    #[error("Latitude must be between -90 and 90, got {0}.")]
    LatitudeOutOfRange(f64),

    #[error("Longitude must be between -180 and 180, got {0}.")]
    LongitudeOutOfRange(f64),
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SelectionError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SelectionError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SelectionError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lat: {:.4}, Lon: {:.4}", self.latitude, self.longitude)
    }
}

/// The currently selected point. Each selection replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    point: Option<Coordinates>,
}

impl Selection {
    pub fn select(&mut self, latitude: f64, longitude: f64) -> Result<Coordinates, SelectionError> {
        let point = Coordinates::new(latitude, longitude)?;
        self.point = Some(point);
        Ok(point)
    }

    pub fn point(&self) -> Option<Coordinates> {
        self.point
    }

    pub fn require(&self) -> Result<Coordinates, SelectionError> {
        self.point.ok_or(SelectionError::NothingSelected)
    }

    pub fn clear(&mut self) {
        self.point = None;
    }
}

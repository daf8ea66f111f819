use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated WGS84 point. Deserializing goes through [`Coordinate::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = LocationError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::try_new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    Coordinates { latitude: f64, longitude: f64 },
    Place(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    /// Place name as typed, or the geocoder's display name.
    pub label: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("latitude must be within [-90, 90] (got {0})")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be within [-180, 180] (got {0})")]
    LongitudeOutOfRange(f64),
    #[error("place name must be non-empty")]
    EmptyPlace,
    #[error("could not find location {0:?}; try another place name")]
    NotFound(String),
    #[error("geocoding service failed")]
    Service(#[source] anyhow::Error),
}

impl LocationError {
    /// Input problems the user fixes by re-entering the location.
    pub fn is_user_input(&self) -> bool {
        !matches!(self, LocationError::Service(_))
    }
}

use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 coordinate in degrees.
///
/// No range validation is performed, values are sent to the providers as they are.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `lat,lon` with six fractional digits, the order GraphHopper and Google expect.
    pub(crate) fn lat_lon(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }

    /// `lon,lat` with six fractional digits, the order OSRM expects.
    pub(crate) fn lon_lat(&self) -> String {
        format!("{:.6},{:.6}", self.longitude, self.latitude)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

impl From<Point> for geo_types::Point {
    fn from(point: Point) -> Self {
        geo_types::Point::new(point.longitude, point.latitude)
    }
}

impl From<&Point> for geo_types::Point {
    fn from(point: &Point) -> Self {
        geo_types::Point::new(point.longitude, point.latitude)
    }
}

impl From<geo_types::Point> for Point {
    fn from(point: geo_types::Point) -> Self {
        Point::new(point.y(), point.x())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParsePointError {
    #[error("expected `latitude,longitude`, got `{0}`")]
    Format(String),

    #[error("invalid coordinate `{0}`")]
    Coordinate(String),
}

impl FromStr for Point {
    type Err = ParsePointError;

    /// Parses `latitude,longitude`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = input
            .split_once(',')
            .ok_or_else(|| ParsePointError::Format(input.to_string()))?;

        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| ParsePointError::Coordinate(value.trim().to_string()))
        };

        Ok(Point::new(parse(lat)?, parse(lon)?))
    }
}

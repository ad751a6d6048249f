//! Error types for the core and its collaborator adapters.
//!
//! The BSM evaluator and the segment classifier have no error type: every
//! input maps to a decision or a segment. Errors only exist at the input
//! boundary (speed, coordinates) and at the external collaborators.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),
}

/// Faults that stop a simulation from being built or ticked.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("speed must be a finite value above 0 km/h, got {0}")]
    InvalidSpeed(f64),
    #[error("invalid speed range {min}..={max} km/h")]
    InvalidSpeedRange { min: f64, max: f64 },
}

/// Failures while obtaining or building a route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[cfg(feature = "ors")]
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing service returned an error: {0}")]
    Api(String),
    #[error("no route found between {from:?} and {to:?}")]
    NoRoute {
        from: crate::geo::GeoPoint,
        to: crate::geo::GeoPoint,
    },
    #[error("route geometry is empty")]
    EmptyGeometry,
    #[error("straight-line route needs {legs} legs, limit is {limit}")]
    GeometryTooLarge { legs: f64, limit: usize },
    #[error("invalid coordinate in route response: {0}")]
    InvalidCoordinate(#[from] GeoError),
    #[error("failed to load route table from '{path}': {message}")]
    Table { path: String, message: String },
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no coordinates found for '{0}'")]
    NotFound(String),
    #[cfg(feature = "nominatim")]
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoder returned an invalid coordinate: {0}")]
    InvalidCoordinate(#[from] GeoError),
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    InvalidFormat(String),
}

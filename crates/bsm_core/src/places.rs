//! Place-name resolution: a fixed catalog of demo places and a pluggable
//! geocoder for free-text names.

use log::info;

use crate::error::GeocodeError;
use crate::geo::GeoPoint;

/// `(name, lat, lng)` for every catalog place.
pub const PLACE_CATALOG: [(&str, f64, f64); 8] = [
    ("Coimbatore", 11.0168, 76.9558),
    ("Chennai", 13.0827, 80.2707),
    ("Bengaluru", 12.9716, 77.5946),
    ("Madurai", 9.9252, 78.1198),
    ("Salem", 11.6643, 78.1460),
    ("Tiruchirappalli", 10.7905, 78.7047),
    ("Erode", 11.3410, 77.7172),
    ("Tiruppur", 11.1085, 77.3411),
];

/// Case-insensitive catalog lookup.
pub fn catalog_place(name: &str) -> Option<GeoPoint> {
    let needle = name.trim();
    PLACE_CATALOG
        .iter()
        .find(|(place, _, _)| place.eq_ignore_ascii_case(needle))
        .map(|&(_, lat, lng)| GeoPoint { lat, lng })
}

pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError>;
}

pub struct CatalogGeocoder;

impl Geocoder for CatalogGeocoder {
    fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
        catalog_place(query).ok_or_else(|| GeocodeError::NotFound(query.to_string()))
    }
}

/// Tries each geocoder in order and returns the first hit. When every
/// geocoder fails, the last error is returned.
pub struct ChainGeocoder {
    geocoders: Vec<Box<dyn Geocoder>>,
}

impl ChainGeocoder {
    pub fn new(geocoders: Vec<Box<dyn Geocoder>>) -> Self {
        Self { geocoders }
    }
}

impl Geocoder for ChainGeocoder {
    fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
        let mut last_error = GeocodeError::NotFound(query.to_string());
        for geocoder in &self.geocoders {
            match geocoder.geocode(query) {
                Ok(point) => {
                    info!("resolved '{}' to ({:.4}, {:.4})", query, point.lat, point.lng);
                    return Ok(point);
                }
                Err(err) => last_error = err,
            }
        }
        Err(last_error)
    }
}

#[cfg(feature = "nominatim")]
pub mod nominatim {
    use super::*;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use std::time::Duration;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
    const USER_AGENT: &str = "bsm_route_advisor";

    #[derive(Deserialize)]
    struct NominatimPlace {
        lat: String,
        lon: String,
    }

    /// Free-text geocoding against a Nominatim search endpoint.
    pub struct NominatimGeocoder {
        client: Client,
        endpoint: String,
    }

    impl NominatimGeocoder {
        pub fn new(endpoint: &str) -> Result<Self, GeocodeError> {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?;
            Ok(Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            })
        }
    }

    impl Geocoder for NominatimGeocoder {
        fn geocode(&self, query: &str) -> Result<GeoPoint, GeocodeError> {
            let places: Vec<NominatimPlace> = self
                .client
                .get(format!("{}/search", self.endpoint))
                .query(&[("q", query), ("format", "json"), ("limit", "1")])
                .send()?
                .error_for_status()?
                .json()?;
            let place = places
                .first()
                .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?;
            parse_place(query, &place.lat, &place.lon)
        }
    }

    fn parse_place(query: &str, lat: &str, lon: &str) -> Result<GeoPoint, GeocodeError> {
        let not_found = || GeocodeError::NotFound(query.to_string());
        let lat: f64 = lat.parse().map_err(|_| not_found())?;
        let lng: f64 = lon.parse().map_err(|_| not_found())?;
        Ok(GeoPoint::new(lat, lng)?)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_string_coordinates() {
            let point = parse_place("Chennai", "13.0836939", "80.270186").expect("point");
            assert_eq!(point.lat, 13.0836939);
            assert_eq!(point.lng, 80.270186);
        }

        #[test]
        fn rejects_garbage_coordinates() {
            assert!(matches!(
                parse_place("x", "north", "80.0"),
                Err(GeocodeError::NotFound(_))
            ));
            assert!(matches!(
                parse_place("x", "95.0", "80.0"),
                Err(GeocodeError::InvalidCoordinate(_))
            ));
        }
    }
}
